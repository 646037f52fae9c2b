//! Accumulating pipeline state and the partial updates stages return.

use std::collections::{BTreeMap, BTreeSet};

use recap_common::{
    AnsweredQuestion, DueReview, KnowledgeGap, LearningPathPhase, PipelineInput, QuestionCriteria,
    RunStatus, SrsRecord,
};

/// The single state record threaded through all stages.
///
/// Input fields are filled once at the start of a run and never mutated;
/// stage-output fields start empty and are filled by `apply` as each
/// stage's update is merged in.
#[derive(Debug, Clone)]
pub struct PipelineState {
    // Input snapshot
    pub user_id: String,
    pub channel_id: Option<String>,
    pub answered_questions: Vec<AnsweredQuestion>,
    pub correct_ids: BTreeSet<String>,
    pub incorrect_answers: Vec<AnsweredQuestion>,
    pub time_spent_by_question: BTreeMap<String, u64>,
    pub existing_srs_schedule: BTreeMap<String, SrsRecord>,
    /// Injected clock, epoch milliseconds
    pub now_ms: i64,

    // Bookkeeping
    pub status: RunStatus,

    // Stage outputs, in stage order
    pub mastery: BTreeMap<String, u32>,
    pub strength_areas: Vec<String>,
    pub weakness_areas: Vec<String>,
    pub knowledge_gaps: Vec<KnowledgeGap>,
    pub recommended_path: Vec<LearningPathPhase>,
    pub updated_srs_schedule: BTreeMap<String, SrsRecord>,
    pub due_for_review: Vec<DueReview>,
    pub review_queue: Vec<DueReview>,
    pub next_question_criteria: Vec<QuestionCriteria>,
}

impl PipelineState {
    /// Fresh state for one run
    pub fn new(input: &PipelineInput, now_ms: i64) -> Self {
        Self {
            user_id: input.user_id.clone(),
            channel_id: input.channel_id.clone(),
            answered_questions: input.answered_questions.clone(),
            correct_ids: input.correct_ids.clone(),
            incorrect_answers: input.incorrect_answers.clone(),
            time_spent_by_question: input.time_spent_by_question.clone(),
            existing_srs_schedule: input.existing_srs_schedule.clone(),
            now_ms,
            status: RunStatus::Pending,
            mastery: BTreeMap::new(),
            strength_areas: Vec::new(),
            weakness_areas: Vec::new(),
            knowledge_gaps: Vec::new(),
            recommended_path: Vec::new(),
            updated_srs_schedule: BTreeMap::new(),
            due_for_review: Vec::new(),
            review_queue: Vec::new(),
            next_question_criteria: Vec::new(),
        }
    }

    /// Merge a stage's partial update into the accumulated state.
    ///
    /// Only fields the stage actually produced are touched; a stage can
    /// never un-set a previous stage's output.
    pub fn apply(&mut self, update: StageUpdate) {
        if let Some(mastery) = update.mastery {
            self.mastery = mastery;
        }
        if let Some(strength_areas) = update.strength_areas {
            self.strength_areas = strength_areas;
        }
        if let Some(weakness_areas) = update.weakness_areas {
            self.weakness_areas = weakness_areas;
        }
        if let Some(knowledge_gaps) = update.knowledge_gaps {
            self.knowledge_gaps = knowledge_gaps;
        }
        if let Some(recommended_path) = update.recommended_path {
            self.recommended_path = recommended_path;
        }
        if let Some(updated_srs_schedule) = update.updated_srs_schedule {
            self.updated_srs_schedule = updated_srs_schedule;
        }
        if let Some(due_for_review) = update.due_for_review {
            self.due_for_review = due_for_review;
        }
        if let Some(review_queue) = update.review_queue {
            self.review_queue = review_queue;
        }
        if let Some(next_question_criteria) = update.next_question_criteria {
            self.next_question_criteria = next_question_criteria;
        }
    }
}

/// Partial update returned by one stage.
///
/// `None` means "not my field"; the runner's merge leaves it alone.
#[derive(Debug, Default)]
pub struct StageUpdate {
    pub mastery: Option<BTreeMap<String, u32>>,
    pub strength_areas: Option<Vec<String>>,
    pub weakness_areas: Option<Vec<String>>,
    pub knowledge_gaps: Option<Vec<KnowledgeGap>>,
    pub recommended_path: Option<Vec<LearningPathPhase>>,
    pub updated_srs_schedule: Option<BTreeMap<String, SrsRecord>>,
    pub due_for_review: Option<Vec<DueReview>>,
    pub review_queue: Option<Vec<DueReview>>,
    pub next_question_criteria: Option<Vec<QuestionCriteria>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_leaves_untouched_fields_alone() {
        let input = PipelineInput {
            user_id: "u1".to_string(),
            ..Default::default()
        };
        let mut state = PipelineState::new(&input, 0);
        state.strength_areas = vec!["graphs".to_string()];

        let mut mastery = BTreeMap::new();
        mastery.insert("arrays".to_string(), 40);
        state.apply(StageUpdate {
            mastery: Some(mastery),
            ..Default::default()
        });

        assert_eq!(state.mastery.get("arrays"), Some(&40));
        assert_eq!(state.strength_areas, vec!["graphs".to_string()]);
    }
}
