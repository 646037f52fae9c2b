//! Prioritizer.
//!
//! Merges due reviews, the current phase's topics, and the top gaps into
//! a recommendation: an ordered list of selection criteria the question
//! bank resolves later, never concrete question ids.

use recap_common::{CriteriaSource, PipelineConfig, QuestionCriteria, RecapError};

use crate::state::{PipelineState, StageUpdate};

/// Stage 5: capped review queue plus practice criteria bundles.
pub fn recommend(state: &PipelineState, config: &PipelineConfig) -> Result<StageUpdate, RecapError> {
    // due set is already sorted most-overdue first
    let review_queue = state
        .due_for_review
        .iter()
        .take(config.prioritizer.review_cap)
        .cloned()
        .collect();

    let mut next_question_criteria = Vec::new();
    if let Some(phase) = state.recommended_path.first() {
        next_question_criteria.push(QuestionCriteria {
            source: CriteriaSource::Phase,
            tags: phase.focus_topics.clone(),
            difficulty: phase.difficulty,
            exclude_already_answered: true,
            count: config.prioritizer.phase_question_count,
        });
    }
    // gap topics are re-practiced even if previously answered
    for gap in state.knowledge_gaps.iter().take(config.prioritizer.gap_cap) {
        next_question_criteria.push(QuestionCriteria {
            source: CriteriaSource::Gap,
            tags: vec![gap.topic.clone()],
            difficulty: gap.common_difficulty,
            exclude_already_answered: false,
            count: config.prioritizer.gap_question_count,
        });
    }

    Ok(StageUpdate {
        review_queue: Some(review_queue),
        next_question_criteria: Some(next_question_criteria),
        ..Default::default()
    })
}
