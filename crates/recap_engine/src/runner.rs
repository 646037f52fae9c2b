//! Pipeline runner.
//!
//! Validates the input, threads the state through the five stages in
//! fixed order, and builds the final report. Every stage call passes
//! through a barrier that turns panics into a tagged stage error, so no
//! failure crosses the public boundary as an unwind. A failed run is
//! atomic: the report hands back the input schedule unchanged.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use recap_common::{
    PipelineConfig, PipelineInput, PipelineReport, PipelineSummary, RecapError, RunError,
    RunStatus,
};

use crate::state::{PipelineState, StageUpdate};
use crate::{gaps, mastery, path, prioritize, srs};

/// One stage: reads the accumulated state, returns a partial update.
pub type StageFn = fn(&PipelineState, &PipelineConfig) -> Result<StageUpdate, RecapError>;

/// The fixed, non-branching stage order.
pub const STAGES: [(&str, StageFn); 5] = [
    ("analyze", mastery::analyze),
    ("gaps", gaps::classify),
    ("path", path::generate),
    ("srs", srs::schedule),
    ("prioritize", prioritize::recommend),
];

/// Run the pipeline with default configuration.
pub fn run(input: &PipelineInput, now_ms: i64) -> PipelineReport {
    run_with_config(input, now_ms, &PipelineConfig::default())
}

/// Run the pipeline once against an injected clock.
///
/// Never panics and never returns `Err`; failures come back as a report
/// tagged `failed`.
pub fn run_with_config(
    input: &PipelineInput,
    now_ms: i64,
    config: &PipelineConfig,
) -> PipelineReport {
    if let Err(err) = validate(input) {
        warn!(user_id = %input.user_id, "rejected pipeline input: {}", err);
        return failed_report(input, now_ms, &err);
    }

    info!(
        user_id = %input.user_id,
        channel_id = input.channel_id.as_deref().unwrap_or("-"),
        answers = input.answered_questions.len(),
        "pipeline run starting"
    );

    let mut state = PipelineState::new(input, now_ms);
    if let Err(err) = execute_stages(&mut state, config, &STAGES) {
        warn!(user_id = %input.user_id, "pipeline run failed: {}", err);
        return failed_report(input, now_ms, &err);
    }
    state.status = RunStatus::Completed;

    let report = build_report(state, input);
    info!(
        user_id = %input.user_id,
        readiness = report.summary.readiness_score,
        gaps = report.summary.gap_count,
        due = report.summary.review_due,
        "pipeline run completed"
    );
    report
}

/// Reducer loop: state = merge(state, stage(state)) for each stage.
///
/// Exposed at crate level so tests can drive a hand-built stage list
/// through the same barrier.
pub(crate) fn execute_stages(
    state: &mut PipelineState,
    config: &PipelineConfig,
    stages: &[(&str, StageFn)],
) -> Result<(), RecapError> {
    for (name, stage) in stages {
        debug!(stage = name, "stage starting");
        let update = run_stage(name, *stage, state, config)?;
        state.apply(update);
        debug!(stage = name, "stage completed");
    }
    Ok(())
}

/// Barrier around a single stage call: a panic becomes a stage error.
fn run_stage(
    name: &str,
    stage: StageFn,
    state: &PipelineState,
    config: &PipelineConfig,
) -> Result<StageUpdate, RecapError> {
    match panic::catch_unwind(AssertUnwindSafe(|| stage(state, config))) {
        Ok(Ok(update)) => Ok(update),
        Ok(Err(err)) => Err(RecapError::StageComputation {
            stage: name.to_string(),
            message: err.to_string(),
        }),
        Err(payload) => Err(RecapError::StageComputation {
            stage: name.to_string(),
            message: panic_message(payload),
        }),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "stage panicked".to_string()
    }
}

/// Fail fast on malformed input, before stage 1.
fn validate(input: &PipelineInput) -> Result<(), RecapError> {
    if input.user_id.trim().is_empty() {
        return Err(RecapError::InvalidInput("user_id must not be empty".into()));
    }
    for question in input
        .answered_questions
        .iter()
        .chain(input.incorrect_answers.iter())
    {
        if question.question_id.trim().is_empty() {
            return Err(RecapError::InvalidInput(
                "answered question with empty question_id".into(),
            ));
        }
    }
    for question in &input.incorrect_answers {
        if question.correct {
            return Err(RecapError::InvalidInput(format!(
                "incorrect_answers contains a correct record: {}",
                question.question_id
            )));
        }
    }
    // the per-answer flag is authoritative; a disagreeing id set is the
    // caller's inconsistency, worth a warning but not a failed run
    for question in &input.answered_questions {
        if question.correct && !input.correct_ids.contains(&question.question_id) {
            warn!(
                question_id = %question.question_id,
                "correct answer missing from correct_ids"
            );
        }
    }
    Ok(())
}

fn build_report(state: PipelineState, input: &PipelineInput) -> PipelineReport {
    let summary = PipelineSummary {
        readiness_score: readiness_score(&state),
        strength_count: state.strength_areas.len(),
        weakness_count: state.weakness_areas.len(),
        gap_count: state.knowledge_gaps.len(),
        review_due: state.due_for_review.len(),
        path_phases: state.recommended_path.len(),
        avg_time_spent_ms: avg_time_spent_ms(input),
    };
    PipelineReport {
        status: state.status,
        generated_at_ms: state.now_ms,
        mastery: state.mastery,
        strength_areas: state.strength_areas,
        weakness_areas: state.weakness_areas,
        knowledge_gaps: state.knowledge_gaps,
        recommended_path: state.recommended_path,
        updated_srs_schedule: state.updated_srs_schedule,
        due_for_review: state.review_queue,
        next_question_criteria: state.next_question_criteria,
        summary,
        error: None,
    }
}

/// Mean mastery across observed topics, 0 with no data.
fn readiness_score(state: &PipelineState) -> u32 {
    if state.mastery.is_empty() {
        return 0;
    }
    let total: u64 = state.mastery.values().map(|score| u64::from(*score)).sum();
    ((total as f64) / (state.mastery.len() as f64)).round() as u32
}

/// Diagnostic only: mean of the caller's per-question timings.
fn avg_time_spent_ms(input: &PipelineInput) -> u64 {
    if input.time_spent_by_question.is_empty() {
        return 0;
    }
    let total: u64 = input.time_spent_by_question.values().sum();
    total / input.time_spent_by_question.len() as u64
}

/// Atomic failure: status, error, and the input schedule unchanged.
fn failed_report(input: &PipelineInput, now_ms: i64, err: &RecapError) -> PipelineReport {
    PipelineReport {
        status: RunStatus::Failed,
        generated_at_ms: now_ms,
        mastery: Default::default(),
        strength_areas: Vec::new(),
        weakness_areas: Vec::new(),
        knowledge_gaps: Vec::new(),
        recommended_path: Vec::new(),
        updated_srs_schedule: input.existing_srs_schedule.clone(),
        due_for_review: Vec::new(),
        next_question_criteria: Vec::new(),
        summary: PipelineSummary::default(),
        error: Some(RunError::from(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_common::{AnsweredQuestion, Difficulty, GapSeverity, SrsRecord, MS_PER_DAY};
    use std::collections::BTreeMap;

    const NOW: i64 = 1_700_000_000_000;

    fn make_answer(id: &str, tags: &[&str], correct: bool, difficulty: Difficulty) -> AnsweredQuestion {
        AnsweredQuestion {
            question_id: id.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            correct,
            difficulty,
            time_spent_ms: 60_000,
        }
    }

    /// A struggling user: weak on graphs (2/10), strong on arrays
    /// (10/12), one stale SRS record already due.
    fn fixture_input() -> PipelineInput {
        let mut answered = Vec::new();
        let mut incorrect = Vec::new();
        let mut correct_ids = std::collections::BTreeSet::new();
        for i in 0..10 {
            let correct = i < 2;
            let q = make_answer(&format!("g{}", i), &["graphs"], correct, Difficulty::Intermediate);
            if correct {
                correct_ids.insert(q.question_id.clone());
            } else {
                incorrect.push(q.clone());
            }
            answered.push(q);
        }
        for i in 0..12 {
            let correct = i < 10;
            let q = make_answer(&format!("a{}", i), &["arrays"], correct, Difficulty::Beginner);
            if correct {
                correct_ids.insert(q.question_id.clone());
            } else {
                incorrect.push(q.clone());
            }
            answered.push(q);
        }
        let mut schedule = BTreeMap::new();
        schedule.insert(
            "old1".to_string(),
            SrsRecord {
                question_id: "old1".to_string(),
                level: 2,
                ease_factor: 2.0,
                interval_hours: 72,
                next_review_at_ms: NOW - 3 * MS_PER_DAY,
            },
        );
        let mut time_spent = BTreeMap::new();
        time_spent.insert("g0".to_string(), 30_000u64);
        time_spent.insert("a0".to_string(), 90_000u64);
        PipelineInput {
            user_id: "u1".to_string(),
            channel_id: Some("practice".to_string()),
            answered_questions: answered,
            correct_ids,
            incorrect_answers: incorrect,
            time_spent_by_question: time_spent,
            existing_srs_schedule: schedule,
        }
    }

    #[test]
    fn test_full_run_end_to_end() {
        let report = run(&fixture_input(), NOW);
        assert_eq!(report.status, RunStatus::Completed);
        assert!(report.error.is_none());

        // graphs: 2/10 correct -> mastery 20, a high-severity gap
        assert_eq!(report.mastery.get("graphs"), Some(&20));
        // arrays: 10/12 -> round(83.33) = 83, a strength
        assert_eq!(report.mastery.get("arrays"), Some(&83));
        assert_eq!(report.strength_areas, vec!["arrays".to_string()]);
        assert_eq!(report.weakness_areas, vec!["graphs".to_string()]);

        assert_eq!(report.knowledge_gaps.len(), 1);
        let gap = &report.knowledge_gaps[0];
        assert_eq!(gap.topic, "graphs");
        assert_eq!(gap.severity, GapSeverity::Critical);
        assert_eq!(gap.error_count, 8);
        assert_eq!(gap.recommendation, "Review core concepts");

        // Foundation Building for the critical gap, Advanced Mastery for
        // arrays
        assert_eq!(report.recommended_path.len(), 2);
        assert_eq!(report.recommended_path[0].name, "Foundation Building");
        assert_eq!(report.recommended_path[1].name, "Advanced Mastery");

        // 22 answered + 1 stale record
        assert_eq!(report.updated_srs_schedule.len(), 23);
        // stale record untouched and due
        assert_eq!(report.summary.review_due, 1);
        assert_eq!(report.due_for_review[0].question_id, "old1");
        assert_eq!(report.due_for_review[0].overdue_days, 3);

        // phase bundle + 1 gap bundle
        assert_eq!(report.next_question_criteria.len(), 2);

        assert_eq!(report.summary.readiness_score, 52); // round((20 + 83) / 2)
        assert_eq!(report.summary.avg_time_spent_ms, 60_000);
        assert_eq!(report.summary.path_phases, 2);
    }

    #[test]
    fn test_empty_input_completes_with_zeroes() {
        let input = PipelineInput {
            user_id: "u1".to_string(),
            ..Default::default()
        };
        let report = run(&input, NOW);
        assert_eq!(report.status, RunStatus::Completed);
        assert!(report.mastery.is_empty());
        assert!(report.knowledge_gaps.is_empty());
        assert!(report.recommended_path.is_empty());
        assert_eq!(report.summary.readiness_score, 0);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_determinism_byte_identical_reports() {
        let input = fixture_input();
        let a = serde_json::to_string(&run(&input, NOW)).unwrap();
        let b = serde_json::to_string(&run(&input, NOW)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_user_id_fails_before_stages() {
        let input = PipelineInput {
            user_id: "  ".to_string(),
            ..fixture_input()
        };
        let report = run(&input, NOW);
        assert_eq!(report.status, RunStatus::Failed);
        let err = report.error.unwrap();
        assert!(err.message.contains("user_id"));
        // atomic: schedule handed back unchanged
        assert_eq!(report.updated_srs_schedule, input.existing_srs_schedule);
    }

    #[test]
    fn test_mislabelled_incorrect_answer_is_rejected() {
        let mut input = fixture_input();
        input.incorrect_answers[0].correct = true;
        let report = run(&input, NOW);
        assert_eq!(report.status, RunStatus::Failed);
    }

    #[test]
    fn test_panicking_stage_is_atomic() {
        fn explode(_: &PipelineState, _: &PipelineConfig) -> Result<StageUpdate, RecapError> {
            panic!("forced failure")
        }
        let input = fixture_input();
        let config = PipelineConfig::default();
        let mut state = PipelineState::new(&input, NOW);
        let stages: [(&str, StageFn); 2] = [("analyze", mastery::analyze), ("boom", explode)];

        let err = execute_stages(&mut state, &config, &stages).unwrap_err();
        match &err {
            RecapError::StageComputation { stage, message } => {
                assert_eq!(stage, "boom");
                assert!(message.contains("forced failure"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let report = failed_report(&input, NOW, &err);
        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(report.updated_srs_schedule, input.existing_srs_schedule);
        let run_err = report.error.unwrap();
        assert_eq!(run_err.stage.as_deref(), Some("boom"));
    }

    #[test]
    fn test_stage_error_carries_stage_name() {
        fn refuse(_: &PipelineState, _: &PipelineConfig) -> Result<StageUpdate, RecapError> {
            Err(RecapError::InvalidInput("no".into()))
        }
        let input = fixture_input();
        let mut state = PipelineState::new(&input, NOW);
        let stages: [(&str, StageFn); 1] = [("gaps", refuse)];
        let err = execute_stages(&mut state, &PipelineConfig::default(), &stages).unwrap_err();
        assert!(matches!(
            err,
            RecapError::StageComputation { ref stage, .. } if stage == "gaps"
        ));
    }
}
