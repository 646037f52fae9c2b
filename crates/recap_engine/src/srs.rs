//! Spaced-repetition scheduler.
//!
//! A pure state-transition function applied once per answered question.
//! Correct answers climb one level and gain ease; incorrect answers cost
//! two levels and lose ease, so forgetting is penalized harder than
//! remembering is rewarded. Records are never removed from the schedule.

use std::collections::BTreeMap;

use recap_common::{
    DueReview, PipelineConfig, RecapError, SrsConfig, SrsRecord, MS_PER_DAY, MS_PER_HOUR,
};

use crate::state::{PipelineState, StageUpdate};

/// Stage 4: apply this run's answers to the schedule and compute the due
/// set.
pub fn schedule(state: &PipelineState, config: &PipelineConfig) -> Result<StageUpdate, RecapError> {
    let mut updated = state.existing_srs_schedule.clone();
    for question in &state.answered_questions {
        let previous = updated.get(&question.question_id);
        let next = apply_answer(
            previous,
            &question.question_id,
            question.correct,
            state.now_ms,
            &config.srs,
        );
        updated.insert(question.question_id.clone(), next);
    }

    let due_for_review = due_reviews(&updated, state.now_ms);

    Ok(StageUpdate {
        updated_srs_schedule: Some(updated),
        due_for_review: Some(due_for_review),
        ..Default::default()
    })
}

/// Transition one record for one answer.
///
/// `previous: None` means a never-seen question; it gets the default
/// record (level 0, SM-2 ease) and the transition still applies.
pub fn apply_answer(
    previous: Option<&SrsRecord>,
    question_id: &str,
    correct: bool,
    now_ms: i64,
    config: &SrsConfig,
) -> SrsRecord {
    let (level, ease_factor) = match previous {
        Some(record) => (record.level, record.ease_factor),
        None => (0, config.initial_ease),
    };

    let (level, ease_factor) = if correct {
        (
            (level + 1).min(config.max_level()),
            (ease_factor + config.ease_gain).min(config.ease_max),
        )
    } else {
        (
            level.saturating_sub(config.lapse_level_penalty),
            (ease_factor - config.ease_penalty).max(config.ease_min),
        )
    };

    let base = config.base_intervals_hours[level as usize];
    let interval_hours = (f64::from(base) * ease_factor).round() as u32;

    SrsRecord {
        question_id: question_id.to_string(),
        level,
        ease_factor,
        interval_hours,
        next_review_at_ms: now_ms + i64::from(interval_hours) * MS_PER_HOUR,
    }
}

/// All due records, most overdue first; ties break on question id so the
/// order is total.
pub fn due_reviews(schedule: &BTreeMap<String, SrsRecord>, now_ms: i64) -> Vec<DueReview> {
    let mut due: Vec<DueReview> = schedule
        .values()
        .filter(|record| record.is_due(now_ms))
        .map(|record| DueReview {
            question_id: record.question_id.clone(),
            overdue_days: (now_ms - record.next_review_at_ms) / MS_PER_DAY,
            next_review_at_ms: record.next_review_at_ms,
        })
        .collect();
    due.sort_by(|a, b| {
        b.overdue_days
            .cmp(&a.overdue_days)
            .then_with(|| a.question_id.cmp(&b.question_id))
    });
    due
}
