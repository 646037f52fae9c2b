//! Mastery estimator.
//!
//! Derives a 0-100 confidence-weighted mastery score per topic tag from
//! the raw answer history. Scores for thinly-evidenced topics are damped
//! so a single lucky or unlucky answer cannot saturate them.

use std::collections::BTreeMap;

use recap_common::{MasteryConfig, PipelineConfig, RecapError};

use crate::state::{PipelineState, StageUpdate};

#[derive(Debug, Default)]
struct TagTally {
    attempts: u32,
    correct: u32,
}

/// Stage 1: per-tag mastery, strength areas, weakness areas.
pub fn analyze(state: &PipelineState, config: &PipelineConfig) -> Result<StageUpdate, RecapError> {
    let mut tallies: BTreeMap<String, TagTally> = BTreeMap::new();
    for question in &state.answered_questions {
        for tag in &question.tags {
            let tally = tallies.entry(tag.clone()).or_default();
            tally.attempts += 1;
            if question.correct {
                tally.correct += 1;
            }
        }
    }

    let mut mastery = BTreeMap::new();
    let mut strength_areas = Vec::new();
    let mut weakness_areas = Vec::new();
    for (tag, tally) in &tallies {
        let score = mastery_score(tally.correct, tally.attempts, &config.mastery);
        if score >= config.mastery.strength_threshold {
            strength_areas.push(tag.clone());
        } else if score < config.mastery.weakness_threshold {
            weakness_areas.push(tag.clone());
        }
        mastery.insert(tag.clone(), score);
    }

    Ok(StageUpdate {
        mastery: Some(mastery),
        strength_areas: Some(strength_areas),
        weakness_areas: Some(weakness_areas),
        ..Default::default()
    })
}

/// Confidence-weighted mastery score, 0..=100.
///
/// accuracy * min(1, attempts / confidence_window), rounded.
pub fn mastery_score(correct: u32, attempts: u32, config: &MasteryConfig) -> u32 {
    if attempts == 0 {
        return 0;
    }
    let accuracy = 100.0 * f64::from(correct) / f64::from(attempts);
    let confidence = (f64::from(attempts) / f64::from(config.confidence_window)).min(1.0);
    ((accuracy * confidence).round() as u32).min(100)
}
