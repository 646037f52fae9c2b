//! Gap analyzer.
//!
//! Classifies under-mastered topics into severity tiers from the mastery
//! score and the recent error pattern, and attaches a fixed study
//! recommendation per band.

use recap_common::{Difficulty, GapSeverity, KnowledgeGap, PipelineConfig, RecapError};

use crate::state::{PipelineState, StageUpdate};

/// Stage 2: one knowledge gap per weakness area, sorted most severe first.
pub fn classify(state: &PipelineState, config: &PipelineConfig) -> Result<StageUpdate, RecapError> {
    let mut knowledge_gaps = Vec::new();
    for topic in &state.weakness_areas {
        let mastery = state.mastery.get(topic).copied().unwrap_or(0);

        let mut error_count = 0u32;
        // difficulty histogram in first-encountered order, so ties break
        // toward the earliest difficulty seen
        let mut histogram: Vec<(Difficulty, u32)> = Vec::new();
        for question in &state.incorrect_answers {
            if !question.tags.contains(topic) {
                continue;
            }
            error_count += 1;
            match histogram.iter_mut().find(|(d, _)| *d == question.difficulty) {
                Some((_, count)) => *count += 1,
                None => histogram.push((question.difficulty, 1)),
            }
        }

        let mut common: Option<(Difficulty, u32)> = None;
        for &(difficulty, count) in &histogram {
            if common.map_or(true, |(_, best)| count > best) {
                common = Some((difficulty, count));
            }
        }
        let common_difficulty = common.map(|(d, _)| d).unwrap_or_default();

        knowledge_gaps.push(KnowledgeGap {
            topic: topic.clone(),
            severity: severity_for(mastery, config),
            error_count,
            common_difficulty,
            recommendation: recommendation_for(mastery, error_count, config).to_string(),
        });
    }

    // stable, so topics stay alphabetical within a tier
    knowledge_gaps.sort_by_key(|gap| gap.severity.rank());

    Ok(StageUpdate {
        knowledge_gaps: Some(knowledge_gaps),
        ..Default::default()
    })
}

/// Severity tier for a mastery score.
///
/// The `medium` arm is unreachable from pipeline input while the
/// weakness filter sits below it; it is kept for direct callers and for
/// the day the weakness threshold is widened.
pub fn severity_for(mastery: u32, config: &PipelineConfig) -> GapSeverity {
    if mastery < config.gaps.critical_below {
        GapSeverity::Critical
    } else if mastery < config.mastery.weakness_threshold {
        GapSeverity::High
    } else {
        GapSeverity::Medium
    }
}

/// Fixed recommendation lookup, first matching band wins.
pub fn recommendation_for(mastery: u32, error_count: u32, config: &PipelineConfig) -> &'static str {
    if mastery < config.gaps.fundamentals_below {
        "Start with fundamentals"
    } else if mastery < config.gaps.review_below {
        "Review core concepts"
    } else if error_count > config.gaps.high_error_count {
        "Practice more examples"
    } else {
        "Focus on advanced topics"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_common::{AnsweredQuestion, PipelineInput};

    fn make_incorrect(id: &str, tags: &[&str], difficulty: Difficulty) -> AnsweredQuestion {
        AnsweredQuestion {
            question_id: id.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            correct: false,
            difficulty,
            time_spent_ms: 45_000,
        }
    }

    fn state_with(
        weakness: &[(&str, u32)],
        incorrect: Vec<AnsweredQuestion>,
    ) -> PipelineState {
        let input = PipelineInput {
            user_id: "u1".to_string(),
            incorrect_answers: incorrect,
            ..Default::default()
        };
        let mut state = PipelineState::new(&input, 0);
        for (topic, score) in weakness {
            state.mastery.insert(topic.to_string(), *score);
            state.weakness_areas.push(topic.to_string());
        }
        state
    }

    #[test]
    fn test_severity_bands() {
        let config = PipelineConfig::default();
        assert_eq!(severity_for(0, &config), GapSeverity::Critical);
        assert_eq!(severity_for(29, &config), GapSeverity::Critical);
        assert_eq!(severity_for(30, &config), GapSeverity::High);
        assert_eq!(severity_for(49, &config), GapSeverity::High);
        // unreachable from the weakness filter, reachable for callers
        assert_eq!(severity_for(50, &config), GapSeverity::Medium);
    }

    #[test]
    fn test_recommendation_band_order() {
        let config = PipelineConfig::default();
        assert_eq!(recommendation_for(10, 0, &config), "Start with fundamentals");
        // fundamentals band wins even with many errors
        assert_eq!(recommendation_for(19, 9, &config), "Start with fundamentals");
        assert_eq!(recommendation_for(25, 0, &config), "Review core concepts");
        assert_eq!(recommendation_for(45, 6, &config), "Practice more examples");
        assert_eq!(recommendation_for(45, 5, &config), "Focus on advanced topics");
    }

    #[test]
    fn test_common_difficulty_most_frequent() {
        let state = state_with(
            &[("trees", 25)],
            vec![
                make_incorrect("q1", &["trees"], Difficulty::Beginner),
                make_incorrect("q2", &["trees"], Difficulty::Advanced),
                make_incorrect("q3", &["trees"], Difficulty::Advanced),
            ],
        );
        let update = classify(&state, &PipelineConfig::default()).unwrap();
        let gaps = update.knowledge_gaps.unwrap();
        assert_eq!(gaps[0].error_count, 3);
        assert_eq!(gaps[0].common_difficulty, Difficulty::Advanced);
        assert_eq!(gaps[0].severity, GapSeverity::Critical);
    }

    #[test]
    fn test_common_difficulty_tie_breaks_first_seen() {
        let state = state_with(
            &[("graphs", 40)],
            vec![
                make_incorrect("q1", &["graphs"], Difficulty::Advanced),
                make_incorrect("q2", &["graphs"], Difficulty::Beginner),
            ],
        );
        let update = classify(&state, &PipelineConfig::default()).unwrap();
        let gaps = update.knowledge_gaps.unwrap();
        assert_eq!(gaps[0].common_difficulty, Difficulty::Advanced);
    }

    #[test]
    fn test_no_errors_defaults_intermediate() {
        // weak from damping alone: no incorrect answers carry the tag
        let state = state_with(&[("heaps", 10)], Vec::new());
        let update = classify(&state, &PipelineConfig::default()).unwrap();
        let gaps = update.knowledge_gaps.unwrap();
        assert_eq!(gaps[0].error_count, 0);
        assert_eq!(gaps[0].common_difficulty, Difficulty::Intermediate);
    }

    #[test]
    fn test_sorted_critical_before_high() {
        let state = state_with(&[("arrays", 45), ("bits", 10)], Vec::new());
        let update = classify(&state, &PipelineConfig::default()).unwrap();
        let gaps = update.knowledge_gaps.unwrap();
        assert_eq!(gaps[0].topic, "bits");
        assert_eq!(gaps[0].severity, GapSeverity::Critical);
        assert_eq!(gaps[1].topic, "arrays");
        assert_eq!(gaps[1].severity, GapSeverity::High);
    }
}
