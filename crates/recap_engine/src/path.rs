//! Path generator.
//!
//! Converts ranked gaps plus strong topics into an ordered sequence of
//! learning phases. The four-phase order is fixed; a weighted priority
//! score only reorders gaps inside one phase bucket.

use recap_common::{
    Difficulty, GapSeverity, KnowledgeGap, LearningPathPhase, PipelineConfig, RecapError,
};

use crate::state::{PipelineState, StageUpdate};

/// Phase template: severity bucket, name, difficulty, estimate, goal
const GAP_PHASES: [(GapSeverity, &str, Difficulty, &str, &str); 3] = [
    (
        GapSeverity::Critical,
        "Foundation Building",
        Difficulty::Beginner,
        "2-3 weeks",
        "Rebuild fundamentals in the weakest topics",
    ),
    (
        GapSeverity::High,
        "Core Concepts",
        Difficulty::Intermediate,
        "3-4 weeks",
        "Close the remaining gaps in core material",
    ),
    (
        GapSeverity::Medium,
        "Skill Refinement",
        Difficulty::Intermediate,
        "2-3 weeks",
        "Sharpen technique on nearly-solid topics",
    ),
];

const MASTERY_PHASE: (&str, Difficulty, &str, &str) = (
    "Advanced Mastery",
    Difficulty::Advanced,
    "ongoing",
    "Push strong topics to interview depth",
);

/// Stage 3: up to four phases, numbered consecutively, empty buckets
/// skipped.
pub fn generate(state: &PipelineState, _config: &PipelineConfig) -> Result<StageUpdate, RecapError> {
    let mut recommended_path = Vec::new();
    let mut phase_number = 1;

    for (severity, name, difficulty, estimated_time, goal) in GAP_PHASES {
        let mut bucket: Vec<&KnowledgeGap> = state
            .knowledge_gaps
            .iter()
            .filter(|gap| gap.severity == severity)
            .collect();
        if bucket.is_empty() {
            continue;
        }
        // stable: equal scores keep the analyzer's alphabetical order
        bucket.sort_by(|a, b| priority_score(b).cmp(&priority_score(a)));

        recommended_path.push(LearningPathPhase {
            phase_number,
            name: name.to_string(),
            focus_topics: bucket.iter().map(|gap| gap.topic.clone()).collect(),
            difficulty,
            estimated_time: estimated_time.to_string(),
            goal: goal.to_string(),
        });
        phase_number += 1;
    }

    if !state.strength_areas.is_empty() {
        let (name, difficulty, estimated_time, goal) = MASTERY_PHASE;
        recommended_path.push(LearningPathPhase {
            phase_number,
            name: name.to_string(),
            focus_topics: state.strength_areas.clone(),
            difficulty,
            estimated_time: estimated_time.to_string(),
            goal: goal.to_string(),
        });
    }

    Ok(StageUpdate {
        recommended_path: Some(recommended_path),
        ..Default::default()
    })
}

/// Weighted priority of a gap: difficulty weight x severity multiplier.
pub fn priority_score(gap: &KnowledgeGap) -> u32 {
    gap.common_difficulty.weight() * gap.severity.multiplier()
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_common::PipelineInput;

    fn make_gap(topic: &str, severity: GapSeverity, difficulty: Difficulty) -> KnowledgeGap {
        KnowledgeGap {
            topic: topic.to_string(),
            severity,
            error_count: 3,
            common_difficulty: difficulty,
            recommendation: "Review core concepts".to_string(),
        }
    }

    fn state_with(gaps: Vec<KnowledgeGap>, strengths: &[&str]) -> PipelineState {
        let input = PipelineInput {
            user_id: "u1".to_string(),
            ..Default::default()
        };
        let mut state = PipelineState::new(&input, 0);
        state.knowledge_gaps = gaps;
        state.strength_areas = strengths.iter().map(|s| s.to_string()).collect();
        state
    }

    fn generate_path(state: &PipelineState) -> Vec<LearningPathPhase> {
        generate(state, &PipelineConfig::default())
            .unwrap()
            .recommended_path
            .unwrap()
    }

    #[test]
    fn test_all_four_phases_in_fixed_order() {
        let state = state_with(
            vec![
                make_gap("bits", GapSeverity::Critical, Difficulty::Beginner),
                make_gap("graphs", GapSeverity::High, Difficulty::Intermediate),
                make_gap("greedy", GapSeverity::Medium, Difficulty::Intermediate),
            ],
            &["arrays"],
        );
        let path = generate_path(&state);
        let names: Vec<&str> = path.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Foundation Building",
                "Core Concepts",
                "Skill Refinement",
                "Advanced Mastery"
            ]
        );
        let numbers: Vec<u32> = path.iter().map(|p| p.phase_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(path[0].difficulty, Difficulty::Beginner);
        assert_eq!(path[3].difficulty, Difficulty::Advanced);
        assert_eq!(path[3].focus_topics, vec!["arrays".to_string()]);
    }

    #[test]
    fn test_empty_buckets_are_skipped_and_numbering_stays_consecutive() {
        let state = state_with(
            vec![make_gap("graphs", GapSeverity::High, Difficulty::Intermediate)],
            &["arrays"],
        );
        let path = generate_path(&state);
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].name, "Core Concepts");
        assert_eq!(path[0].phase_number, 1);
        assert_eq!(path[1].name, "Advanced Mastery");
        assert_eq!(path[1].phase_number, 2);
    }

    #[test]
    fn test_no_gaps_no_strengths_empty_path() {
        let state = state_with(Vec::new(), &[]);
        assert!(generate_path(&state).is_empty());
    }

    #[test]
    fn test_priority_score_orders_within_bucket() {
        // advanced-difficulty gap outranks beginner-difficulty in the
        // same severity bucket
        let state = state_with(
            vec![
                make_gap("arrays", GapSeverity::Critical, Difficulty::Beginner),
                make_gap("dp", GapSeverity::Critical, Difficulty::Advanced),
            ],
            &[],
        );
        let path = generate_path(&state);
        assert_eq!(
            path[0].focus_topics,
            vec!["dp".to_string(), "arrays".to_string()]
        );
    }

    #[test]
    fn test_priority_score_weights() {
        let gap = make_gap("x", GapSeverity::Critical, Difficulty::Advanced);
        assert_eq!(priority_score(&gap), 9);
        let gap = make_gap("x", GapSeverity::Medium, Difficulty::Beginner);
        assert_eq!(priority_score(&gap), 1);
    }
}
