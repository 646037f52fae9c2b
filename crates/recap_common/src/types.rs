//! Core data types for the Recap learning pipeline.
//!
//! Everything the pipeline reads or produces has a named shape here. Map
//! and set fields use ordered collections so a serialized report is
//! byte-stable for identical input and clock.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::RunError;

/// Milliseconds in one hour
pub const MS_PER_HOUR: i64 = 3_600_000;

/// Milliseconds in one day
pub const MS_PER_DAY: i64 = 86_400_000;

/// Question difficulty band
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner = 0,
    #[default]
    Intermediate = 1,
    Advanced = 2,
}

impl Difficulty {
    /// Weight used in the path generator's priority score
    pub fn weight(&self) -> u32 {
        match self {
            Difficulty::Beginner => 1,
            Difficulty::Intermediate => 2,
            Difficulty::Advanced => 3,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        };
        write!(f, "{}", s)
    }
}

/// Severity tier for a knowledge gap
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum GapSeverity {
    Critical = 0,
    High = 1,
    #[default]
    Medium = 2,
}

impl GapSeverity {
    /// Sort rank, most urgent first
    pub fn rank(&self) -> u32 {
        *self as u32
    }

    /// Multiplier used in the path generator's priority score
    pub fn multiplier(&self) -> u32 {
        match self {
            GapSeverity::Critical => 3,
            GapSeverity::High => 2,
            GapSeverity::Medium => 1,
        }
    }
}

impl std::fmt::Display for GapSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GapSeverity::Critical => "critical",
            GapSeverity::High => "high",
            GapSeverity::Medium => "medium",
        };
        write!(f, "{}", s)
    }
}

/// One answered question from the caller's history snapshot.
///
/// Read-only input; the pipeline never mutates history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    /// Question bank id
    pub question_id: String,
    /// Topic tags attached to the question
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Whether the latest attempt was correct
    pub correct: bool,
    /// Difficulty band of the question
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Time spent answering, in milliseconds
    #[serde(default)]
    pub time_spent_ms: u64,
}

/// A topic whose mastery fell below the weakness threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeGap {
    /// Topic tag
    pub topic: String,
    /// Severity tier derived from the mastery score
    pub severity: GapSeverity,
    /// Number of incorrect answers carrying this tag
    pub error_count: u32,
    /// Most frequent difficulty among those errors
    pub common_difficulty: Difficulty,
    /// Fixed study recommendation for this mastery band
    pub recommendation: String,
}

/// One ordered block of the recommended learning path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningPathPhase {
    /// 1-based position in the path
    pub phase_number: u32,
    /// Phase title
    pub name: String,
    /// Topics to work through, most urgent first
    pub focus_topics: Vec<String>,
    /// Difficulty band to practice at
    pub difficulty: Difficulty,
    /// Human-readable time estimate
    pub estimated_time: String,
    /// What finishing the phase should achieve
    pub goal: String,
}

/// Per-question spaced-repetition record.
///
/// The only entity with cross-run lifetime: loaded from the caller's
/// store, transitioned once per answer, and handed back for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrsRecord {
    /// Question bank id
    pub question_id: String,
    /// Review ladder rung, 0..=7 (7 is terminal "mastered")
    pub level: u8,
    /// Interval multiplier, clamped to 1.3..=3.0
    pub ease_factor: f64,
    /// Hours until the next review, always > 0
    pub interval_hours: u32,
    /// Next review due time, epoch milliseconds
    pub next_review_at_ms: i64,
}

impl SrsRecord {
    /// Whether this record is due for review at `now_ms`
    pub fn is_due(&self, now_ms: i64) -> bool {
        self.next_review_at_ms <= now_ms
    }

    /// Next review time as a UTC timestamp, if representable
    pub fn next_review_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.next_review_at_ms).single()
    }
}

/// Entry in the due-for-review set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueReview {
    /// Question bank id
    pub question_id: String,
    /// Whole days past the due time
    pub overdue_days: i64,
    /// The record's due time, epoch milliseconds
    pub next_review_at_ms: i64,
}

/// Where a criteria bundle came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriteriaSource {
    /// Current learning-path phase
    Phase,
    /// Ranked knowledge gap
    Gap,
}

/// Selection criteria for the question bank to resolve.
///
/// The prioritizer describes what to practice next; it never resolves
/// criteria into concrete question ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCriteria {
    /// Origin of this bundle
    pub source: CriteriaSource,
    /// Topic tags to select from
    pub tags: Vec<String>,
    /// Difficulty band to select at
    pub difficulty: Difficulty,
    /// Skip questions the user already answered
    pub exclude_already_answered: bool,
    /// How many questions to pull
    pub count: u32,
}

/// Run lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Pending => "pending",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Input snapshot for one pipeline run.
///
/// The caller pre-splits correct vs. incorrect answers and loads the
/// prior SRS schedule; an empty map is a first-time user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineInput {
    /// Owner of the answer history
    pub user_id: String,
    /// Optional scoping hint, logged but never read by a stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Full answer history for this snapshot
    #[serde(default)]
    pub answered_questions: Vec<AnsweredQuestion>,
    /// Ids of correctly answered questions
    #[serde(default)]
    pub correct_ids: BTreeSet<String>,
    /// The incorrect subset of the history
    #[serde(default)]
    pub incorrect_answers: Vec<AnsweredQuestion>,
    /// Per-question time spent, for diagnostic averaging only
    #[serde(default)]
    pub time_spent_by_question: BTreeMap<String, u64>,
    /// Prior persisted SRS state
    #[serde(default)]
    pub existing_srs_schedule: BTreeMap<String, SrsRecord>,
}

/// Compact end-of-run summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Mean mastery across observed topics, 0 with no data
    pub readiness_score: u32,
    /// Topics at or above the strength threshold
    pub strength_count: usize,
    /// Topics below the weakness threshold
    pub weakness_count: usize,
    /// Knowledge gaps found this run
    pub gap_count: usize,
    /// Total records due for review
    pub review_due: usize,
    /// Phases in the recommended path
    pub path_phases: usize,
    /// Mean time spent per question, milliseconds
    pub avg_time_spent_ms: u64,
}

/// Output snapshot of one pipeline run.
///
/// Always returned as a value, tagged by `status`; errors never cross the
/// pipeline boundary as panics. On failure `updated_srs_schedule` is the
/// input schedule unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Terminal run status
    pub status: RunStatus,
    /// The injected clock value this run was computed at
    pub generated_at_ms: i64,
    /// Per-topic mastery scores, 0..=100
    pub mastery: BTreeMap<String, u32>,
    /// Topics at or above the strength threshold
    pub strength_areas: Vec<String>,
    /// Topics below the weakness threshold
    pub weakness_areas: Vec<String>,
    /// Ranked knowledge gaps, most severe first
    pub knowledge_gaps: Vec<KnowledgeGap>,
    /// Phased learning path
    pub recommended_path: Vec<LearningPathPhase>,
    /// Full SRS schedule after applying this run's answers
    pub updated_srs_schedule: BTreeMap<String, SrsRecord>,
    /// Prioritized head of the due set (capped for review)
    pub due_for_review: Vec<DueReview>,
    /// What to practice next, as question-bank selection criteria
    pub next_question_criteria: Vec<QuestionCriteria>,
    /// Compact run summary
    pub summary: PipelineSummary,
    /// Present iff `status` is `failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
}
