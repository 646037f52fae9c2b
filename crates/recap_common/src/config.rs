//! Pipeline tuning configuration.
//!
//! Every constant the stages use lives here, with defaults carrying the
//! canonical values. A partial TOML file overrides individual tables;
//! anything not mentioned keeps its default. The engine takes the config
//! by reference, so there is no process-wide mutable state.

use serde::{Deserialize, Serialize};

use crate::error::RecapError;

/// Mastery estimator thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteryConfig {
    /// Mastery at or above this is a strength area
    pub strength_threshold: u32,
    /// Mastery below this is a weakness area
    pub weakness_threshold: u32,
    /// Attempts needed before confidence stops damping the score
    pub confidence_window: u32,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            strength_threshold: 70,
            weakness_threshold: 50,
            confidence_window: 10,
        }
    }
}

/// Gap analyzer thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    /// Mastery below this is a critical gap
    pub critical_below: u32,
    /// Mastery band for the "Start with fundamentals" recommendation
    pub fundamentals_below: u32,
    /// Mastery band for the "Review core concepts" recommendation
    pub review_below: u32,
    /// Errors above this trigger the "Practice more examples" recommendation
    pub high_error_count: u32,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            critical_below: 30,
            fundamentals_below: 20,
            review_below: 40,
            high_error_count: 5,
        }
    }
}

/// Spaced-repetition scheduler constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrsConfig {
    /// Base review interval per level, in hours.
    ///
    /// 4h, 1d, 3d, 1wk, 2wk, 1mo, 3mo, 6mo. The last entry is the
    /// terminal "mastered" level.
    pub base_intervals_hours: [u32; 8],
    /// Ease factor assigned to a never-seen question (SM-2 default)
    pub initial_ease: f64,
    /// Lower clamp on the ease factor
    pub ease_min: f64,
    /// Upper clamp on the ease factor
    pub ease_max: f64,
    /// Ease gained on a correct answer
    pub ease_gain: f64,
    /// Ease lost on an incorrect answer
    pub ease_penalty: f64,
    /// Levels lost on an incorrect answer
    pub lapse_level_penalty: u8,
}

impl SrsConfig {
    /// Highest reachable level
    pub fn max_level(&self) -> u8 {
        (self.base_intervals_hours.len() - 1) as u8
    }
}

impl Default for SrsConfig {
    fn default() -> Self {
        Self {
            base_intervals_hours: [4, 24, 72, 168, 336, 720, 2160, 4320],
            initial_ease: 2.5,
            ease_min: 1.3,
            ease_max: 3.0,
            ease_gain: 0.1,
            ease_penalty: 0.2,
            lapse_level_penalty: 2,
        }
    }
}

/// Prioritizer caps and counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrioritizerConfig {
    /// Due reviews surfaced per run
    pub review_cap: usize,
    /// Questions requested for the current phase bundle
    pub phase_question_count: u32,
    /// Knowledge gaps surfaced as practice bundles
    pub gap_cap: usize,
    /// Questions requested per gap bundle
    pub gap_question_count: u32,
}

impl Default for PrioritizerConfig {
    fn default() -> Self {
        Self {
            review_cap: 5,
            phase_question_count: 10,
            gap_cap: 3,
            gap_question_count: 5,
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub mastery: MasteryConfig,
    pub gaps: GapConfig,
    pub srs: SrsConfig,
    pub prioritizer: PrioritizerConfig,
}

impl PipelineConfig {
    /// Parse a (possibly partial) TOML config
    pub fn from_toml_str(raw: &str) -> Result<Self, RecapError> {
        toml::from_str(raw).map_err(|e| RecapError::Config(e.to_string()))
    }
}
