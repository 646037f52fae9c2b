//! Error types for Recap.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Stage '{stage}' failed: {message}")]
    StageComputation { stage: String, message: String },

    #[error("Bad timestamp: {0}")]
    BadTimestamp(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecapError {
    /// Process exit code for CLI surfaces (sysexits.h conventions)
    pub fn exit_code(&self) -> i32 {
        match self {
            RecapError::InvalidInput(_) => 65,
            RecapError::StageComputation { .. } => 70,
            RecapError::BadTimestamp(_) => 64,
            RecapError::Config(_) => 78,
            RecapError::Io(_) => 66,
            RecapError::Json(_) => 65,
        }
    }
}

/// Error kind carried inside a failed report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunErrorKind {
    InvalidInput,
    StageComputation,
}

/// Serializable failure payload for a `failed` pipeline report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    /// Which class of failure ended the run
    pub kind: RunErrorKind,
    /// Failing stage name, when a stage was reached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Human-readable detail
    pub message: String,
}

impl From<&RecapError> for RunError {
    fn from(err: &RecapError) -> Self {
        match err {
            RecapError::StageComputation { stage, message } => RunError {
                kind: RunErrorKind::StageComputation,
                stage: Some(stage.clone()),
                message: message.clone(),
            },
            other => RunError {
                kind: RunErrorKind::InvalidInput,
                stage: None,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_stable() {
        assert_eq!(RecapError::InvalidInput("x".into()).exit_code(), 65);
        assert_eq!(
            RecapError::StageComputation {
                stage: "srs".into(),
                message: "boom".into()
            }
            .exit_code(),
            70
        );
        assert_eq!(RecapError::Config("x".into()).exit_code(), 78);
    }

    #[test]
    fn test_run_error_keeps_stage_name() {
        let err = RecapError::StageComputation {
            stage: "gaps".into(),
            message: "boom".into(),
        };
        let run_err = RunError::from(&err);
        assert_eq!(run_err.kind, RunErrorKind::StageComputation);
        assert_eq!(run_err.stage.as_deref(), Some("gaps"));
    }
}
