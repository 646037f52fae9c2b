//! Invocation logging for recapctl.
//!
//! Appends one JSONL record per invocation, best-effort: a failure to
//! log never fails the command.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use recap_common::RecapError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Log entry for each recapctl invocation
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 timestamp
    pub ts: String,

    /// Request ID (UUID)
    pub req_id: String,

    /// Command name
    pub command: String,

    /// Duration in milliseconds
    pub duration_ms: u64,

    /// Success flag
    pub ok: bool,

    /// Error details if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: i32,
    pub message: String,
}

/// Discover the log file path with a fallback chain:
///
/// 1. `$RECAPCTL_LOG_FILE` (explicit override)
/// 2. `$XDG_STATE_HOME/recap/recapctl.log`
/// 3. `$HOME/.local/state/recap/recapctl.log`
fn log_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("RECAPCTL_LOG_FILE") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        if !state_home.is_empty() {
            return Some(PathBuf::from(state_home).join("recap").join("recapctl.log"));
        }
    }
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".local")
            .join("state")
            .join("recap")
            .join("recapctl.log")
    })
}

/// Append one entry for this invocation.
pub fn append_entry(command: &str, elapsed: Duration, result: &anyhow::Result<()>) {
    let entry = LogEntry {
        ts: Utc::now().to_rfc3339(),
        req_id: Uuid::new_v4().to_string(),
        command: command.to_string(),
        duration_ms: elapsed.as_millis() as u64,
        ok: result.is_ok(),
        error: result.as_ref().err().map(|err| ErrorDetails {
            code: err
                .downcast_ref::<RecapError>()
                .map(RecapError::exit_code)
                .unwrap_or(1),
            message: format!("{:#}", err),
        }),
    };

    let Some(path) = log_path() else { return };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(json) = serde_json::to_string(&entry) else {
        return;
    };
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
        let _ = writeln!(file, "{}", json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_entry_omits_error() {
        let entry = LogEntry {
            ts: "2026-01-01T00:00:00Z".to_string(),
            req_id: "r1".to_string(),
            command: "run".to_string(),
            duration_ms: 12,
            ok: true,
            error: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("error"));
    }

    #[test]
    fn test_failed_entry_carries_exit_code() {
        let result: anyhow::Result<()> =
            Err(RecapError::InvalidInput("user_id must not be empty".into()).into());
        let details = result.as_ref().err().map(|err| {
            err.downcast_ref::<RecapError>()
                .map(RecapError::exit_code)
                .unwrap_or(1)
        });
        assert_eq!(details, Some(65));
    }
}
