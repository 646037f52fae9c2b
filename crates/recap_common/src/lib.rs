//! Recap Common - Shared types for the Recap learning pipeline
//!
//! Data model, tuning configuration, and error taxonomy consumed by the
//! engine and by recapctl. No I/O and no clock access lives here; the
//! pipeline stays deterministic because callers inject both.

pub mod config;
pub mod error;
pub mod types;
pub mod ui;

pub use config::*;
pub use error::*;
pub use types::*;
