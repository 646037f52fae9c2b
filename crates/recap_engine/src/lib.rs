//! Recap Engine - adaptive learning scheduling pipeline.
//!
//! A pure, synchronous, snapshot-in/snapshot-out computation: given a
//! user's answer history and prior SRS state, produce per-topic mastery
//! estimates, ranked knowledge gaps, a phased learning path, an updated
//! spaced-repetition schedule, and a prioritized practice recommendation.
//!
//! Stages run in a fixed order, each reading the accumulated state and
//! returning a partial update the runner merges before the next stage:
//!
//! analyze → gaps → path → srs → prioritize
//!
//! No stage performs I/O or reads a clock; "now" is injected by the
//! caller, which keeps runs deterministic and independently parallel.

pub mod gaps;
pub mod mastery;
pub mod path;
pub mod prioritize;
pub mod runner;
pub mod srs;
pub mod state;

pub use runner::{run, run_with_config};
pub use state::{PipelineState, StageUpdate};
