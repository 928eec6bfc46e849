//! raidkeeper core library: domain types, configuration, counters, errors.
//!
//! - [`types`]: change summary, thresholds, decisions, run outcome
//! - [`config`]: YAML configuration load / path resolution
//! - [`counters`]: the two file-backed counters that survive between runs
//! - [`error`]: [`ConfigError`], [`CounterError`]

pub mod config;
pub mod counters;
pub mod error;
pub mod types;

pub use config::Config;
pub use counters::{CounterKind, CounterStore};
pub use error::{ConfigError, CounterError};
pub use types::{
    Breach, ChangeSummary, Job, RunOutcome, ScrubDecision, ScrubSkipReason, StepResult,
    SyncDecision, ThresholdConfig,
};
