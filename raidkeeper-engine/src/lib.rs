//! # raidkeeper-engine
//!
//! The decision-making half of raidkeeper: parses the comparison counts,
//! applies the threshold policy and drives one maintenance run through
//! the array tool.
//!
//! Process spawning and notification delivery live behind the
//! [`ArrayTool`] and [`Notifier`] traits; `raidkeeper-exec` provides the
//! real implementations.

pub mod coordinator;
pub mod error;
pub mod executor;
pub mod notify;
pub mod parser;
pub mod pipeline;
pub mod policy;
pub mod runlog;
pub mod tee;

pub use coordinator::{run, RunContext};
pub use error::{ParseError, RunError};
pub use executor::{args_for, ArrayTool, ToolOutput};
pub use notify::Notifier;
pub use parser::parse_change_summary;
pub use policy::{decide_scrub, decide_sync};
pub use runlog::RunLog;
pub use tee::TeeWriter;
