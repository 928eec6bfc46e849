//! # raidkeeper-report
//!
//! Tera-based report builder: turns a [`RunOutcome`](raidkeeper_core::RunOutcome)
//! and the run log into a subject line, a plain text body and an HTML body.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use raidkeeper_core::{RunOutcome, ThresholdConfig};
//! use raidkeeper_report::ReportBuilder;
//!
//! fn report(outcome: &RunOutcome, log: &str) {
//!     if let Ok(builder) = ReportBuilder::new("[nas]") {
//!         if let Ok(report) = builder.build(outcome, log) {
//!             println!("{}", report.subject);
//!         }
//!     }
//! }
//! # let _ = report(&RunOutcome::new(ThresholdConfig::default(), Utc::now()), "");
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod html;
pub mod subject;

pub use context::ReportContext;
pub use engine::{Report, ReportBuilder};
pub use error::ReportError;
pub use subject::Severity;
