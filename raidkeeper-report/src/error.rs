//! Error types for raidkeeper-report.

use thiserror::Error;

/// All errors that can arise while building a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),
}
