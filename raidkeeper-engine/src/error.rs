//! Error types for raidkeeper-engine.

use std::path::PathBuf;

use thiserror::Error;

use raidkeeper_detector::DiscoverError;
use raidkeeper_report::ReportError;

/// The comparison step's output could not be turned into a change summary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// One or more of the five count lines is absent.
    #[error("comparison output is missing count line(s): {}", .fields.join(", "))]
    MissingField { fields: Vec<&'static str> },

    /// A count line carried a number that does not fit.
    #[error("invalid {field} count '{value}'")]
    InvalidCount { field: &'static str, value: String },
}

/// Fatal conditions that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The array tool configuration could not be read.
    #[error("array layout discovery failed: {0}")]
    Discover(#[from] DiscoverError),

    /// A content or parity file required before touching the array is absent.
    #[error("required array artifact(s) missing: {}", display_paths(.paths))]
    ArtifactMissing { paths: Vec<PathBuf> },

    /// The comparison output was incomplete.
    #[error("cannot decide on sync: {0}")]
    Parse(#[from] ParseError),

    /// The run log could not be created or read back.
    #[error("run log I/O error at {path}: {source}")]
    RunLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

impl RunError {
    /// Short reason used as the diagnostic subject line.
    pub fn subject(&self) -> &'static str {
        match self {
            RunError::Discover(_) => "Array configuration could not be read",
            RunError::ArtifactMissing { .. } => "Required content or parity file is missing",
            RunError::Parse(_) => "Comparison counts could not be parsed",
            RunError::RunLog { .. } => "Run log could not be written",
            RunError::Report(_) => "Report could not be built",
        }
    }
}

pub(crate) fn run_log_err(path: impl Into<PathBuf>, source: std::io::Error) -> RunError {
    RunError::RunLog {
        path: path.into(),
        source,
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
