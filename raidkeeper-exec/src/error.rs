use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures setting up process execution.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Failures delivering a report or a health-check ping.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("I/O error talking to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} exited with {status}")]
    Sendmail { path: PathBuf, status: ExitStatus },

    #[error("health-check ping to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> NotifyError {
    NotifyError::Io {
        path: path.into(),
        source,
    }
}
