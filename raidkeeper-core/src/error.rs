//! Error types for raidkeeper-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading the orchestrator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file did not exist at the expected path.
    #[error("configuration not found at {path}")]
    NotFound { path: PathBuf },

    /// Underlying I/O failure reading the file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error. Includes file path and line context from serde_yaml.
    #[error("failed to parse configuration at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Parsed but semantically unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from persisting a counter.
#[derive(Debug, Error)]
pub enum CounterError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn counter_io(path: impl Into<PathBuf>, source: std::io::Error) -> CounterError {
    CounterError::Io {
        path: path.into(),
        source,
    }
}
