//! YAML configuration.
//!
//! # Lookup order
//!
//! 1. an explicit path (`--config` or `RAIDKEEPER_CONFIG`)
//! 2. `<config_dir>/raidkeeper/config.yaml` when it exists
//! 3. `/etc/raidkeeper/config.yaml`
//!
//! Every section carries defaults, so a minimal file only lists what differs:
//!
//! ```yaml
//! array_tool:
//!   config_file: /etc/snapraid.conf
//! thresholds:
//!   delete: 250
//!   sync_warn: 3
//! notify:
//!   email_to: admin@example.com
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::ThresholdConfig;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/raidkeeper/config.yaml";
pub const SYNC_WARN_COUNTER_FILE: &str = "sync_warn.count";
pub const SCRUB_DELAY_COUNTER_FILE: &str = "scrub_delay.count";
pub const RUN_LOG_FILE: &str = "last_run.log";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub array_tool: ArrayToolConfig,
    pub thresholds: ThresholdConfig,
    pub sync: SyncConfig,
    pub scrub: ScrubConfig,
    pub post: PostConfig,
    pub paths: PathsConfig,
    pub notify: NotifyConfig,
}

/// How to invoke the array tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrayToolConfig {
    pub binary: PathBuf,
    /// The array tool's own configuration file (passed with `-c`).
    pub config_file: PathBuf,
    /// Lines whose presence in sync/scrub output confirms the step finished.
    pub completion_markers: Vec<String>,
    /// Pass `-q` to sync and scrub.
    pub quiet: bool,
}

impl Default for ArrayToolConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("snapraid"),
            config_file: PathBuf::from("/etc/snapraid.conf"),
            completion_markers: vec!["Everything OK".to_string(), "Nothing to do".to_string()],
            quiet: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Hash new data before syncing (`-h`).
    pub prehash: bool,
    /// Accept files that became zero-sized (`--force-zero`).
    pub force_zero: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            prehash: true,
            force_zero: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubConfig {
    /// Percentage of the array to scrub per run. Zero disables scrubbing.
    pub percent: u8,
    /// Only scrub blocks older than this many days (`-o`).
    pub age_days: u32,
    /// Scrub newly synced blocks (`-p new`) before the percentage scrub.
    pub scrub_new: bool,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            percent: 5,
            age_days: 10,
            scrub_new: false,
        }
    }
}

/// Steps run after sync/scrub regardless of their outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub touch: bool,
    pub smart_report: bool,
    pub status_report: bool,
    pub spin_down: bool,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            touch: true,
            smart_report: true,
            status_report: true,
            spin_down: false,
        }
    }
}

/// Where state and the run log live. Unset file paths resolve under
/// `state_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_warn_counter: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrub_delay_counter: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_log: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("/var/lib/raidkeeper"),
            sync_warn_counter: None,
            scrub_delay_counter: None,
            run_log: None,
        }
    }
}

impl PathsConfig {
    pub fn sync_warn_counter_path(&self) -> PathBuf {
        self.sync_warn_counter
            .clone()
            .unwrap_or_else(|| self.state_dir.join(SYNC_WARN_COUNTER_FILE))
    }

    pub fn scrub_delay_counter_path(&self) -> PathBuf {
        self.scrub_delay_counter
            .clone()
            .unwrap_or_else(|| self.state_dir.join(SCRUB_DELAY_COUNTER_FILE))
    }

    pub fn run_log_path(&self) -> PathBuf {
        self.run_log
            .clone()
            .unwrap_or_else(|| self.state_dir.join(RUN_LOG_FILE))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Recipient. Email is skipped entirely when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_from: Option<String>,
    /// sendmail-compatible program; invoked as `<sendmail> -t`.
    pub sendmail: PathBuf,
    pub subject_prefix: String,
    /// Health-check base URL; `/start` and `/fail` are appended as needed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcheck_url: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            email_to: None,
            email_from: None,
            sendmail: PathBuf::from("/usr/sbin/sendmail"),
            subject_prefix: "[raidkeeper]".to_string(),
            healthcheck_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load and validate the configuration at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with path +
/// line context) if malformed YAML, `ConfigError::Invalid` if a value is out
/// of range.
pub fn load_at(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = if contents.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };
    config.validate()?;
    Ok(config)
}

/// Resolve the configuration path and load it.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    load_at(&resolve_path(explicit))
}

/// Pick the configuration file to use. Pure apart from one existence check.
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(user) = user_config_path() {
        if user.exists() {
            return user;
        }
    }
    PathBuf::from(SYSTEM_CONFIG_PATH)
}

/// `<config_dir>/raidkeeper/config.yaml` for the current user, if a config
/// directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("raidkeeper").join("config.yaml"))
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scrub.percent > 100 {
            return Err(ConfigError::Invalid(format!(
                "scrub.percent must be between 0 and 100, got {}",
                self.scrub.percent
            )));
        }
        if self.array_tool.completion_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "array_tool.completion_markers must contain at least one non-empty marker"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
