//! File-backed counters that carry the only state between runs.
//!
//! Each counter is a single decimal integer in its own file. A missing file
//! or unreadable content means zero, so reads never fail. Writes use the
//! same `.tmp` + rename pattern as the rest of the workspace.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::PathsConfig;
use crate::error::{counter_io, CounterError};

/// The two persisted counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CounterKind {
    /// Consecutive runs that skipped sync because of a threshold breach.
    SyncWarn,
    /// Consecutive eligible runs that deferred scrub.
    ScrubDelay,
}

impl CounterKind {
    pub fn all() -> &'static [CounterKind] {
        &[CounterKind::SyncWarn, CounterKind::ScrubDelay]
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterKind::SyncWarn => write!(f, "sync-warn"),
            CounterKind::ScrubDelay => write!(f, "scrub-delay"),
        }
    }
}

/// Paths of both counters. Cheap to clone; holds no open files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterStore {
    sync_warn: PathBuf,
    scrub_delay: PathBuf,
}

impl CounterStore {
    pub fn new(sync_warn: PathBuf, scrub_delay: PathBuf) -> Self {
        Self {
            sync_warn,
            scrub_delay,
        }
    }

    pub fn from_paths(paths: &PathsConfig) -> Self {
        Self::new(paths.sync_warn_counter_path(), paths.scrub_delay_counter_path())
    }

    pub fn path(&self, kind: CounterKind) -> &Path {
        match kind {
            CounterKind::SyncWarn => &self.sync_warn,
            CounterKind::ScrubDelay => &self.scrub_delay,
        }
    }

    /// Current value. Missing file, I/O trouble or non-numeric content all
    /// read as zero.
    pub fn read(&self, kind: CounterKind) -> u32 {
        std::fs::read_to_string(self.path(kind))
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0)
    }

    /// Whether the counter file currently exists.
    pub fn exists(&self, kind: CounterKind) -> bool {
        self.path(kind).exists()
    }

    /// Atomically replace the counter with `value`.
    pub fn write(&self, kind: CounterKind, value: u32) -> Result<(), CounterError> {
        let path = self.path(kind);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| counter_io(dir, e))?;
        }
        let tmp = tmp_path(path);
        std::fs::write(&tmp, format!("{value}\n")).map_err(|e| counter_io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| counter_io(path, e))?;
        Ok(())
    }

    /// Remove the counter. Clearing an absent counter is not an error.
    pub fn clear(&self, kind: CounterKind) -> Result<(), CounterError> {
        let path = self.path(kind);
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(counter_io(path, err)),
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "counter".to_string());
    path.with_file_name(format!("{name}.tmp"))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> CounterStore {
        CounterStore::new(dir.path().join("warn.count"), dir.path().join("delay.count"))
    }

    #[test]
    fn missing_counter_reads_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).read(CounterKind::SyncWarn), 0);
    }

    #[test]
    fn garbage_counter_reads_zero() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        std::fs::write(s.path(CounterKind::ScrubDelay), "not a number").unwrap();
        assert_eq!(s.read(CounterKind::ScrubDelay), 0);
    }

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.write(CounterKind::SyncWarn, 3).unwrap();
        assert_eq!(s.read(CounterKind::SyncWarn), 3);
        assert_eq!(s.read(CounterKind::ScrubDelay), 0, "counters are independent");
    }

    #[test]
    fn write_leaves_no_tmp_behind() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.write(CounterKind::SyncWarn, 1).unwrap();
        assert!(!dir.path().join("warn.count.tmp").exists());
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let s = CounterStore::new(
            dir.path().join("nested").join("state").join("warn.count"),
            dir.path().join("delay.count"),
        );
        s.write(CounterKind::SyncWarn, 7).unwrap();
        assert_eq!(s.read(CounterKind::SyncWarn), 7);
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.write(CounterKind::ScrubDelay, 2).unwrap();
        s.clear(CounterKind::ScrubDelay).unwrap();
        assert!(!s.exists(CounterKind::ScrubDelay));
        s.clear(CounterKind::ScrubDelay).expect("second clear is fine");
        assert_eq!(s.read(CounterKind::ScrubDelay), 0);
    }

    #[test]
    fn kind_display() {
        assert_eq!(CounterKind::SyncWarn.to_string(), "sync-warn");
        assert_eq!(CounterKind::ScrubDelay.to_string(), "scrub-delay");
    }
}
