//! Array layout discovery for `raidkeeper-detector`.
//!
//! `discover(path)` reads the array tool's own configuration file and returns
//! the content file, every parity file and the data disks. The orchestrator
//! checks the content and parity artifacts exist before touching the array:
//! a missing parity file means a disk is not mounted and syncing would be
//! unsafe.
//!
//! Recognised directives (everything else is ignored):
//!
//! | Directive                                   | Meaning                     |
//! |---------------------------------------------|-----------------------------|
//! | `content <path>`                            | content file (first wins)   |
//! | `parity`, `2-parity` … `6-parity`           | parity file(s), `,`-split   |
//! | `q-parity`, `z-parity`                      | legacy / alternate parity   |
//! | `data <name> <dir>`, `disk <name> <dir>`    | data disk                   |

use std::fs;
use std::path::{Path, PathBuf};

use raidkeeper_core::Config;
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One parity file and the parity level it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParityFile {
    /// Directive as written, e.g. `parity` or `2-parity`.
    pub level: String,
    pub path: PathBuf,
}

/// A data disk entry. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataDisk {
    pub name: String,
    pub path: PathBuf,
}

/// Everything the orchestrator needs to know about the array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayLayout {
    /// The array tool configuration this layout was read from.
    pub source: PathBuf,
    pub content_file: PathBuf,
    pub parity_files: Vec<ParityFile>,
    pub data_disks: Vec<DataDisk>,
}

/// Category of a storage artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Content,
    Parity,
}

/// Presence of one required artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub present: bool,
}

/// Errors from layout discovery.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("array tool configuration not found at {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no content file declared in {path}")]
    NoContentFile { path: PathBuf },

    #[error("no parity file declared in {path}")]
    NoParityFile { path: PathBuf },

    #[error("malformed `{directive}` directive at {path}:{line}")]
    Malformed {
        path: PathBuf,
        line: usize,
        directive: String,
    },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read the array tool configuration at `path` and return its layout.
pub fn discover(path: &Path) -> Result<ArrayLayout, DiscoverError> {
    if !path.exists() {
        return Err(DiscoverError::NotFound { path: path.to_path_buf() });
    }
    let content = fs::read_to_string(path).map_err(|source| DiscoverError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_layout(path, &content)
}

/// `discover` for the array tool configuration named in `config`.
pub fn discover_for(config: &Config) -> Result<ArrayLayout, DiscoverError> {
    discover(&config.array_tool.config_file)
}

/// Parse configuration text. `source` is only used for error messages and
/// the returned layout.
pub fn parse_layout(source: &Path, content: &str) -> Result<ArrayLayout, DiscoverError> {
    let mut content_file: Option<PathBuf> = None;
    let mut parity_files = Vec::new();
    let mut data_disks = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (directive, rest) = match line.split_once(char::is_whitespace) {
            Some((d, r)) => (d, r.trim()),
            None => (line, ""),
        };
        let malformed = || DiscoverError::Malformed {
            path: source.to_path_buf(),
            line: idx + 1,
            directive: directive.to_string(),
        };

        if directive == "content" {
            if rest.is_empty() {
                return Err(malformed());
            }
            content_file.get_or_insert_with(|| PathBuf::from(rest));
        } else if is_parity_directive(directive) {
            let paths: Vec<&str> = rest
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            if paths.is_empty() {
                return Err(malformed());
            }
            parity_files.extend(paths.into_iter().map(|p| ParityFile {
                level: directive.to_string(),
                path: PathBuf::from(p),
            }));
        } else if directive == "data" || directive == "disk" {
            let Some((name, dir)) = rest.split_once(char::is_whitespace) else {
                return Err(malformed());
            };
            data_disks.push(DataDisk {
                name: name.to_string(),
                path: PathBuf::from(dir.trim()),
            });
        }
    }

    let content_file = content_file.ok_or_else(|| DiscoverError::NoContentFile {
        path: source.to_path_buf(),
    })?;
    if parity_files.is_empty() {
        return Err(DiscoverError::NoParityFile { path: source.to_path_buf() });
    }

    Ok(ArrayLayout {
        source: source.to_path_buf(),
        content_file,
        parity_files,
        data_disks,
    })
}

impl ArrayLayout {
    /// Presence of the content file and every parity file, in that order.
    pub fn check_artifacts(&self) -> Vec<ArtifactStatus> {
        let content = std::iter::once((ArtifactKind::Content, &self.content_file));
        let parity = self
            .parity_files
            .iter()
            .map(|p| (ArtifactKind::Parity, &p.path));
        content
            .chain(parity)
            .map(|(kind, path)| ArtifactStatus {
                kind,
                path: path.clone(),
                present: path.exists(),
            })
            .collect()
    }

    /// Required artifacts that are not on disk.
    pub fn missing_artifacts(&self) -> Vec<ArtifactStatus> {
        self.check_artifacts()
            .into_iter()
            .filter(|a| !a.present)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Utilities
// ---------------------------------------------------------------------------

fn is_parity_directive(directive: &str) -> bool {
    match directive {
        "parity" | "q-parity" | "z-parity" => true,
        other => other
            .strip_suffix("-parity")
            .and_then(|n| n.parse::<u8>().ok())
            .is_some_and(|n| (2..=6).contains(&n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_directive_recognition() {
        for d in ["parity", "2-parity", "6-parity", "q-parity", "z-parity"] {
            assert!(is_parity_directive(d), "{d}");
        }
        for d in ["1-parity", "7-parity", "x-parity", "parityfile", "content"] {
            assert!(!is_parity_directive(d), "{d}");
        }
    }

    #[test]
    fn first_content_file_wins() {
        let layout = parse_layout(
            Path::new("snapraid.conf"),
            "content /a/snapraid.content\ncontent /b/snapraid.content\nparity /p/snapraid.parity\n",
        )
        .expect("parse");
        assert_eq!(layout.content_file, PathBuf::from("/a/snapraid.content"));
    }
}
