//! The dashboard tree inside the working copy.
//!
//! There is no persisted index: every lookup rescans the tree, so files
//! moved or renamed by hand (or by other committers) are simply found at
//! their new location on the next run.

use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::error::{io_err, RepoError};
use crate::sanitize::sanitize_component;

/// Where a uid already lives in the tree, and at which version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRecord {
    pub version: i64,
    pub path: PathBuf,
}

/// Read access to the dashboard tree.
#[derive(Debug, Clone)]
pub struct TargetStore {
    root: PathBuf,
}

impl TargetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the file holding `uid`, if any. The whole tree is scanned for
    /// `*.json` files; the first one whose top-level `uid` matches wins.
    ///
    /// Files that are not parseable JSON are skipped with a warning, files
    /// without a string `uid` are ignored. A matching file whose `version`
    /// is not an integer is fatal: updating it blindly could downgrade, and
    /// allocating a fresh path would leave two files for one uid.
    pub fn locate(&self, uid: &str) -> Result<Option<TargetRecord>, RepoError> {
        if !self.root.exists() {
            return Ok(None);
        }

        for entry in WalkDir::new(&self.root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
            let value: Value = match serde_json::from_str(&contents) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("skipping unparseable JSON file {}: {}", path.display(), e);
                    continue;
                }
            };

            match value.get("uid").and_then(Value::as_str) {
                Some(file_uid) if file_uid == uid => {
                    let version = value.get("version").and_then(Value::as_i64).ok_or_else(
                        || RepoError::MalformedDashboard {
                            path: path.to_path_buf(),
                        },
                    )?;
                    return Ok(Some(TargetRecord {
                        version,
                        path: path.to_path_buf(),
                    }));
                }
                Some(_) => {}
                None => tracing::debug!("ignoring {}: no uid field", path.display()),
            }
        }

        Ok(None)
    }

    /// Path for a dashboard that is not in the tree yet:
    /// `<root>/<folder>/<title>.json` with both components sanitized and the
    /// file name lowercased, spaces turned into underscores. An empty folder
    /// (General dashboards) collapses to the root. Pure computation — the
    /// writer creates directories when the file is actually written.
    pub fn allocate_path(&self, folder_title: &str, title: &str) -> PathBuf {
        let folder = sanitize_component(folder_title);
        let file = format!(
            "{}.json",
            sanitize_component(title).to_lowercase().replace(' ', "_")
        );
        if folder.is_empty() {
            self.root.join(file)
        } else {
            self.root.join(folder).join(file)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
