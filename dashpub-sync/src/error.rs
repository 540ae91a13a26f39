//! Error types for `dashpub-sync`.

use std::path::PathBuf;

use thiserror::Error;

use dashpub_grafana::GrafanaError;
use dashpub_repo::RepoError;

/// Errors that abort a publish run.
///
/// Wraps the catalog and repository error types; the only failures raised
/// directly by this crate are serialization and filesystem errors while
/// writing dashboard files.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Talking to the dashboard catalog failed.
    #[error(transparent)]
    Grafana(#[from] GrafanaError),

    /// A repository, git, or host operation failed.
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// A dashboard model could not be serialized.
    #[error("cannot serialize dashboard JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Filesystem error with path context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Helper to construct `PublishError::Io` with path context.
pub(crate) fn io_err(path: &std::path::Path, e: std::io::Error) -> PublishError {
    PublishError::Io {
        path: path.to_path_buf(),
        source: e,
    }
}
