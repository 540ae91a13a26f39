//! Error types for dashpub-repo.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise on the target repository side.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The working copy points at a different remote than configured.
    #[error("target repository has a different remote URL: {actual}")]
    RemoteMismatch { expected: String, actual: String },

    /// A git command exited non-zero.
    #[error("git failed while {action}: {detail}")]
    GitCommand { action: &'static str, detail: String },

    /// The git binary could not be spawned at all.
    #[error("cannot run git while {action}: {source}")]
    GitSpawn {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A file matched the uid but carries no usable integer version.
    #[error("dashboard file {path} has no usable version field")]
    MalformedDashboard { path: PathBuf },

    /// The repository host API answered with a non-success status.
    #[error("gitlab returned {status} {reason} for {url}")]
    Host {
        url: String,
        status: u16,
        reason: String,
    },

    /// Connection failure talking to the repository host API.
    #[error("gitlab transport error: {0}")]
    HostTransport(#[from] ureq::Transport),

    /// The repository host response was not the expected JSON.
    #[error("invalid response from {url}: {source}")]
    HostDecode {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// Directory walk failure while scanning the dashboard tree.
    #[error("scan error: {0}")]
    Walk(#[from] walkdir::Error),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`RepoError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RepoError {
    RepoError::Io {
        path: path.into(),
        source,
    }
}
