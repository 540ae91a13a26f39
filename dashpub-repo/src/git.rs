//! Git working copy gateway.
//!
//! All version control goes through the `git` binary with captured output;
//! nothing links a git library. Any non-zero exit is fatal and carries the
//! combined stderr/stdout diagnostics — there are no retries.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use dashpub_core::TargetConfig;

use crate::error::RepoError;

/// How the working copy relates to a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteMode {
    /// Pre-existing working copy; remotes are neither verified nor updated.
    Local,
    /// Managed clone of this URL; verified, pulled, cloned as needed.
    Remote(String),
}

/// Gateway to the working copy that receives published dashboards.
#[derive(Debug, Clone)]
pub struct GitWorkingCopy {
    clone_path: PathBuf,
    remote: RemoteMode,
    branch: String,
}

impl GitWorkingCopy {
    pub fn new(config: &TargetConfig) -> Self {
        let remote = if config.is_local() {
            RemoteMode::Local
        } else {
            RemoteMode::Remote(config.repo_url.clone())
        };
        Self {
            clone_path: config.clone_path.clone(),
            remote,
            branch: config.branch.clone(),
        }
    }

    pub fn clone_path(&self) -> &Path {
        &self.clone_path
    }

    pub fn remote(&self) -> &RemoteMode {
        &self.remote
    }

    fn is_working_copy(&self) -> bool {
        self.clone_path.join(".git").exists()
    }

    /// Bring the working copy to the tip of the configured branch.
    ///
    /// Local mode only verifies that a repository answers `git status`.
    /// Remote mode verifies `remote.origin.url` against the configuration
    /// (refusing to commit dashboards into a repository pointed somewhere
    /// else), then checks out and pulls the branch; a missing working copy
    /// is cloned at the configured branch.
    pub fn ensure_current(&self) -> Result<(), RepoError> {
        match &self.remote {
            RemoteMode::Local => {
                self.run(&["status"], "checking target repository")?;
            }
            RemoteMode::Remote(url) => {
                if self.is_working_copy() {
                    let actual =
                        self.run(&["config", "--get", "remote.origin.url"], "reading remote url")?;
                    if actual != *url {
                        return Err(RepoError::RemoteMismatch {
                            expected: url.clone(),
                            actual,
                        });
                    }
                    self.run(&["checkout", &self.branch], "checking out branch")?;
                    self.run(&["pull"], "pulling latest changes")?;
                } else {
                    tracing::info!("target repository not found, cloning");
                    self.clone_repo(url)?;
                }
            }
        }
        Ok(())
    }

    /// Stage everything and record a single commit with `message`.
    pub fn commit(&self, message: &str) -> Result<(), RepoError> {
        self.run(&["add", "-A"], "staging changes")?;
        self.run(&["commit", "-m", message], "committing changes")?;
        Ok(())
    }

    /// Push the commit to the configured branch.
    pub fn push(&self) -> Result<(), RepoError> {
        match &self.remote {
            RemoteMode::Remote(_) => {
                self.run(&["push", "origin", &self.branch], "pushing changes")?;
            }
            // No remote name is known in local mode; use the default.
            RemoteMode::Local => {
                self.run(&["push"], "pushing changes")?;
            }
        }
        Ok(())
    }

    /// `git clone --branch <branch>` runs outside the (absent) working
    /// copy, so it builds its own command instead of going through `run`.
    fn clone_repo(&self, url: &str) -> Result<(), RepoError> {
        let action = "cloning target repository";
        let output = Command::new("git")
            .args(["clone", "--branch", &self.branch, "--single-branch", url])
            .arg(&self.clone_path)
            .output()
            .map_err(|e| RepoError::GitSpawn { action, source: e })?;
        check(action, &output)?;
        tracing::debug!("{action}: ok");
        Ok(())
    }

    /// Run git inside the working copy, returning trimmed stdout.
    fn run(&self, args: &[&str], action: &'static str) -> Result<String, RepoError> {
        let output = Command::new("git")
            .current_dir(&self.clone_path)
            .args(args)
            .output()
            .map_err(|e| RepoError::GitSpawn { action, source: e })?;
        check(action, &output)?;
        tracing::debug!("{action}: ok");
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn check(action: &'static str, output: &Output) -> Result<(), RepoError> {
    if output.status.success() {
        return Ok(());
    }
    Err(RepoError::GitCommand {
        action,
        detail: format_git_error(output),
    })
}

/// Combined stderr/stdout diagnostic for a failed git command.
fn format_git_error(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    match (stderr.is_empty(), stdout.is_empty()) {
        (true, true) => format!("exit code {}", output.status.code().unwrap_or(-1)),
        (true, false) => stdout,
        (false, true) => stderr,
        (false, false) => format!("{stderr}\n{stdout}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
