//! The publish run: catalog sweep, reconciliation, commit and push.
//!
//! One [`Publisher::run`] call performs one batch pass:
//!
//! 1. Ask the repository host (when configured) for the last commit date on
//!    the publish branch; it becomes the version cutoff.
//! 2. Sweep the catalog for tagged dashboards and fetch the latest published
//!    version of each. Dashboards without a new published version are
//!    skipped.
//! 3. Nothing pending: the run ends without touching the repository.
//! 4. Otherwise bring the working copy up to date, classify every pending
//!    dashboard against the target tree, and write where the source is
//!    ahead. Versions in the target only ever go up.
//! 5. Stage everything, commit once, push once.
//!
//! A per-dashboard "nothing to publish" answer is absorbed; any other error
//! aborts the whole run. Files written before an abort stay on disk
//! uncommitted and converge on the next run.

use std::path::PathBuf;

use dashpub_core::Config;
use dashpub_grafana::{DashboardContent, DashboardSummary, GrafanaClient};
use dashpub_repo::{GitLabHost, GitWorkingCopy, TargetStore};

use crate::error::PublishError;
use crate::message::{commit_message, ChangeEntry};
use crate::writer::write_dashboard;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Outcome of reconciling a single dashboard against the target tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No file in the target carried the uid; a new one was written.
    Created { title: String, path: PathBuf },
    /// The stored version was older; the file was rewritten in place.
    Updated {
        title: String,
        path: PathBuf,
        from_version: i64,
        to_version: i64,
    },
    /// The stored version equals the published version; nothing written.
    Current { title: String },
    /// The stored version is ahead of the published one; never downgraded.
    TargetNewer {
        title: String,
        target_version: i64,
        source_version: i64,
    },
    /// `--dry-run` stand-in for [`SyncOutcome::Created`].
    WouldCreate { title: String, path: PathBuf },
    /// `--dry-run` stand-in for [`SyncOutcome::Updated`].
    WouldUpdate {
        title: String,
        path: PathBuf,
        from_version: i64,
        to_version: i64,
    },
}

/// What one publish run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Dashboards carrying the published tag in the catalog.
    pub checked: usize,
    /// One outcome per dashboard that had a pending published version.
    pub outcomes: Vec<SyncOutcome>,
    /// Dashboards actually written (created or updated).
    pub updated: usize,
    /// Whether a commit was made and pushed.
    pub committed: bool,
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// All collaborators of a publish run, built once from the configuration.
pub struct Publisher {
    grafana: GrafanaClient,
    store: TargetStore,
    repo: GitWorkingCopy,
    host: Option<GitLabHost>,
    branch: String,
}

impl Publisher {
    pub fn from_config(config: &Config) -> Self {
        Self {
            grafana: GrafanaClient::new(&config.grafana),
            store: TargetStore::new(config.target.dashboard_root()),
            repo: GitWorkingCopy::new(&config.target),
            host: GitLabHost::from_config(&config.target.gitlab),
            branch: config.target.branch.clone(),
        }
    }

    /// One batch pass over the catalog.
    ///
    /// With `dry_run` the run classifies every pending dashboard but mutates
    /// nothing: no clone, no pull, no writes, no commit.
    pub fn run(&self, dry_run: bool) -> Result<RunSummary, PublishError> {
        let since = match &self.host {
            Some(host) => Some(host.last_commit_timestamp(&self.branch)?),
            None => None,
        };

        let summaries = self.grafana.list_published()?;
        let checked = summaries.len();

        let mut pending: Vec<(DashboardSummary, DashboardContent)> = Vec::new();
        for summary in summaries {
            tracing::info!("checking dashboard {} (id {})", summary.title, summary.id);
            match self.grafana.latest_publishable(summary.id, since) {
                Ok(content) => pending.push((summary, content)),
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if pending.is_empty() {
            tracing::info!("no dashboards need to be updated");
            return Ok(RunSummary {
                checked,
                outcomes: Vec::new(),
                updated: 0,
                committed: false,
            });
        }
        tracing::info!("dashboards to update: {}", pending.len());

        if !dry_run {
            self.repo.ensure_current()?;
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        let mut changes = Vec::new();
        for (summary, content) in &pending {
            let outcome = self.reconcile(summary, content, dry_run)?;
            if matches!(
                outcome,
                SyncOutcome::Created { .. } | SyncOutcome::Updated { .. }
            ) {
                changes.push(ChangeEntry {
                    title: content.title().to_string(),
                    message: self.grafana.publish_message(&content.message),
                });
            }
            outcomes.push(outcome);
        }

        let committed = if changes.is_empty() {
            false
        } else {
            self.repo.commit(&commit_message(&changes))?;
            self.repo.push()?;
            true
        };

        tracing::info!("done, {} dashboards updated", changes.len());
        Ok(RunSummary {
            checked,
            outcomes,
            updated: changes.len(),
            committed,
        })
    }

    /// Compare one published dashboard with the target tree and write it out
    /// when the source is ahead.
    fn reconcile(
        &self,
        summary: &DashboardSummary,
        content: &DashboardContent,
        dry_run: bool,
    ) -> Result<SyncOutcome, PublishError> {
        let title = content.title().to_string();

        match self.store.locate(&summary.uid)? {
            None => {
                let path = self.store.allocate_path(&summary.folder_title, content.title());
                if dry_run {
                    tracing::info!("[dry-run] would create: {}", path.display());
                    return Ok(SyncOutcome::WouldCreate { title, path });
                }
                tracing::info!("dashboard {} not present in target, creating", title);
                write_dashboard(&path, &content.data)?;
                Ok(SyncOutcome::Created { title, path })
            }
            Some(record) if record.version == content.version => {
                tracing::info!("dashboard {} is up to date, skipping", title);
                Ok(SyncOutcome::Current { title })
            }
            Some(record) if record.version > content.version => {
                tracing::warn!(
                    "dashboard {} is newer in the target ({} > {}), skipping",
                    title,
                    record.version,
                    content.version
                );
                Ok(SyncOutcome::TargetNewer {
                    title,
                    target_version: record.version,
                    source_version: content.version,
                })
            }
            Some(record) => {
                if dry_run {
                    tracing::info!("[dry-run] would update: {}", record.path.display());
                    return Ok(SyncOutcome::WouldUpdate {
                        title,
                        path: record.path,
                        from_version: record.version,
                        to_version: content.version,
                    });
                }
                tracing::info!(
                    "updating dashboard {} (version {} -> {})",
                    title,
                    record.version,
                    content.version
                );
                write_dashboard(&record.path, &content.data)?;
                Ok(SyncOutcome::Updated {
                    title,
                    path: record.path,
                    from_version: record.version,
                    to_version: content.version,
                })
            }
        }
    }
}
