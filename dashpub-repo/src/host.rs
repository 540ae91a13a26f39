//! GitLab repository-host queries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use dashpub_core::GitLabConfig;

use crate::error::RepoError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimal GitLab API client, used for exactly one thing: the creation date
/// of the last commit on the target branch, which bounds the set of
/// versions worth publishing.
pub struct GitLabHost {
    base_url: String,
    access_token: Option<String>,
    project_id: String,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    created_at: DateTime<Utc>,
}

impl GitLabHost {
    /// `None` unless the configuration enables the host query (both `url`
    /// and `project_id` set).
    pub fn from_config(config: &GitLabConfig) -> Option<Self> {
        if !config.is_enabled() {
            return None;
        }
        let url = config.url.as_deref()?;
        let project_id = config.project_id.as_deref()?;
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Some(Self {
            base_url: url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            project_id: project_id.to_string(),
            agent,
        })
    }

    /// When the last commit on `branch` was created. Any failure is fatal
    /// for the run: an unknown cutoff must not silently widen the set of
    /// versions that get re-published.
    pub fn last_commit_timestamp(&self, branch: &str) -> Result<DateTime<Utc>, RepoError> {
        let url = format!(
            "{}/api/v4/projects/{}/repository/commits/{}",
            self.base_url, self.project_id, branch
        );
        let request = match &self.access_token {
            Some(token) => self.agent.get(&url).set("PRIVATE-TOKEN", token),
            None => self.agent.get(&url),
        };
        match request.call() {
            Ok(response) => {
                let info: CommitInfo =
                    response.into_json().map_err(|e| RepoError::HostDecode {
                        url: url.clone(),
                        source: e,
                    })?;
                tracing::debug!("last commit on {branch}: {}", info.created_at);
                Ok(info.created_at)
            }
            Err(ureq::Error::Status(status, response)) => Err(RepoError::Host {
                url,
                status,
                reason: response.status_text().to_string(),
            }),
            Err(ureq::Error::Transport(transport)) => Err(RepoError::HostTransport(transport)),
        }
    }
}
