//! Blocking Grafana API client.
//!
//! Endpoints used:
//! - `GET api/search?tag=<tag>` — dashboards carrying the published tag
//! - `GET api/dashboards/id/<id>/versions` — version history, newest first
//! - `GET api/dashboards/id/<id>/versions/<n>` — one full version payload
//!
//! Every call is a single synchronous request; there are no retries. 404
//! maps to [`GrafanaError::NotFound`], any other non-success status to
//! [`GrafanaError::Upstream`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use dashpub_core::GrafanaConfig;

use crate::error::GrafanaError;
use crate::types::{DashboardContent, DashboardSummary, VersionEntry};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the source Grafana server. Built once per run.
pub struct GrafanaClient {
    base_url: String,
    api_token: Option<String>,
    published_tag: String,
    publish_marker: String,
    agent: ureq::Agent,
}

impl GrafanaClient {
    pub fn new(config: &GrafanaConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            published_tag: config.published_tag.clone(),
            publish_marker: config.publish_marker.clone(),
            agent,
        }
    }

    /// All dashboards carrying the published tag. An empty list is a valid
    /// answer, not an error.
    pub fn list_published(&self) -> Result<Vec<DashboardSummary>, GrafanaError> {
        let url = format!("{}/api/search", self.base_url);
        let request = self.agent.get(&url).query("tag", &self.published_tag);
        self.call(request, &url)
    }

    /// The newest version of dashboard `id` whose save message marks it as
    /// published, fetched in full.
    ///
    /// `since` drops marker versions created before the cutoff (they are
    /// already in the target). No qualifying entry maps to
    /// [`GrafanaError::NoPublishableVersion`], which callers absorb like a
    /// 404 and move on to the next dashboard.
    pub fn latest_publishable(
        &self,
        id: i64,
        since: Option<DateTime<Utc>>,
    ) -> Result<DashboardContent, GrafanaError> {
        let url = format!("{}/api/dashboards/id/{}/versions", self.base_url, id);
        let history: Vec<VersionEntry> = self.call(self.agent.get(&url), &url)?;

        let entry = match pick_publishable(&history, &self.publish_marker, since) {
            Some(entry) => entry,
            None => {
                tracing::info!(
                    "dashboard id {id} is tagged for publishing, but no new published version is available"
                );
                return Err(GrafanaError::NoPublishableVersion { dashboard_id: id });
            }
        };

        let url = format!(
            "{}/api/dashboards/id/{}/versions/{}",
            self.base_url, id, entry.version
        );
        self.call(self.agent.get(&url), &url)
    }

    /// Human change note for a version message: `"<marker>: text"` yields
    /// `"text"`, a bare marker yields `"Updated"`, anything else is passed
    /// through as-is.
    pub fn publish_message(&self, raw: &str) -> String {
        let message = raw.trim();
        let prefix = format!("{}:", self.publish_marker);
        match message.strip_prefix(&prefix) {
            Some(rest) => rest.trim().to_string(),
            None if message == self.publish_marker => "Updated".to_string(),
            None => message.to_string(),
        }
    }

    fn call<T: DeserializeOwned>(
        &self,
        request: ureq::Request,
        url: &str,
    ) -> Result<T, GrafanaError> {
        let request = match &self.api_token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        };
        match request.call() {
            Ok(response) => response.into_json().map_err(|e| GrafanaError::Decode {
                url: url.to_string(),
                source: e,
            }),
            Err(ureq::Error::Status(404, _)) => Err(GrafanaError::NotFound {
                url: url.to_string(),
            }),
            Err(ureq::Error::Status(status, response)) => Err(GrafanaError::Upstream {
                status,
                reason: response.status_text().to_string(),
            }),
            Err(ureq::Error::Transport(transport)) => Err(GrafanaError::Transport(transport)),
        }
    }
}

/// First history entry whose message contains the marker and whose creation
/// date is not older than the cutoff. The feed is newest-first, so the first
/// hit is the latest published version.
fn pick_publishable<'a>(
    history: &'a [VersionEntry],
    marker: &str,
    since: Option<DateTime<Utc>>,
) -> Option<&'a VersionEntry> {
    for entry in history {
        if !entry.message.contains(marker) {
            continue;
        }
        if let Some(cutoff) = since {
            if entry.created < cutoff {
                tracing::info!("version {} skipped (already published)", entry.version);
                continue;
            }
        }
        return Some(entry);
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
