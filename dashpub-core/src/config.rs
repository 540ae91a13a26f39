//! Configuration model.
//!
//! # Sources, in override order
//!
//! 1. Built-in defaults (every field has one; required fields default empty
//!    and are rejected by [`Config::validate`]).
//! 2. A YAML file, loaded with [`Config::from_file`]. All keys are optional.
//! 3. Environment variables with the `DASHPUB_` prefix, one per option,
//!    applied by [`Config::apply_env`].
//!
//! [`Config::load`] runs all three steps and validates the result, so a
//! process only ever sees a complete, checked configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Connection settings for the Grafana server acting as the dashboard source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrafanaConfig {
    /// Base URL of the Grafana server, e.g. `https://grafana.example.com`.
    pub url: String,
    /// API token sent as a bearer token; `None` for anonymous servers.
    pub api_token: Option<String>,
    /// Dashboards carrying this tag are considered for publishing.
    pub published_tag: String,
    /// A version is published when its save message contains this marker.
    pub publish_marker: String,
}

impl Default for GrafanaConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_token: None,
            published_tag: "publish".to_string(),
            publish_marker: "PUBLISH".to_string(),
        }
    }
}

/// The git repository that receives published dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Remote URL of the repository, or `"local"` to use an existing working
    /// copy without verifying or updating its remotes.
    pub repo_url: String,
    /// Directory holding (or receiving) the working copy.
    pub clone_path: PathBuf,
    /// Subdirectory of the clone that holds dashboard JSON files.
    pub dashboard_path: PathBuf,
    /// Branch that receives the published dashboards.
    pub branch: String,
    /// Optional GitLab API access for the already-published cutoff.
    pub gitlab: GitLabConfig,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            repo_url: String::new(),
            clone_path: PathBuf::new(),
            dashboard_path: PathBuf::new(),
            branch: "master".to_string(),
            gitlab: GitLabConfig::default(),
        }
    }
}

impl TargetConfig {
    /// `"local"` (any case) disables remote verification, pull and clone.
    pub fn is_local(&self) -> bool {
        self.repo_url.eq_ignore_ascii_case("local")
    }

    /// `<clone_path>/<dashboard_path>` — the root of the dashboard tree.
    pub fn dashboard_root(&self) -> PathBuf {
        self.clone_path.join(&self.dashboard_path)
    }
}

/// GitLab API access. When [`GitLabConfig::is_enabled`] the last commit date
/// of the target branch is fetched and versions older than it are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GitLabConfig {
    /// Base URL of the GitLab instance, e.g. `https://gitlab.example.com`.
    pub url: Option<String>,
    /// Token sent as `PRIVATE-TOKEN`; `None` for public projects.
    pub access_token: Option<String>,
    /// Numeric project id or URL-encoded `group/project` path.
    pub project_id: Option<String>,
}

impl GitLabConfig {
    pub fn is_enabled(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    fn has_project(&self) -> bool {
        self.project_id.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

/// Root of the dashpub configuration. Immutable after [`Config::load`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub grafana: GrafanaConfig,
    pub target: TargetConfig,
}

impl Config {
    /// Load from an optional YAML file, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML config file. A file containing only comments (or nothing)
    /// yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let parsed: Option<Config> =
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(parsed.unwrap_or_default())
    }

    /// Apply `DASHPUB_*` environment overrides on top of the current values.
    /// Unset or empty variables leave the current value alone.
    pub fn apply_env(&mut self) {
        if let Some(v) = env_var("DASHPUB_GRAFANA_URL") {
            self.grafana.url = v;
        }
        if let Some(v) = env_var("DASHPUB_GRAFANA_API_TOKEN") {
            self.grafana.api_token = Some(v);
        }
        if let Some(v) = env_var("DASHPUB_GRAFANA_PUBLISHED_TAG") {
            self.grafana.published_tag = v;
        }
        if let Some(v) = env_var("DASHPUB_GRAFANA_PUBLISH_MARKER") {
            self.grafana.publish_marker = v;
        }
        if let Some(v) = env_var("DASHPUB_TARGET_REPO_URL") {
            self.target.repo_url = v;
        }
        if let Some(v) = env_var("DASHPUB_TARGET_CLONE_PATH") {
            self.target.clone_path = PathBuf::from(v);
        }
        if let Some(v) = env_var("DASHPUB_TARGET_DASHBOARD_PATH") {
            self.target.dashboard_path = PathBuf::from(v);
        }
        if let Some(v) = env_var("DASHPUB_TARGET_BRANCH") {
            self.target.branch = v;
        }
        if let Some(v) = env_var("DASHPUB_GITLAB_URL") {
            self.target.gitlab.url = Some(v);
        }
        if let Some(v) = env_var("DASHPUB_GITLAB_ACCESS_TOKEN") {
            self.target.gitlab.access_token = Some(v);
        }
        if let Some(v) = env_var("DASHPUB_GITLAB_PROJECT_ID") {
            self.target.gitlab.project_id = Some(v);
        }
    }

    /// Check required options and option combinations. First violation wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        required("grafana.url", &self.grafana.url)?;
        required("grafana.published_tag", &self.grafana.published_tag)?;
        required("grafana.publish_marker", &self.grafana.publish_marker)?;
        required("target.repo_url", &self.target.repo_url)?;
        if self.target.clone_path.as_os_str().is_empty() {
            return Err(invalid("target.clone_path", "must not be empty"));
        }
        required("target.branch", &self.target.branch)?;
        if self.target.gitlab.is_enabled() && !self.target.gitlab.has_project() {
            return Err(invalid(
                "target.gitlab.project_id",
                "required when gitlab.url is set",
            ));
        }
        Ok(())
    }

    /// The commented YAML template written by `dashpub config template`.
    pub fn template() -> &'static str {
        TEMPLATE
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn required(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

const TEMPLATE: &str = r#"# dashpub configuration.
#
# Every option can also be set through the environment variable named
# next to it; environment values override file values.

grafana:
  # Base URL of the Grafana server.               DASHPUB_GRAFANA_URL
  url: ""
  # API token with viewer access; omit for anonymous servers.
  #                                               DASHPUB_GRAFANA_API_TOKEN
  # api_token: glsa_...
  # Dashboards carrying this tag are published.   DASHPUB_GRAFANA_PUBLISHED_TAG
  published_tag: publish
  # A version is published when its save message contains this marker,
  # optionally followed by ":" and a change note.
  #                                               DASHPUB_GRAFANA_PUBLISH_MARKER
  publish_marker: PUBLISH

target:
  # Remote URL of the dashboard repository, or "local" to use an existing
  # working copy without touching its remotes.    DASHPUB_TARGET_REPO_URL
  repo_url: ""
  # Directory holding (or receiving) the working copy.
  #                                               DASHPUB_TARGET_CLONE_PATH
  clone_path: ""
  # Subdirectory of the clone that holds dashboard JSON files.
  #                                               DASHPUB_TARGET_DASHBOARD_PATH
  dashboard_path: ""
  # Branch that receives the published dashboards.
  #                                               DASHPUB_TARGET_BRANCH
  branch: master
  # Optional GitLab API access. When url and project_id are set, the last
  # commit date of the branch is fetched and older published versions are
  # skipped without re-writing them.
  # gitlab:
  #   url: https://gitlab.example.com             DASHPUB_GITLAB_URL
  #   access_token: glpat-...                     DASHPUB_GITLAB_ACCESS_TOKEN
  #   project_id: "42"                            DASHPUB_GITLAB_PROJECT_ID
"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
