//! Dashpub core library — configuration model, loading, validation.
//!
//! Public API surface:
//! - [`config`] — [`Config`] and its nested sections
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;

pub use config::{Config, GitLabConfig, GrafanaConfig, TargetConfig};
pub use error::ConfigError;
