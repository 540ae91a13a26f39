//! Grafana source catalog — wire types and a blocking HTTP client.
//!
//! Public API surface:
//! - [`types`] — [`DashboardSummary`], [`VersionEntry`], [`DashboardContent`]
//! - [`client`] — [`GrafanaClient`]
//! - [`error`] — [`GrafanaError`]

pub mod client;
pub mod error;
pub mod types;

pub use client::GrafanaClient;
pub use error::GrafanaError;
pub use types::{DashboardContent, DashboardSummary, VersionEntry};
