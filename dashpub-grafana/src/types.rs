//! Wire types for the Grafana HTTP API.
//!
//! Only the fields dashpub needs are modelled; everything else in the
//! responses is ignored on deserialization. The dashboard model itself is
//! never interpreted — it stays an opaque [`serde_json::Value`] so the
//! written files carry exactly what Grafana stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One dashboard as returned by the tag search (`api/search`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub id: i64,
    pub uid: String,
    pub title: String,
    /// Absent for dashboards in the General folder; defaults to empty,
    /// which places the file at the dashboard tree root.
    #[serde(rename = "folderTitle", default)]
    pub folder_title: String,
}

/// One entry of a dashboard's version history feed (newest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: i64,
    #[serde(default)]
    pub message: String,
    pub created: DateTime<Utc>,
}

/// Full payload of a single dashboard version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardContent {
    pub version: i64,
    #[serde(default)]
    pub message: String,
    /// The dashboard model, re-serialized verbatim into the target file.
    pub data: Value,
}

impl DashboardContent {
    /// Title embedded in the dashboard model.
    pub fn title(&self) -> &str {
        self.data
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("<untitled>")
    }

    /// Uid embedded in the dashboard model, when present.
    pub fn uid(&self) -> Option<&str> {
        self.data.get("uid").and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
