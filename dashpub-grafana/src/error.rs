//! Error types for dashpub-grafana.

use thiserror::Error;

/// All errors that can arise from Grafana API calls.
#[derive(Debug, Error)]
pub enum GrafanaError {
    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {url}")]
    NotFound { url: String },

    /// The version history has no new entry marked for publishing.
    #[error("no publishable version for dashboard id {dashboard_id}")]
    NoPublishableVersion { dashboard_id: i64 },

    /// The server answered with a non-success status other than 404.
    #[error("grafana returned {status} {reason}")]
    Upstream { status: u16, reason: String },

    /// Connection, DNS or TLS failure before any response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Transport),

    /// The response body was not the expected JSON.
    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl GrafanaError {
    /// Conditions absorbed per dashboard — the run continues with the next
    /// one instead of aborting.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GrafanaError::NotFound { .. } | GrafanaError::NoPublishableVersion { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_are_absorbable() {
        assert!(GrafanaError::NotFound { url: "http://g/api/x".into() }.is_not_found());
        assert!(GrafanaError::NoPublishableVersion { dashboard_id: 7 }.is_not_found());
    }

    #[test]
    fn upstream_is_fatal() {
        let err = GrafanaError::Upstream {
            status: 502,
            reason: "Bad Gateway".into(),
        };
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("502"));
    }
}
