//! Read-only share reachability probe

use serde::Serialize;
use tracing::{info, warn};

use super::session::{open_session, release_session};
use crate::smb::{ConnectionParameters, SessionConnector};

/// Outcome of a probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthResult {
    pub healthy: bool,
    pub connection_ok: bool,
    pub share_accessible: bool,
    pub server_label: String,
    pub share_name: String,
    pub error_detail: Option<String>,
}

/// JSON body returned by the health endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub app_status: String,
    pub smb_connection: String,
    pub smb_share_accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    /// Report for a service that cannot even build connection parameters.
    pub fn not_configured(message: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            app_status: "ok".to_string(),
            smb_connection: "not_configured".to_string(),
            smb_share_accessible: false,
            server: None,
            share: None,
            error: Some(message.into()),
        }
    }
}

impl From<&HealthResult> for HealthReport {
    fn from(result: &HealthResult) -> Self {
        Self {
            status: if result.healthy { "healthy" } else { "unhealthy" }.to_string(),
            app_status: "ok".to_string(),
            smb_connection: if result.connection_ok { "ok" } else { "failed" }.to_string(),
            smb_share_accessible: result.share_accessible,
            server: Some(result.server_label.clone()),
            share: Some(result.share_name.clone()),
            error: result.error_detail.clone(),
        }
    }
}

/// Open a session and list the share root. Never fails.
///
/// A share that cannot be listed is reported the same way as an unreachable
/// server.
pub async fn probe(connector: &dyn SessionConnector, params: &ConnectionParameters) -> HealthResult {
    let unhealthy = |detail: String| HealthResult {
        healthy: false,
        connection_ok: false,
        share_accessible: false,
        server_label: params.server_label(),
        share_name: params.share_name.clone(),
        error_detail: Some(detail),
    };

    let session = match open_session(connector, params).await {
        Ok(session) => session,
        Err(e) => return unhealthy(e.to_string()),
    };

    let listing = session.list_path(&params.share_name, "").await;
    release_session(session, params).await;

    match listing {
        Ok(entries) => {
            info!(
                "Health probe OK: {} ({} root entries)",
                params.service_path(),
                entries.len()
            );
            HealthResult {
                healthy: true,
                connection_ok: true,
                share_accessible: true,
                server_label: params.server_label(),
                share_name: params.share_name.clone(),
                error_detail: None,
            }
        }
        Err(e) => {
            warn!("Health probe could not list {}: {}", params.service_path(), e);
            unhealthy(format!("Share '{}' is not accessible: {}", params.share_name, e))
        }
    }
}
