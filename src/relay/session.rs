//! Session establishment and release

use tracing::{debug, info, warn};

use super::error::RelayError;
use crate::smb::{ConnectionParameters, SessionConnector, ShareSession};

/// Open an authenticated session. Single attempt; any failure is a
/// connection fault carrying the cause.
pub async fn open_session(
    connector: &dyn SessionConnector,
    params: &ConnectionParameters,
) -> Result<Box<dyn ShareSession>, RelayError> {
    info!(
        "Opening SMB session to {} as {} ({})",
        params.service_path(),
        params.identity().as_deref().unwrap_or("<ticket cache>"),
        params.auth_mode
    );

    connector.connect(params).await.map_err(|e| {
        warn!("SMB connection to {} failed: {}", params.server_label(), e);
        RelayError::connection(e)
    })
}

/// Release a session. Errors are logged and swallowed.
pub async fn release_session(session: Box<dyn ShareSession>, params: &ConnectionParameters) {
    match session.close().await {
        Ok(()) => debug!("Released SMB session to {}", params.service_path()),
        Err(e) => warn!(
            "Failed to release SMB session to {}: {}",
            params.service_path(),
            e
        ),
    }
}
