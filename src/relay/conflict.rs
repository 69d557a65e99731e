//! Overwrite policy

use tracing::debug;

use super::error::RelayError;
use crate::smb::ShareSession;

/// Refuse the transfer when `remote_path` already exists and `overwrite` is
/// false.
///
/// Any stat failure counts as "absent", so a probe that fails for an
/// unrelated reason lets the transfer proceed.
pub async fn check_conflict(
    session: &dyn ShareSession,
    share_name: &str,
    remote_path: &str,
    overwrite: bool,
) -> Result<(), RelayError> {
    if overwrite {
        return Ok(());
    }

    match session.stat(share_name, remote_path).await {
        Ok(_) => Err(RelayError::PathConflict(format!(
            "Remote file already exists: {}",
            remote_path
        ))),
        Err(e) => {
            debug!("Treating {} as absent: {}", remote_path, e);
            Ok(())
        }
    }
}
