//! Byte transfer to the share and failure classification

use std::fmt::Display;
use std::path::Path;

use tokio::fs::File;
use tracing::{info, warn};

use super::error::RelayError;
use super::target::RemoteTarget;
use crate::smb::ShareSession;

/// Error fragments that, for a nested target, point at a missing parent
/// directory. Checked in order against the lowercased message. Best effort:
/// servers and transports word these differently.
const MISSING_DIRECTORY_MARKERS: &[&str] = &["unable to open", "no such file", "path not found"];

/// Turn a transport failure during store into a storage fault.
pub fn classify_store_error(target: &RemoteTarget, err: &dyn Display) -> RelayError {
    let message = err.to_string();
    let lower = message.to_lowercase();

    if !target.remote_dir().is_empty() && MISSING_DIRECTORY_MARKERS.iter().any(|m| lower.contains(m))
    {
        return RelayError::Storage(format!(
            "Failed to store {} on {}: Directory path may not exist. Original error: {}",
            target.remote_path(),
            target.share_name(),
            message
        ));
    }

    RelayError::Storage(format!(
        "Failed to store {} on {}: {}",
        target.remote_path(),
        target.share_name(),
        message
    ))
}

/// Stream `local_path` to the target. Returns the number of bytes written.
pub async fn store(
    session: &dyn ShareSession,
    target: &RemoteTarget,
    local_path: &Path,
) -> Result<u64, RelayError> {
    let mut file = File::open(local_path).await.map_err(|e| {
        RelayError::Storage(format!(
            "Failed to open local file {}: {}",
            local_path.display(),
            e
        ))
    })?;

    match session
        .store_file(target.share_name(), target.remote_path(), &mut file)
        .await
    {
        Ok(written) => {
            info!(
                "Stored {} ({} bytes) in '{}' on {}",
                target.file_name(),
                written,
                target.remote_dir(),
                target.share_name()
            );
            Ok(written)
        }
        Err(e) => {
            warn!("Store of {} failed: {}", target.remote_path(), e);
            Err(classify_store_error(target, &e))
        }
    }
}
