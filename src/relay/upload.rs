//! Upload orchestration
//!
//! `connect → ensure directories → conflict check → store → release`. The
//! session is released on every path once it has been opened.

use std::path::Path;

use tracing::info;

use super::conflict::check_conflict;
use super::error::RelayError;
use super::reconcile::ensure_directory_path;
use super::session::{open_session, release_session};
use super::target::RemoteTarget;
use super::transfer::store;
use crate::smb::{ConnectionParameters, SessionConnector, ShareSession};

/// Upload `local_path` to `target`. Returns the number of bytes stored.
pub async fn upload(
    connector: &dyn SessionConnector,
    params: &ConnectionParameters,
    local_path: &Path,
    target: &RemoteTarget,
    overwrite: bool,
) -> Result<u64, RelayError> {
    let session = open_session(connector, params).await?;
    let outcome = upload_with_session(session.as_ref(), local_path, target, overwrite).await;
    release_session(session, params).await;

    if outcome.is_ok() {
        info!(
            "Uploaded {} to {}",
            local_path.display(),
            params.share_url(target.remote_path())
        );
    }
    outcome
}

async fn upload_with_session(
    session: &dyn ShareSession,
    local_path: &Path,
    target: &RemoteTarget,
    overwrite: bool,
) -> Result<u64, RelayError> {
    ensure_directory_path(session, target.share_name(), target.remote_dir()).await;
    check_conflict(session, target.share_name(), target.remote_path(), overwrite).await?;
    store(session, target, local_path).await
}
