//! Best-effort provisioning of the destination directory chain

use tracing::{debug, warn};

use crate::smb::path_utils::directory_prefixes;
use crate::smb::ShareSession;

/// What `ensure_directory_path` did, prefix by prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Prefixes probed, in order
    pub probed: Vec<String>,
    /// Prefixes that did not answer the probe and were created
    pub created: Vec<String>,
    /// Prefixes whose creation failed (absorbed)
    pub failed: Vec<String>,
}

/// Make sure every directory of `dir_path` exists on the share.
///
/// Each accumulated prefix is probed with a listing; a failed probe is
/// followed by one creation attempt. Creation failures are logged and the
/// walk continues, since servers may refuse both calls for directories that
/// do exist. Never fails.
pub async fn ensure_directory_path(
    session: &dyn ShareSession,
    share_name: &str,
    dir_path: &str,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for prefix in directory_prefixes(dir_path) {
        report.probed.push(prefix.clone());
        match session.list_path(share_name, &prefix).await {
            Ok(_) => continue,
            Err(e) => debug!("Directory probe for {} failed: {}", prefix, e),
        }

        match session.create_directory(share_name, &prefix).await {
            Ok(()) => {
                debug!("Created directory {} on {}", prefix, share_name);
                report.created.push(prefix);
            }
            Err(e) => {
                warn!(
                    "Could not create directory {} on {} (continuing): {}",
                    prefix, share_name, e
                );
                report.failed.push(prefix);
            }
        }
    }

    report
}
