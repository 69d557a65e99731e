//! Upload destination on a share

use crate::smb::path_utils::split_parent;
use crate::smb::{normalize_remote_path, PathError};

/// Share plus normalized, share-relative file path.
///
/// The path never starts with `/` and is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    share_name: String,
    remote_path: String,
}

impl RemoteTarget {
    pub fn new(share_name: impl Into<String>, remote_path: &str) -> Result<Self, PathError> {
        let remote_path = normalize_remote_path(remote_path)?;
        if remote_path.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self {
            share_name: share_name.into(),
            remote_path,
        })
    }

    pub fn share_name(&self) -> &str {
        &self.share_name
    }

    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    /// All segments but the last; empty at the share root.
    pub fn remote_dir(&self) -> &str {
        split_parent(&self.remote_path).0
    }

    pub fn file_name(&self) -> &str {
        split_parent(&self.remote_path).1
    }
}
