//! Classified upload outcomes

use thiserror::Error;

use crate::smb::SmbError;

/// Failure of an upload, in exactly one of three categories.
///
/// Messages are complete and safe to hand back to the caller verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Session could not be established
    #[error("{0}")]
    Connection(String),

    /// Target exists and overwrite was not requested
    #[error("{0}")]
    PathConflict(String),

    /// Transfer (or local read) failed after the session was open
    #[error("{0}")]
    Storage(String),
}

/// Substrings of a connection failure that indicate a transient network fault
const TRANSIENT_MARKERS: &[&str] = &[
    "connection refused",
    "connection reset",
    "connection timed out",
    "timed out",
    "timeout",
    "network is unreachable",
    "host unreachable",
    "no route to host",
    "broken pipe",
    "temporary failure",
    "nt_status_io_timeout",
    "nt_status_connection_",
    "nt_status_host_unreachable",
    "nt_status_network_unreachable",
];

impl RelayError {
    pub fn connection(err: SmbError) -> Self {
        RelayError::Connection(format!("Could not connect to SMB server: {}", err))
    }

    /// Whether repeating the whole operation may succeed.
    ///
    /// Only connection faults qualify; conflicts and storage faults are final.
    pub fn is_transient(&self) -> bool {
        match self {
            RelayError::Connection(msg) => {
                let lower = msg.to_lowercase();
                TRANSIENT_MARKERS.iter().any(|m| lower.contains(m))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_message() {
        let err = RelayError::connection(SmbError::ConnectionFailed("Connection refused".into()));
        assert_eq!(
            err.to_string(),
            "Could not connect to SMB server: Connection failed: Connection refused"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(RelayError::Connection("Could not connect: Connection refused".into()).is_transient());
        assert!(RelayError::Connection("NT_STATUS_IO_TIMEOUT".into()).is_transient());
        assert!(RelayError::Connection("No route to host".into()).is_transient());

        assert!(!RelayError::Connection("Authentication failed: NT_STATUS_LOGON_FAILURE".into())
            .is_transient());
        assert!(!RelayError::Storage("broken pipe".into()).is_transient());
        assert!(!RelayError::PathConflict("Remote file already exists: a.txt".into()).is_transient());
    }
}
