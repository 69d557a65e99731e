//! SMB transport error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmbError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Share not found: {0}")]
    ShareNotFound(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("smbclient not available: {0}")]
    ClientUnavailable(String),

    #[error("smbclient command failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SmbError {
    /// Map an `NT_STATUS_*` code reported by the server onto a variant.
    pub fn from_nt_status(status: &str, detail: String) -> Self {
        match status {
            "NT_STATUS_LOGON_FAILURE"
            | "NT_STATUS_WRONG_PASSWORD"
            | "NT_STATUS_NO_SUCH_USER"
            | "NT_STATUS_ACCOUNT_DISABLED"
            | "NT_STATUS_ACCOUNT_LOCKED_OUT"
            | "NT_STATUS_ACCOUNT_RESTRICTION"
            | "NT_STATUS_PASSWORD_EXPIRED" => SmbError::AuthenticationFailed(detail),
            "NT_STATUS_ACCESS_DENIED" => SmbError::AccessDenied(detail),
            "NT_STATUS_BAD_NETWORK_NAME" => SmbError::ShareNotFound(detail),
            "NT_STATUS_OBJECT_NAME_NOT_FOUND"
            | "NT_STATUS_OBJECT_PATH_NOT_FOUND"
            | "NT_STATUS_NO_SUCH_FILE" => SmbError::NotFound(detail),
            "NT_STATUS_OBJECT_NAME_COLLISION" => SmbError::AlreadyExists(detail),
            "NT_STATUS_IO_TIMEOUT" => SmbError::Timeout(detail),
            "NT_STATUS_HOST_UNREACHABLE"
            | "NT_STATUS_NETWORK_UNREACHABLE"
            | "NT_STATUS_CONNECTION_REFUSED"
            | "NT_STATUS_CONNECTION_RESET"
            | "NT_STATUS_CONNECTION_DISCONNECTED"
            | "NT_STATUS_PIPE_BROKEN" => SmbError::ConnectionFailed(detail),
            _ => SmbError::CommandFailed(detail),
        }
    }
}
