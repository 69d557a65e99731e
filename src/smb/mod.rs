//! SMB share access
//!
//! Session traits, connection parameters and the smbclient-backed transport.

pub mod error;
pub mod params;
pub mod path_utils;
pub mod session;
pub mod smbclient;

#[cfg(test)]
pub mod memory;

pub use error::SmbError;
pub use params::{AuthMode, ConnectionParameters, DEFAULT_SMB_PORT};
pub use path_utils::{normalize_remote_path, PathError};
pub use session::{RemoteEntry, SessionConnector, ShareSession, TRANSFER_CHUNK_SIZE};
pub use smbclient::SmbClientConnector;
