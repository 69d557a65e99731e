//! Share session abstraction
//!
//! The relay core only talks to these traits. `SmbClientConnector` is the
//! production implementation; tests use the in-memory share.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::error::SmbError;
use super::params::ConnectionParameters;

/// Chunk size for streaming file contents to the share (64 KiB)
pub const TRANSFER_CHUNK_SIZE: usize = 64 * 1024;

/// Directory entry or stat result on the share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Entry name (not full path)
    pub name: String,
    pub is_dir: bool,
    /// Size in bytes
    pub size: u64,
    /// Modification time as reported by the server
    pub modified: Option<String>,
}

/// Opens sessions. One connector is shared by all requests; every call
/// produces an independent session.
#[async_trait::async_trait]
pub trait SessionConnector: Send + Sync {
    /// Establish an authenticated session. Single attempt, no retries.
    async fn connect(
        &self,
        params: &ConnectionParameters,
    ) -> Result<Box<dyn ShareSession>, SmbError>;
}

/// A live session bound to one set of connection parameters.
///
/// Paths are share-relative and `/`-delimited. The session is owned by exactly
/// one operation and consumed by `close`.
#[async_trait::async_trait]
pub trait ShareSession: Send + Sync {
    /// List a directory. An empty path lists the share root.
    async fn list_path(&self, share: &str, path: &str) -> Result<Vec<RemoteEntry>, SmbError>;

    /// Fetch attributes of a single file or directory.
    async fn stat(&self, share: &str, path: &str) -> Result<RemoteEntry, SmbError>;

    /// Create one directory level.
    async fn create_directory(&self, share: &str, path: &str) -> Result<(), SmbError>;

    /// Write `source` to `path`, replacing existing content. Returns bytes written.
    async fn store_file(
        &self,
        share: &str,
        path: &str,
        source: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<u64, SmbError>;

    /// Release the session.
    async fn close(self: Box<Self>) -> Result<(), SmbError>;
}

/// Sequentially copy `source` into `sink` in `TRANSFER_CHUNK_SIZE` pieces.
pub async fn copy_in_chunks<W>(
    source: &mut (dyn AsyncRead + Send + Unpin),
    sink: &mut W,
) -> std::io::Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; TRANSFER_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = source.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n]).await?;
        total += n as u64;
    }
    sink.flush().await?;
    Ok(total)
}
