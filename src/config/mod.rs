//! Runtime configuration
//!
//! Command-line flags with environment fallback for the HTTP listener and
//! the SMB endpoint.

pub mod smb;

use std::net::SocketAddr;

use clap::Parser;

pub use smb::{parse_flag, ConfigError, SmbSettings};

/// Default request body limit (100 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Parser, Debug, Clone)]
#[command(name = "smb-relay", version, about = "HTTP to SMB document relay")]
pub struct Cli {
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Fallback log filter when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub smb: SmbSettings,
}
