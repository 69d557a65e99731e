//! smb-relay - forwards HTTP uploads to an SMB share
//!
//! `relay` holds the upload workflow and health probe, `smb` the session
//! abstraction and its smbclient transport, `server` the axum surface.

pub mod config;
pub mod relay;
pub mod server;
pub mod smb;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging
///
/// `RUST_LOG` wins; otherwise `fallback` (the `LOG_LEVEL` setting), otherwise
/// `info`.
pub fn init_logging(fallback: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback.unwrap_or("info").to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
