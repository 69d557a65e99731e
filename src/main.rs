use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use smb_relay::config::Cli;
use smb_relay::server::{self, AppState};
use smb_relay::smb::SmbClientConnector;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    smb_relay::init_logging(cli.log_level.as_deref());

    let connector = SmbClientConnector::new();
    info!("Using smbclient at {}", connector.binary().display());
    if let Err(e) = cli.smb.connection_parameters() {
        // Still serve: /health reports not_configured, /upload returns 500
        warn!("{}", e);
    }

    let state = AppState::new(Arc::new(connector), cli.smb.clone());
    if let Err(e) = server::serve(cli.bind_addr, state, cli.max_upload_bytes).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
