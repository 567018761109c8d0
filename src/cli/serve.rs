//! Serve command handler
//!
//! Starts the HTTP server in foreground mode.

use crate::config::Config;
use crate::error::Result;
use crate::server;
use clap::Args;
use tracing::info;

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Seconds an idle widget session survives (0 keeps sessions forever)
    #[arg(long, value_name = "SECS")]
    pub session_ttl: Option<u64>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = Config::load()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ttl) = args.session_ttl {
        config.server.session_ttl_secs = ttl;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server_addr(),
        session_ttl_secs = config.server.session_ttl_secs,
        "starting map-picker server"
    );

    server::run(config).await
}
