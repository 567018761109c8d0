//! HTTP server for map-picker
//!
//! Hosts widget sessions so a browser front end can render the scene and
//! forward clicks, drags, searches and selections.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::constants::server::REAP_INTERVAL_SECS;
use crate::error::{Error, Result};
use crate::geo::locationiq::LocationIqBackend;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Start the HTTP server
///
/// # Arguments
/// * `config` - Server and geocoder configuration
///
/// # Returns
/// Never returns unless the server shuts down
pub async fn run(config: Config) -> Result<()> {
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let geocoder = LocationIqBackend::from_config(&config)?;
    let state = Arc::new(AppState::new(config, geocoder));
    if state.config.server.session_ttl_secs > 0 {
        spawn_reaper(state.clone());
    }
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

    Ok(())
}

/// Sweep idle sessions in the background for the life of the process
fn spawn_reaper(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(REAP_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            state.reap_expired().await;
        }
    });
}
