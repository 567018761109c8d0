//! map-picker CLI entry point
//!
//! Map picker with reverse geocoding and place search - CLI + web server

use map_picker::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
