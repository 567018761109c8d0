//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod reverse;
pub mod scene;
pub mod search;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Map picker with reverse geocoding and place search
#[derive(Parser)]
#[command(name = "map-picker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the address of a coordinate
    Reverse(reverse::ReverseArgs),

    /// Search places by name, optionally picking one
    Search(search::SearchArgs),

    /// Mount a widget and print its scene
    Scene(scene::SceneArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Initialize logging to stderr
///
/// RUST_LOG overrides the default level.
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    let level = if matches!(cli.command, Commands::Serve(_)) { "info" } else { "warn" };
    init_logging(level);

    match cli.command {
        Commands::Reverse(args) => reverse::run(args).await,
        Commands::Search(args) => search::run(args).await,
        Commands::Scene(args) => scene::run(args).await,
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_pick() {
        let cli = Cli::try_parse_from(["map-picker", "search", "Paris", "--pick", "2"]).unwrap();
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.query, "Paris");
                assert_eq!(args.pick, Some(2));
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_serve_session_ttl() {
        let cli = Cli::try_parse_from(["map-picker", "serve", "--session-ttl", "0"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.session_ttl, Some(0)),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_scene_click() {
        let cli = Cli::try_parse_from([
            "map-picker", "scene", "--lat", "1", "--lng", "2", "--editable", "--click", "10,20",
        ])
        .unwrap();
        match cli.command {
            Commands::Scene(args) => {
                assert!(args.editable);
                assert_eq!(args.click, Some(crate::coord::Coordinate::new(10.0, 20.0)));
            }
            _ => panic!("expected scene"),
        }
    }
}
