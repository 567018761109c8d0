//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "geocoder.api_key")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        (None, None) => {
            print!("{}", render_config(&config));
        }

        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Render all configuration values, masking the API key
fn render_config(config: &Config) -> String {
    let mut out = String::new();

    out.push_str("[geocoder]\n");
    out.push_str(&format!("base_url = \"{}\"\n", config.geocoder.base_url));
    if config.geocoder.api_key.is_empty() {
        out.push_str("api_key = \"\" # not configured\n");
    } else {
        out.push_str("api_key = \"***\" # configured\n");
    }
    out.push_str(&format!("timeout_secs = {}\n\n", config.geocoder.timeout_secs));

    out.push_str("[map]\n");
    out.push_str(&format!("zoom = {}\n", config.map.zoom));
    out.push_str(&format!("default_lat = {}\n", config.map.default_lat));
    out.push_str(&format!("default_lng = {}\n", config.map.default_lng));
    out.push_str(&format!("tile_url = \"{}\"\n\n", config.map.tile_url));

    out.push_str("[server]\n");
    out.push_str(&format!("host = \"{}\"\n", config.server.host));
    out.push_str(&format!("port = {}\n", config.server.port));
    out.push_str(&format!(
        "session_ttl_secs = {}\n\n",
        config.server.session_ttl_secs
    ));

    out.push_str("[url]\n");
    out.push_str(&format!("default = \"{}\"\n\n", config.url.default));

    out.push_str("[url.providers]\n");
    let mut providers: Vec<_> = config.url.providers.iter().collect();
    providers.sort();
    for (name, template) in providers {
        out.push_str(&format!("{} = \"{}\"\n", name, template));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_masks_api_key() {
        let mut config = Config::default();
        config.geocoder.api_key = "pk.secret".to_string();

        let out = render_config(&config);
        assert!(out.contains("api_key = \"***\""));
        assert!(!out.contains("pk.secret"));
    }

    #[test]
    fn test_render_sorted_providers() {
        let out = render_config(&Config::default());
        let apple = out.find("apple =").unwrap();
        let google = out.find("google =").unwrap();
        assert!(apple < google);
    }
}
