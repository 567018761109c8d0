//! Reverse command handler
//!
//! Resolves the address of a coordinate through a read-only widget.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::geo::locationiq::LocationIqBackend;
use crate::surface::HeadlessMap;
use crate::widget::{MapStyle, MapWidget, WidgetConfig};
use clap::Args;

/// Reverse command arguments
#[derive(Args)]
pub struct ReverseArgs {
    /// Latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Output format (json, text, url)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,
}

/// Run the reverse command
pub async fn run(args: ReverseArgs) -> Result<()> {
    let config = Config::load()?;

    let formatter = get_formatter(&args.format).ok_or_else(|| {
        let names: Vec<String> = available_formats().into_iter().map(|f| f.name).collect();
        Error::Config(format!(
            "Unknown format: {} (available: {})",
            args.format,
            names.join(", ")
        ))
    })?;

    let geocoder = LocationIqBackend::from_config(&config)?;
    let (mut widget, _events) = MapWidget::mount(
        WidgetConfig::new(false, args.lat, args.lng).with_zoom(config.map.zoom),
        MapStyle::from_config(&config),
        HeadlessMap::new(),
    )?;

    if let Some(address) = widget.resolve_address(&geocoder).await? {
        print!("{}", ensure_newline(formatter.format(&address, &config)?));
    }

    Ok(())
}

pub(crate) fn ensure_newline(mut output: String) -> String {
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}
