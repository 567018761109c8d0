//! Scene command handler
//!
//! Mounts a widget, optionally forwards a click, and prints the scene a
//! renderer would draw.

use crate::config::Config;
use crate::coord::Coordinate;
use crate::error::Result;
use crate::geo::locationiq::LocationIqBackend;
use crate::surface::HeadlessMap;
use crate::widget::{MapStyle, MapWidget, WidgetConfig};
use clap::Args;

/// Scene command arguments
#[derive(Args)]
pub struct SceneArgs {
    /// Latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Mount in editable mode
    #[arg(long)]
    pub editable: bool,

    /// Zoom level (defaults to map.zoom)
    #[arg(long, short = 'z')]
    pub zoom: Option<u8>,

    /// Click at LAT,LNG after mounting (requires a geocoder API key)
    #[arg(long, allow_hyphen_values = true)]
    pub click: Option<Coordinate>,
}

/// Run the scene command
pub async fn run(args: SceneArgs) -> Result<()> {
    let config = Config::load()?;

    let widget_config = WidgetConfig::new(args.editable, args.lat, args.lng)
        .with_zoom(args.zoom.unwrap_or(config.map.zoom));
    let (mut widget, _events) = MapWidget::mount(
        widget_config,
        MapStyle::from_config(&config),
        HeadlessMap::new(),
    )?;

    let address = match args.click {
        Some(at) => {
            let geocoder = LocationIqBackend::from_config(&config)?;
            let address = widget.click(&geocoder, at).await?;
            if address.is_none() {
                eprintln!("Click ignored: widget is read-only");
            }
            address
        }
        None => None,
    };

    let output = serde_json::json!({
        "coordinate": widget.coordinate(),
        "address": address,
        "scene": widget.scene(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
