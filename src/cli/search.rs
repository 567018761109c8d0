//! Search command handler
//!
//! Searches places from an editable widget and optionally selects one.

use crate::cli::reverse::ensure_newline;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::get_formatter;
use crate::geo::locationiq::LocationIqBackend;
use crate::geo::PlaceSuggestion;
use crate::surface::HeadlessMap;
use crate::widget::{MapStyle, MapWidget, WidgetConfig};
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Place name to search for
    pub query: String,

    /// Select the Nth suggestion (1-based) and resolve its address
    #[arg(long, short = 'p')]
    pub pick: Option<usize>,

    /// Output format for the picked address (json, text, url)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(&args.format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", args.format)))?;

    let geocoder = LocationIqBackend::from_config(&config)?;
    let (mut widget, _events) = MapWidget::mount(
        WidgetConfig::new(true, config.map.default_lat, config.map.default_lng)
            .with_zoom(config.map.zoom),
        MapStyle::from_config(&config),
        HeadlessMap::new(),
    )?;

    let places = widget
        .search_places(&geocoder, Some(&args.query))
        .await?
        .map(<[PlaceSuggestion]>::to_vec)
        .unwrap_or_default();

    if places.is_empty() {
        eprintln!("No places found for '{}'", args.query);
        return Ok(());
    }

    let Some(pick) = args.pick else {
        print!("{}", list_places(&places));
        return Ok(());
    };

    let place = pick
        .checked_sub(1)
        .and_then(|i| places.get(i))
        .ok_or_else(|| {
            Error::Config(format!(
                "--pick must be between 1 and {} (got {})",
                places.len(),
                pick
            ))
        })?;

    eprintln!("Selected: {}", place.display_name);
    if let Some(address) = widget.select_place(&geocoder, Some(place)).await? {
        print!("{}", ensure_newline(formatter.format(&address, &config)?));
    }

    Ok(())
}

/// Numbered suggestion list
fn list_places(places: &[PlaceSuggestion]) -> String {
    places
        .iter()
        .enumerate()
        .map(|(i, place)| {
            let kind = if place.place_type.is_empty() {
                String::new()
            } else {
                format!(" ({})", place.place_type)
            };
            format!(
                "{:>3}. {}{} [{:.5}, {:.5}]\n",
                i + 1,
                place.display_name,
                kind,
                place.latitude,
                place.longitude
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_places() {
        let places = vec![
            PlaceSuggestion {
                display_name: "Paris, France".to_string(),
                latitude: 48.85,
                longitude: 2.35,
                place_type: "city".to_string(),
            },
            PlaceSuggestion {
                display_name: "Paris, Texas".to_string(),
                latitude: 33.66,
                longitude: -95.55,
                place_type: String::new(),
            },
        ];

        assert_eq!(
            list_places(&places),
            "  1. Paris, France (city) [48.85000, 2.35000]\n  2. Paris, Texas [33.66000, -95.55000]\n"
        );
    }
}
