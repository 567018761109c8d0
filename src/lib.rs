//! map-picker: Map Picker Widget
//!
//! A library and CLI tool for picking a location on a map: place or drag a
//! marker, reverse-geocode it into an address, and search places by name.
//!
//! ## Features
//!
//! - `MapWidget` controller with read-only and editable modes
//! - Pluggable map surfaces (`MapSurface`), with an in-memory `HeadlessMap`
//! - LocationIQ geocoding backend (reverse + forward search)
//! - Request sequencing so late responses never overwrite newer ones
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use map_picker::geo::locationiq::LocationIqBackend;
//! use map_picker::surface::HeadlessMap;
//! use map_picker::widget::{MapStyle, MapWidget, WidgetConfig};
//! use map_picker::Coordinate;
//! use std::time::Duration;
//!
//! # async fn demo() -> map_picker::Result<()> {
//! let geocoder = LocationIqBackend::new(
//!     "https://us1.locationiq.com/v1",
//!     "pk.your-key",
//!     Duration::from_secs(10),
//! )?;
//!
//! let (mut widget, mut events) = MapWidget::mount(
//!     WidgetConfig::new(true, 48.8566, 2.3522),
//!     MapStyle::default(),
//!     HeadlessMap::new(),
//! )?;
//!
//! // A click moves the marker and resolves the new position
//! let address = widget.click(&geocoder, Coordinate::new(48.86, 2.34)).await?;
//! println!("Picked: {:?}", address);
//!
//! // The same address also arrives on the event channel
//! while let Ok(event) = events.try_recv() {
//!     println!("{:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod geo;
pub mod server;
pub mod surface;
pub mod widget;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinate;
pub use error::{Error, LookupError, Result};
pub use geo::{AddressInfo, Geocoder, PlaceSuggestion};
pub use widget::{MapStyle, MapWidget, WidgetConfig, WidgetEvent};
