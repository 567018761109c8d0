//! Centralized constants for the map-picker crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// External API endpoints
pub mod api {
    /// LocationIQ geocoding API (US region)
    pub const LOCATIONIQ_URL: &str = "https://us1.locationiq.com/v1";

    /// Environment variable consulted for the geocoder API key
    pub const API_KEY_ENV: &str = "LOCATIONIQ_API_KEY";

    /// User agent sent with geocoding requests
    pub const USER_AGENT: &str = concat!("map-picker/", env!("CARGO_PKG_VERSION"));

    /// Request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;
}

/// Map rendering defaults
pub mod map {
    /// Zoom level used when none is configured
    pub const DEFAULT_ZOOM: u8 = 12;

    /// OpenStreetMap raster tiles
    pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

    /// Attribution required by the OSM tile usage policy
    pub const TILE_ATTRIBUTION: &str =
        "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

    /// Marker icon asset
    pub const MARKER_ICON_URL: &str = "assets/img/marker.png";

    /// Marker icon size in pixels (width, height)
    pub const MARKER_ICON_SIZE: (u32, u32) = (50, 90);

    /// Pixel of the icon that sits on the coordinate
    pub const MARKER_ICON_ANCHOR: (i32, i32) = (22, 94);

    /// Popup offset relative to the icon anchor
    pub const MARKER_POPUP_ANCHOR: (i32, i32) = (2, -70);
}

/// Widget session housekeeping
pub mod server {
    /// Pending events kept per session; older ones are dropped first
    pub const MAX_PENDING_EVENTS: usize = 256;

    /// How often the server sweeps expired sessions
    pub const REAP_INTERVAL_SECS: u64 = 60;
}
