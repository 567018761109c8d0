//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default latitude for widgets mounted without a location (Mexico City)
pub const DEFAULT_LAT: f64 = 19.4326;

/// Default longitude for widgets mounted without a location
pub const DEFAULT_LNG: f64 = -99.1332;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7879;

/// Default lifetime of an idle widget session in seconds
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;

/// Default link provider for read-only popups
pub const DEFAULT_URL_PROVIDER: &str = "google";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "map-picker";
