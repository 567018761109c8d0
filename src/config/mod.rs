//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/map-picker/config.toml

pub mod defaults;

use crate::constants::{api, map};
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Geocoding service settings
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// Map rendering settings
    #[serde(default)]
    pub map: MapConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Popup link settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Geocoding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Base URL of the LocationIQ-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (overridden by LOCATIONIQ_API_KEY when set)
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Map rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Zoom level for widgets mounted without one
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Latitude used when no location is given
    #[serde(default = "default_lat")]
    pub default_lat: f64,

    /// Longitude used when no location is given
    #[serde(default = "default_lng")]
    pub default_lng: f64,

    /// Tile layer URL template
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    /// Tile layer attribution html
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds an untouched widget session lives before it is reaped (0 = never)
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

/// Popup link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

// Default value functions for serde
fn default_base_url() -> String {
    api::LOCATIONIQ_URL.to_string()
}
fn default_timeout() -> u64 {
    api::REQUEST_TIMEOUT_SECS
}
fn default_zoom() -> u8 {
    map::DEFAULT_ZOOM
}
fn default_lat() -> f64 {
    DEFAULT_LAT
}
fn default_lng() -> f64 {
    DEFAULT_LNG
}
fn default_tile_url() -> String {
    map::TILE_URL.to_string()
}
fn default_attribution() -> String {
    map::TILE_ATTRIBUTION.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_session_ttl() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/?q={lat},{lng}".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lng}#map=18/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}".to_string(),
    );
    providers
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            default_lat: default_lat(),
            default_lng: default_lng(),
            tile_url: default_tile_url(),
            attribution: default_attribution(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoder", "base_url"] => Some(self.geocoder.base_url.clone()),
            ["geocoder", "api_key"] => Some(self.geocoder.api_key.clone()),
            ["geocoder", "timeout_secs"] => Some(self.geocoder.timeout_secs.to_string()),

            ["map", "zoom"] => Some(self.map.zoom.to_string()),
            ["map", "default_lat"] => Some(self.map.default_lat.to_string()),
            ["map", "default_lng"] => Some(self.map.default_lng.to_string()),
            ["map", "tile_url"] => Some(self.map.tile_url.clone()),
            ["map", "attribution"] => Some(self.map.attribution.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "session_ttl_secs"] => Some(self.server.session_ttl_secs.to_string()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoder", "base_url"] => {
                self.geocoder.base_url = value.trim_end_matches('/').to_string();
            }
            ["geocoder", "api_key"] => {
                self.geocoder.api_key = value.to_string();
            }
            ["geocoder", "timeout_secs"] => {
                self.geocoder.timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }

            ["map", "zoom"] => {
                self.map.zoom = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid zoom value: {}", value))
                })?;
            }
            ["map", "default_lat"] => {
                self.map.default_lat = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid latitude value: {}", value))
                })?;
            }
            ["map", "default_lng"] => {
                self.map.default_lng = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid longitude value: {}", value))
                })?;
            }
            ["map", "tile_url"] => {
                self.map.tile_url = value.to_string();
            }
            ["map", "attribution"] => {
                self.map.attribution = value.to_string();
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }
            ["server", "session_ttl_secs"] => {
                self.server.session_ttl_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid session TTL value: {}", value))
                })?;
            }

            ["url", "default"] => {
                if !self.url.providers.contains_key(value) {
                    return Err(Error::Config(format!("Unknown URL provider: {}", value)));
                }
                self.url.default = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "geocoder.base_url",
            "geocoder.api_key",
            "geocoder.timeout_secs",
            "map.zoom",
            "map.default_lat",
            "map.default_lng",
            "map.tile_url",
            "map.attribution",
            "server.host",
            "server.port",
            "server.session_ttl_secs",
            "url.default",
        ]
    }

    /// Resolve the geocoder API key
    ///
    /// The environment variable wins over the config file. Returns None when
    /// neither is set.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(api::API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| Some(self.geocoder.api_key.clone()).filter(|k| !k.is_empty()))
    }

    /// Format a URL using the specified provider
    ///
    /// Replaces {lat} and {lng} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, lat: f64, lng: f64) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self.url.providers.get(provider_name).ok_or_else(|| {
            Error::Config(format!("Unknown URL provider: {}", provider_name))
        })?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
