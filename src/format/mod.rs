//! Output formatters
//!
//! Provides trait-based output formatting for resolved addresses.

pub mod json;
pub mod text;
pub mod url;

use crate::config::Config;
use crate::error::Result;
use crate::geo::AddressInfo;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format a resolved address
    ///
    /// # Arguments
    /// * `address` - The address to format
    /// * `config` - Application config (for url providers, etc.)
    fn format(&self, address: &AddressInfo, config: &Config) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "url" => Some(Box::new(url::UrlFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    vec![
        FormatInfo {
            name: "json".to_string(),
            description: "Address as JSON".to_string(),
        },
        FormatInfo {
            name: "text".to_string(),
            description: "Human-readable address".to_string(),
        },
        FormatInfo {
            name: "url".to_string(),
            description: "Map URL for the address position".to_string(),
        },
    ]
}

#[cfg(test)]
pub(crate) fn sample_address() -> AddressInfo {
    AddressInfo {
        city: Some("Paris".to_string()),
        country: Some("France".to_string()),
        state: Some("Île-de-France".to_string()),
        postcode: Some("75004".to_string()),
        road: Some("Rue de Rivoli".to_string()),
        suburb: None,
        neighbourhood: None,
        latitude: 48.8566,
        longitude: 2.3522,
    }
}
