//! Error types for map-picker

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for map-picker operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Map surface error: {0}")]
    Surface(String),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),
}

/// Failure of a geocoding round-trip
///
/// Cloneable so the same value can be returned to the caller and sent to
/// the widget's consumer channel.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum LookupError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("geocoder returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("geocoder error: {0}")]
    Service(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout
        } else if err.is_decode() {
            LookupError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            LookupError::Status(status.as_u16())
        } else {
            LookupError::Network(err.to_string())
        }
    }
}

/// Result type alias for map-picker operations
pub type Result<T> = std::result::Result<T, Error>;
