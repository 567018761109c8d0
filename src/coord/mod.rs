//! Geographic coordinates

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl Coordinate {
    /// Create new coordinates
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create coordinates and validate them in one step
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self::new(latitude, longitude);
        coord.validate()?;
        Ok(coord)
    }

    /// Validate that coordinates are finite and within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(Error::InvalidCoordinates(format!(
                "({}, {}) is not a finite position",
                self.latitude, self.longitude
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = Error;

    /// Parse "LAT,LNG"
    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s.split_once(',').ok_or_else(|| {
            Error::InvalidCoordinates(format!("Expected LAT,LNG but got '{}'", s))
        })?;
        let lat: f64 = lat.trim().parse().map_err(|_| {
            Error::InvalidCoordinates(format!("Invalid latitude: {}", lat))
        })?;
        let lng: f64 = lng.trim().parse().map_err(|_| {
            Error::InvalidCoordinates(format!("Invalid longitude: {}", lng))
        })?;
        Self::checked(lat, lng)
    }
}
