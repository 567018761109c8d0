//! Geocoding module
//!
//! Value types exchanged with the geocoding service and the `Geocoder`
//! trait implemented by each backend.

pub mod locationiq;

use crate::coord::Coordinate;
use crate::error::LookupError;
use serde::{Deserialize, Serialize};

/// Result type for geocoding round-trips
pub type LookupResult<T> = std::result::Result<T, LookupError>;

/// The `address` object of a reverse-geocode response
///
/// Every field is optional: rural or maritime positions routinely lack a
/// road or a postcode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub road: Option<String>,
    pub suburb: Option<String>,
    pub neighbourhood: Option<String>,
}

/// Structured address emitted to the widget's consumer
///
/// `latitude`/`longitude` are the coordinate the lookup was issued for,
/// not whatever the service snapped to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub city: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub road: Option<String>,
    pub suburb: Option<String>,
    pub neighbourhood: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl AddressInfo {
    /// Build from a reverse-geocoded address and the coordinate it was
    /// requested for
    pub fn new(address: Address, at: Coordinate) -> Self {
        Self {
            city: address.city,
            country: address.country,
            state: address.state,
            postcode: address.postcode,
            road: address.road,
            suburb: address.suburb,
            neighbourhood: address.neighbourhood,
            latitude: at.latitude,
            longitude: at.longitude,
        }
    }

    /// True for the reset value emitted when a search clears the selection
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.country.is_none()
            && self.state.is_none()
            && self.postcode.is_none()
            && self.road.is_none()
            && self.suburb.is_none()
            && self.neighbourhood.is_none()
    }

    /// The coordinate this address describes
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Non-empty parts from most to least specific, for one-line display
    pub fn parts(&self) -> Vec<&str> {
        [
            &self.road,
            &self.neighbourhood,
            &self.suburb,
            &self.city,
            &self.postcode,
            &self.state,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect()
    }
}

/// A forward-search candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type", default)]
    pub place_type: String,
}

impl PlaceSuggestion {
    /// The coordinate of this place
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Trait for geocoding backends
pub trait Geocoder: Send + Sync {
    /// Reverse geocode a coordinate into its address fields
    fn reverse(
        &self,
        at: Coordinate,
    ) -> impl std::future::Future<Output = LookupResult<Address>> + Send;

    /// Search places by free text, in the order the service ranks them
    fn search(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = LookupResult<Vec<PlaceSuggestion>>> + Send;
}
