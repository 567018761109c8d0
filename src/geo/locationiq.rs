//! LocationIQ geocoding backend
//!
//! Speaks the Nominatim-compatible `reverse.php` / `search.php` endpoints.
//! API documentation: https://docs.locationiq.com/reference

use crate::config::Config;
use crate::constants::api::USER_AGENT;
use crate::coord::Coordinate;
use crate::error::{Error, LookupError, Result};
use crate::geo::{Address, Geocoder, LookupResult, PlaceSuggestion};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// LocationIQ geocoding backend
#[derive(Debug, Clone)]
pub struct LocationIqBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Reverse response: `address` on success, `error` when the service
/// could not place the coordinate
#[derive(Debug, Deserialize)]
struct ReverseBody {
    address: Option<Address>,
    error: Option<String>,
}

/// Search response item
#[derive(Debug, Deserialize)]
struct SearchEntry {
    display_name: String,
    lat: String,
    lon: String,
    #[serde(rename = "type", default)]
    place_type: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl LocationIqBackend {
    /// Create a backend for the given endpoint and key
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Create a backend from the `[geocoder]` config section
    ///
    /// Fails when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            Error::Config(
                "No geocoder API key configured; set geocoder.api_key or LOCATIONIQ_API_KEY"
                    .to_string(),
            )
        })?;

        Self::new(
            &config.geocoder.base_url,
            &api_key,
            Duration::from_secs(config.geocoder.timeout_secs),
        )
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn reverse_url(&self, at: Coordinate) -> String {
        format!(
            "{}/reverse.php?key={}&lat={}&lon={}&format=json",
            self.base_url,
            urlencoding::encode(&self.api_key),
            at.latitude,
            at.longitude
        )
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search.php?key={}&q={}&format=json",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(query)
        )
    }

    /// Parse lat/lon strings to f64
    fn parse_coords(lat: &str, lon: &str) -> LookupResult<(f64, f64)> {
        let lat: f64 = lat.parse().map_err(|_| {
            LookupError::MalformedResponse(format!("Invalid latitude: {}", lat))
        })?;
        let lon: f64 = lon.parse().map_err(|_| {
            LookupError::MalformedResponse(format!("Invalid longitude: {}", lon))
        })?;
        Ok((lat, lon))
    }

    /// Map a non-success response onto a lookup error, preferring the
    /// service's own message when it sent one
    fn error_for(status: StatusCode, body: &str) -> LookupError {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(err) => LookupError::Service(err.error),
            Err(_) => LookupError::Status(status.as_u16()),
        }
    }

    fn parse_reverse(body: &str) -> LookupResult<Address> {
        let parsed: ReverseBody = serde_json::from_str(body).map_err(|e| {
            LookupError::MalformedResponse(format!("Failed to parse reverse response: {}", e))
        })?;

        if let Some(message) = parsed.error {
            return Err(LookupError::Service(message));
        }

        parsed.address.ok_or_else(|| {
            LookupError::MalformedResponse("reverse response has no address".to_string())
        })
    }

    fn parse_search(body: &str) -> LookupResult<Vec<PlaceSuggestion>> {
        let entries: Vec<SearchEntry> = match serde_json::from_str(body) {
            Ok(entries) => entries,
            Err(e) => {
                if let Ok(err) = serde_json::from_str::<ErrorBody>(body) {
                    return Err(LookupError::Service(err.error));
                }
                return Err(LookupError::MalformedResponse(format!(
                    "Failed to parse search response: {}",
                    e
                )));
            }
        };

        entries
            .into_iter()
            .map(|entry| {
                let (latitude, longitude) = Self::parse_coords(&entry.lat, &entry.lon)?;
                Ok(PlaceSuggestion {
                    display_name: entry.display_name,
                    latitude,
                    longitude,
                    place_type: entry.place_type,
                })
            })
            .collect()
    }
}

impl Geocoder for LocationIqBackend {
    async fn reverse(&self, at: Coordinate) -> LookupResult<Address> {
        debug!(lat = at.latitude, lng = at.longitude, "reverse geocoding");

        let response = self.client.get(self.reverse_url(at)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::error_for(status, &body));
        }

        Self::parse_reverse(&body)
    }

    async fn search(&self, query: &str) -> LookupResult<Vec<PlaceSuggestion>> {
        debug!(query, "searching places");

        let response = self.client.get(self.search_url(query)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // LocationIQ answers 404 when nothing matches
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(Self::error_for(status, &body));
        }

        Self::parse_search(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_fake_locationiq;
    use approx::assert_relative_eq;

    fn backend_for(base_url: &str) -> LocationIqBackend {
        LocationIqBackend::new(base_url, "test key", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_parse_coords() {
        let (lat, lon) = LocationIqBackend::parse_coords("48.85", "2.35").unwrap();
        assert_relative_eq!(lat, 48.85);
        assert_relative_eq!(lon, 2.35);
    }

    #[test]
    fn test_parse_coords_invalid() {
        assert!(LocationIqBackend::parse_coords("invalid", "0").is_err());
        assert!(LocationIqBackend::parse_coords("0", "invalid").is_err());
    }

    #[test]
    fn test_urls() {
        let backend = backend_for("https://example.test/v1/");
        assert_eq!(
            backend.reverse_url(Coordinate::new(10.0, 20.5)),
            "https://example.test/v1/reverse.php?key=test%20key&lat=10&lon=20.5&format=json"
        );
        assert_eq!(
            backend.search_url("São Paulo & co"),
            "https://example.test/v1/search.php?key=test%20key&q=S%C3%A3o%20Paulo%20%26%20co&format=json"
        );
    }

    #[test]
    fn test_parse_reverse_missing_postcode() {
        let address =
            LocationIqBackend::parse_reverse(r#"{"address": {"city": "Lyon", "country": "France"}}"#)
                .unwrap();
        assert_eq!(address.city.as_deref(), Some("Lyon"));
        assert!(address.postcode.is_none());
    }

    #[test]
    fn test_parse_reverse_errors() {
        assert!(matches!(
            LocationIqBackend::parse_reverse(r#"{"display_name": "x"}"#),
            Err(LookupError::MalformedResponse(_))
        ));
        assert!(matches!(
            LocationIqBackend::parse_reverse(r#"{"error": "Unable to geocode"}"#),
            Err(LookupError::Service(msg)) if msg == "Unable to geocode"
        ));
        assert!(matches!(
            LocationIqBackend::parse_reverse("not json"),
            Err(LookupError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_search_keeps_service_order() {
        let places = LocationIqBackend::parse_search(
            r#"[{"display_name": "B", "lat": "1", "lon": "2", "type": "town"},
                {"display_name": "A", "lat": "3", "lon": "4"}]"#,
        )
        .unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].display_name, "B");
        assert_eq!(places[1].display_name, "A");
        assert_eq!(places[1].place_type, "");
    }

    #[test]
    fn test_from_config_requires_key() {
        let mut config = Config::default();
        if config.api_key().is_none() {
            assert!(LocationIqBackend::from_config(&config).is_err());
        }
        config.geocoder.api_key = "pk.abc".to_string();
        assert!(LocationIqBackend::from_config(&config).is_ok());
    }

    #[tokio::test]
    async fn test_reverse_over_http() {
        let fake = spawn_fake_locationiq().await;
        let backend = backend_for(&fake.base_url);

        let address = backend.reverse(Coordinate::new(48.85, 2.35)).await.unwrap();
        assert_eq!(address.city.as_deref(), Some("Paris"));
        assert_eq!(address.postcode.as_deref(), Some("75004"));

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0],
            "/reverse.php?key=test%20key&lat=48.85&lon=2.35&format=json"
        );
    }

    #[tokio::test]
    async fn test_reverse_service_error() {
        let fake = spawn_fake_locationiq().await;
        let backend = backend_for(&fake.base_url);

        let err = backend.reverse(Coordinate::new(0.0, 0.0)).await.unwrap_err();
        assert_eq!(err, LookupError::Service("Unable to geocode".to_string()));

        let err = backend.reverse(Coordinate::new(1.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, LookupError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_search_over_http() {
        let fake = spawn_fake_locationiq().await;
        let backend = backend_for(&fake.base_url);

        let places = backend.search("Paris").await.unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].display_name, "Paris, France");
        assert_relative_eq!(places[0].latitude, 48.85);
        assert_relative_eq!(places[1].longitude, -95.55);

        assert!(backend.search("nowhere").await.unwrap().is_empty());
        assert!(matches!(
            backend.search("broken").await,
            Err(LookupError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = backend_for(&format!("http://{}", addr));
        let err = backend.search("Paris").await.unwrap_err();
        assert!(matches!(err, LookupError::Network(_)));
    }
}
