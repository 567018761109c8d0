//! In-process fake of the LocationIQ API for tests

use axum::{
    extract::{Query, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Handle to a running fake geocoder
pub struct FakeLocationIq {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeLocationIq {
    /// Raw request lines ("/reverse.php?..."), oldest first
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

type Recorded = Arc<Mutex<Vec<String>>>;

/// Start the fake on an ephemeral port
///
/// Canned behaviour, keyed by query parameters:
/// - reverse `lat=0`: 404 with a LocationIQ error body
/// - reverse `lat=1`: 200 without an `address` object
/// - reverse `lat=10`: address without postcode
/// - reverse otherwise: full Paris address
/// - search `q=Paris`: two results
/// - search `q=nowhere`: 404 with an error body
/// - search `q=broken`: 200 with a non-JSON body
/// - search otherwise: empty array
pub async fn spawn_fake_locationiq() -> FakeLocationIq {
    let requests: Recorded = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .route("/reverse.php", get(reverse))
        .route("/search.php", get(search))
        .with_state(requests.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeLocationIq {
        base_url: format!("http://{}", addr),
        requests,
    }
}

async fn reverse(
    State(requests): State<Recorded>,
    RawQuery(raw): RawQuery,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    requests
        .lock()
        .unwrap()
        .push(format!("/reverse.php?{}", raw.unwrap_or_default()));

    match params.get("lat").map(String::as_str) {
        Some("0") => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Unable to geocode" })),
        )
            .into_response(),
        Some("1") => Json(json!({ "display_name": "Somewhere" })).into_response(),
        Some("10") => Json(json!({
            "display_name": "Testville",
            "address": { "city": "Testville", "country": "Testland" }
        }))
        .into_response(),
        _ => Json(json!({
            "display_name": "Rue de Rivoli, Paris",
            "address": {
                "road": "Rue de Rivoli",
                "neighbourhood": "Saint-Merri",
                "suburb": "4e Arrondissement",
                "city": "Paris",
                "state": "Île-de-France",
                "postcode": "75004",
                "country": "France",
                "country_code": "fr"
            }
        }))
        .into_response(),
    }
}

async fn search(
    State(requests): State<Recorded>,
    RawQuery(raw): RawQuery,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    requests
        .lock()
        .unwrap()
        .push(format!("/search.php?{}", raw.unwrap_or_default()));

    match params.get("q").map(String::as_str) {
        Some("Paris") => Json(json!([
            { "display_name": "Paris, France", "lat": "48.85", "lon": "2.35", "type": "city" },
            { "display_name": "Paris, Texas", "lat": "33.66", "lon": "-95.55", "type": "town" }
        ]))
        .into_response(),
        Some("nowhere") => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Unable to geocode" })),
        )
            .into_response(),
        Some("broken") => "<html>oops</html>".into_response(),
        _ => Json(json!([])).into_response(),
    }
}
