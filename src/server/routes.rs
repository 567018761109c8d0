//! HTTP API routes
//!
//! Each widget session is addressed by id. Lookups take a ticket under the
//! session lock, run the HTTP call with the lock released, then apply the
//! result under the lock again, so overlapping requests resolve in favour
//! of the newest one.

use crate::coord::Coordinate;
use crate::error::Error;
use crate::geo::{AddressInfo, Geocoder, PlaceSuggestion};
use crate::server::state::{AppState, EventRecord, Session};
use crate::surface::{MapEvent, Scene};
use crate::widget::WidgetConfig;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/widgets", post(mount_handler))
        .route("/api/widgets/:id", get(widget_handler).delete(unmount_handler))
        .route("/api/widgets/:id/click", post(click_handler))
        .route("/api/widgets/:id/move", post(move_handler))
        .route("/api/widgets/:id/places", get(places_handler))
        .route("/api/widgets/:id/select", post(select_handler))
        .route("/api/widgets/:id/events", get(events_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    fn not_found(id: Uuid) -> Self {
        ApiError {
            error: format!("Widget not found: {}", id),
            code: "WIDGET_NOT_FOUND".to_string(),
            status: StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "INVALID_COORDINATES"),
            Error::Lookup(_) => (StatusCode::BAD_GATEWAY, "LOOKUP_FAILED"),
            Error::Surface(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SURFACE_ERROR"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
            status,
        }
    }
}

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<Mutex<Session>>, ApiError> {
    state.session(id).await.ok_or_else(|| ApiError::not_found(id))
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Geocoder endpoint
    pub geocoder: String,
    /// Mounted widgets
    pub widgets: usize,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        geocoder: state.geocoder.base_url().to_string(),
        widgets: state.session_count().await,
        uptime_secs: state.uptime_secs(),
    })
}

/// Snapshot of a widget session
#[derive(Debug, Serialize, Deserialize)]
pub struct WidgetView {
    pub id: Uuid,
    pub editable: bool,
    pub coordinate: Coordinate,
    pub address: Option<AddressInfo>,
    pub places: Vec<PlaceSuggestion>,
    pub scene: Scene,
}

impl WidgetView {
    fn of(id: Uuid, session: &Session) -> Self {
        let widget = &session.widget;
        WidgetView {
            id,
            editable: widget.is_editable(),
            coordinate: widget.coordinate(),
            address: widget.address().cloned(),
            places: widget.places().to_vec(),
            scene: widget.scene(),
        }
    }
}

/// Mount a widget
///
/// POST /api/widgets
async fn mount_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WidgetConfig>,
) -> Result<(StatusCode, Json<WidgetView>), ApiError> {
    let (id, session) = state.mount(req).await?;
    let session = session.lock().await;
    Ok((StatusCode::CREATED, Json(WidgetView::of(id, &session))))
}

/// Get a widget
///
/// GET /api/widgets/:id
async fn widget_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WidgetView>, ApiError> {
    let session = find_session(&state, id).await?;
    let session = session.lock().await;
    Ok(Json(WidgetView::of(id, &session)))
}

/// Unmount a widget
///
/// DELETE /api/widgets/:id
async fn unmount_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.unmount(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(id))
    }
}

/// Result of an operation that may reverse-geocode
///
/// `address` is None when the gesture was ignored or a newer request
/// superseded this one.
#[derive(Debug, Serialize, Deserialize)]
pub struct LookupResponse {
    pub coordinate: Coordinate,
    pub address: Option<AddressInfo>,
}

/// Forward a map click
///
/// POST /api/widgets/:id/click
async fn click_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(at): Json<Coordinate>,
) -> Result<Json<LookupResponse>, ApiError> {
    let session = find_session(&state, id).await?;

    let ticket = {
        let mut guard = session.lock().await;
        guard.widget.dispatch(MapEvent::Click { at })?
    };

    let address = match ticket {
        Some(ticket) => {
            let result = state.geocoder.reverse(ticket.at()).await;
            let mut guard = session.lock().await;
            let applied = guard.widget.complete_lookup(ticket, result);
            guard.collect_events();
            applied?
        }
        None => None,
    };

    let guard = session.lock().await;
    Ok(Json(LookupResponse {
        coordinate: guard.widget.coordinate(),
        address,
    }))
}

/// Forward a marker move
///
/// POST /api/widgets/:id/move
async fn move_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(at): Json<Coordinate>,
) -> Result<Json<LookupResponse>, ApiError> {
    let session = find_session(&state, id).await?;
    let mut guard = session.lock().await;
    guard.widget.dispatch(MapEvent::MarkerMove { at })?;

    Ok(Json(LookupResponse {
        coordinate: guard.widget.coordinate(),
        address: guard.widget.address().cloned(),
    }))
}

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Search results
///
/// `applied` is false when the query was blank or a newer search or
/// selection superseded this one; `places` is then the current list.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlacesResponse {
    pub applied: bool,
    pub places: Vec<PlaceSuggestion>,
}

/// Search places
///
/// GET /api/widgets/:id/places?q=
async fn places_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<SearchParams>,
) -> Result<Json<PlacesResponse>, ApiError> {
    let session = find_session(&state, id).await?;

    let ticket = {
        let mut guard = session.lock().await;
        let ticket = guard.widget.begin_search(params.q.as_deref());
        guard.collect_events();
        ticket
    };

    let Some(ticket) = ticket else {
        let guard = session.lock().await;
        return Ok(Json(PlacesResponse {
            applied: false,
            places: guard.widget.places().to_vec(),
        }));
    };

    let result = state.geocoder.search(ticket.query()).await;

    let mut guard = session.lock().await;
    let applied = guard.widget.complete_search(ticket, result).map(|p| p.is_some());
    guard.collect_events();
    let applied = applied?;

    Ok(Json(PlacesResponse {
        applied,
        places: guard.widget.places().to_vec(),
    }))
}

/// Select a suggestion
///
/// POST /api/widgets/:id/select
async fn select_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(place): Json<PlaceSuggestion>,
) -> Result<Json<LookupResponse>, ApiError> {
    let session = find_session(&state, id).await?;

    let ticket = {
        let mut guard = session.lock().await;
        guard.widget.begin_select(Some(&place))?
    };

    let address = match ticket {
        Some(ticket) => {
            let result = state.geocoder.reverse(ticket.at()).await;
            let mut guard = session.lock().await;
            let applied = guard.widget.complete_lookup(ticket, result);
            guard.collect_events();
            applied?
        }
        None => None,
    };

    let guard = session.lock().await;
    Ok(Json(LookupResponse {
        coordinate: guard.widget.coordinate(),
        address,
    }))
}

/// Events response
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<EventRecord>,
}

/// Drain pending widget events
///
/// GET /api/widgets/:id/events
async fn events_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventsResponse>, ApiError> {
    let session = find_session(&state, id).await?;
    let mut guard = session.lock().await;
    Ok(Json(EventsResponse {
        events: guard.take_events(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::geo::locationiq::LocationIqBackend;
    use crate::surface::MapEventKind;
    use crate::test_support::{spawn_fake_locationiq, FakeLocationIq};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn create_test_state() -> (Arc<AppState>, FakeLocationIq) {
        let fake = spawn_fake_locationiq().await;
        let geocoder = LocationIqBackend::new(&fake.base_url, "test", Duration::from_secs(5)).unwrap();
        (Arc::new(AppState::new(Config::default(), geocoder)), fake)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    async fn mount(app: &Router, editable: bool) -> WidgetView {
        let (status, body) = send(
            app,
            "POST",
            "/api/widgets",
            Some(serde_json::json!({ "editable": editable, "lat": 48.8566, "lng": 2.3522 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let (state, fake) = create_test_state().await;
        let app = create_router(state);

        let (status, body) = send(&app, "GET", "/api/status", None).await;
        assert_eq!(status, StatusCode::OK);

        let status: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert!(status.running);
        assert_eq!(status.geocoder, fake.base_url);
        assert_eq!(status.widgets, 0);
    }

    #[tokio::test]
    async fn test_mount_read_only() {
        let (state, _fake) = create_test_state().await;
        let app = create_router(state.clone());

        let view = mount(&app, false).await;

        assert!(!view.editable);
        assert_eq!(view.scene.zoom, Some(12));
        assert!(view.scene.listeners.is_empty());
        assert!(view.scene.marker.unwrap().popup.unwrap().contains("google.com/maps"));
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_mount_invalid_coordinates() {
        let (state, _fake) = create_test_state().await;
        let app = create_router(state);

        let (status, body) = send(
            &app,
            "POST",
            "/api/widgets",
            Some(serde_json::json!({ "editable": true, "lat": 91.0, "lng": 0.0 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.code, "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_click_resolves_address() {
        let (state, fake) = create_test_state().await;
        let app = create_router(state);
        let view = mount(&app, true).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/widgets/{}/click", view.id),
            Some(serde_json::json!({ "lat": 10.0, "lng": 20.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let resp: LookupResponse = serde_json::from_slice(&body).unwrap();
        let address = resp.address.unwrap();
        assert_eq!(address.city.as_deref(), Some("Testville"));
        assert!(address.postcode.is_none());
        assert_eq!((address.latitude, address.longitude), (10.0, 20.0));
        assert_eq!(fake.requests(), vec!["/reverse.php?key=test&lat=10&lon=20&format=json"]);

        let (_, body) = send(&app, "GET", &format!("/api/widgets/{}/events", view.id), None).await;
        let events: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(events["events"].as_array().unwrap().len(), 1);
        assert_eq!(events["events"][0]["type"], "address");
        assert_eq!(events["events"][0]["data"]["city"], "Testville");
    }

    #[tokio::test]
    async fn test_click_on_read_only_is_ignored() {
        let (state, fake) = create_test_state().await;
        let app = create_router(state);
        let view = mount(&app, false).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/widgets/{}/click", view.id),
            Some(serde_json::json!({ "lat": 10.0, "lng": 20.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let resp: LookupResponse = serde_json::from_slice(&body).unwrap();
        assert!(resp.address.is_none());
        assert_eq!(resp.coordinate, Coordinate::new(48.8566, 2.3522));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_maps_to_bad_gateway() {
        let (state, _fake) = create_test_state().await;
        let app = create_router(state);
        let view = mount(&app, true).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/widgets/{}/click", view.id),
            Some(serde_json::json!({ "lat": 0.0, "lng": 0.0 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let err: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.code, "LOOKUP_FAILED");

        let (_, body) = send(&app, "GET", &format!("/api/widgets/{}/events", view.id), None).await;
        let events: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(events["events"][0]["type"], "lookup_failed");
        assert_eq!(events["events"][0]["data"]["kind"], "service");
    }

    #[tokio::test]
    async fn test_move_updates_coordinate() {
        let (state, fake) = create_test_state().await;
        let app = create_router(state);
        let view = mount(&app, true).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/widgets/{}/move", view.id),
            Some(serde_json::json!({ "lat": 5.0, "lng": 6.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let resp: LookupResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.coordinate, Coordinate::new(5.0, 6.0));
        assert!(fake.requests().is_empty());

        let (_, body) = send(&app, "GET", &format!("/api/widgets/{}", view.id), None).await;
        let view: WidgetView = serde_json::from_slice(&body).unwrap();
        assert_eq!(view.coordinate, Coordinate::new(5.0, 6.0));
        assert_eq!(view.scene.marker.unwrap().position, view.coordinate);
    }

    #[tokio::test]
    async fn test_search_then_select() {
        let (state, fake) = create_test_state().await;
        let app = create_router(state);
        let view = mount(&app, true).await;

        let (status, body) =
            send(&app, "GET", &format!("/api/widgets/{}/places?q=Paris", view.id), None).await;
        assert_eq!(status, StatusCode::OK);

        let resp: PlacesResponse = serde_json::from_slice(&body).unwrap();
        assert!(resp.applied);
        assert_eq!(resp.places.len(), 2);
        assert_eq!(resp.places[0].display_name, "Paris, France");

        let place = serde_json::to_value(&resp.places[0]).unwrap();
        let (status, body) =
            send(&app, "POST", &format!("/api/widgets/{}/select", view.id), Some(place)).await;
        assert_eq!(status, StatusCode::OK);

        let resp: LookupResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.coordinate, Coordinate::new(48.85, 2.35));
        assert_eq!(resp.address.unwrap().city.as_deref(), Some("Paris"));

        let (_, body) = send(&app, "GET", &format!("/api/widgets/{}", view.id), None).await;
        let view: WidgetView = serde_json::from_slice(&body).unwrap();
        assert!(view.places.is_empty());
        assert_eq!(view.scene.center, Some(Coordinate::new(48.85, 2.35)));
        assert_eq!(view.scene.listeners, vec![MapEventKind::Click, MapEventKind::MarkerMove]);

        let (_, body) = send(&app, "GET", &format!("/api/widgets/{}/events", view.id), None).await;
        let events: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let events = events["events"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0]["data"]["city"].is_null());
        assert_eq!(events[1]["data"]["city"], "Paris");

        assert_eq!(fake.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_search_is_noop() {
        let (state, fake) = create_test_state().await;
        let app = create_router(state);
        let view = mount(&app, true).await;

        for uri in [
            format!("/api/widgets/{}/places", view.id),
            format!("/api/widgets/{}/places?q=", view.id),
        ] {
            let (status, body) = send(&app, "GET", &uri, None).await;
            assert_eq!(status, StatusCode::OK);
            let resp: PlacesResponse = serde_json::from_slice(&body).unwrap();
            assert!(!resp.applied);
            assert!(resp.places.is_empty());
        }

        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unmount() {
        let (state, _fake) = create_test_state().await;
        let app = create_router(state.clone());
        let view = mount(&app, true).await;

        let (status, _) = send(&app, "DELETE", &format!("/api/widgets/{}", view.id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.session_count().await, 0);

        let (status, body) = send(&app, "GET", &format!("/api/widgets/{}", view.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let err: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.code, "WIDGET_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_expired_widget_is_not_found() {
        let (state, _fake) = create_test_state().await;
        let app = create_router(state.clone());
        let view = mount(&app, true).await;

        let ttl = state.config.server.session_ttl_secs as i64;
        state.backdate(view.id, ttl + 1).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/widgets/{}/move", view.id),
            Some(serde_json::json!({ "lat": 5.0, "lng": 6.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let err: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.code, "WIDGET_NOT_FOUND");
        assert_eq!(state.session_count().await, 0);
    }
}
