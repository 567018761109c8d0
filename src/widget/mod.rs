//! Map picker widget
//!
//! `MapWidget` owns a map surface with a single marker and mediates
//! between map gestures and geocoding lookups:
//!
//! - read-only widgets show a fixed marker with a popup linking to an
//!   external map viewer
//! - editable widgets move the marker on click and reverse-geocode the new
//!   position; marker drags move the held coordinate without a lookup
//! - forward search fills a suggestion list; selecting a suggestion moves
//!   the map there and resolves its address
//!
//! Addresses and lookup failures are sent to the consumer over an
//! unbounded channel of `WidgetEvent`s.
//!
//! Every lookup takes a ticket from a monotonic sequencer. Hosts that
//! share a widget between tasks can take a ticket under their lock, run
//! the HTTP call unlocked, and hand the result back with
//! `complete_lookup`/`complete_search`; results of superseded tickets are
//! dropped.

pub mod state;

use crate::config::Config;
use crate::constants::map::DEFAULT_ZOOM;
use crate::coord::Coordinate;
use crate::error::{LookupError, Result};
use crate::geo::{Address, AddressInfo, Geocoder, LookupResult, PlaceSuggestion};
use crate::surface::{
    ListenerId, MapEvent, MapEventKind, MapSurface, MarkerIcon, MarkerId, MarkerSpec, Scene,
    TileLayer,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

pub use state::{LookupTicket, SearchTicket, Sequencer, WidgetState};

/// Mount-time settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Whether the user may relocate the marker; fixed for the widget's life
    #[serde(default)]
    pub editable: bool,
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
    /// Zoom level; unset or 0 falls back to 12
    #[serde(default)]
    pub zoom: Option<u8>,
}

impl WidgetConfig {
    pub fn new(editable: bool, latitude: f64, longitude: f64) -> Self {
        Self {
            editable,
            latitude,
            longitude,
            zoom: None,
        }
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Zoom after applying the default
    pub fn resolved_zoom(&self) -> u8 {
        match self.zoom {
            Some(zoom) if zoom > 0 => zoom,
            _ => DEFAULT_ZOOM,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Presentation of the widget: tiles, marker icon and popup link
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    pub tile_layer: TileLayer,
    pub icon: MarkerIcon,
    /// External viewer URL with `{lat}`/`{lng}` placeholders
    pub link_template: String,
    pub link_label: String,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            tile_layer: TileLayer::default(),
            icon: MarkerIcon::default(),
            link_template: "https://www.google.com/maps/?q={lat},{lng}".to_string(),
            link_label: "Google Maps".to_string(),
        }
    }
}

impl MapStyle {
    /// Build from the `[map]` and `[url]` config sections
    pub fn from_config(config: &Config) -> Self {
        let provider = config.url.default.as_str();
        let defaults = Self::default();
        let link_template = config
            .url
            .providers
            .get(provider)
            .cloned()
            .unwrap_or(defaults.link_template);
        let link_label = match provider {
            "google" => "Google Maps".to_string(),
            "openstreetmap" => "OpenStreetMap".to_string(),
            "apple" => "Apple Maps".to_string(),
            other => other.to_string(),
        };

        Self {
            tile_layer: TileLayer {
                url_template: config.map.tile_url.clone(),
                attribution: config.map.attribution.clone(),
            },
            icon: defaults.icon,
            link_template,
            link_label,
        }
    }

    /// Popup html linking to the external viewer
    pub fn popup_html(&self, at: Coordinate) -> String {
        let url = self
            .link_template
            .replace("{lat}", &at.latitude.to_string())
            .replace("{lng}", &at.longitude.to_string());
        format!(r#"<a href="{}" target="_blank">{}</a>"#, url, self.link_label)
    }
}

/// Output sent to the widget's consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WidgetEvent {
    /// A resolved address, or the empty reset value when a search starts
    Address(AddressInfo),
    /// A geocoding round-trip failed; widget state is unchanged
    LookupFailed(LookupError),
}

/// Map picker widget
pub struct MapWidget<S: MapSurface> {
    config: WidgetConfig,
    style: MapStyle,
    surface: S,
    marker: Option<MarkerId>,
    bindings: Vec<(ListenerId, MapEventKind)>,
    state: WidgetState,
    events: UnboundedSender<WidgetEvent>,
}

impl<S: MapSurface> MapWidget<S> {
    /// Mount a widget on a surface
    ///
    /// Returns the widget and the receiving end of its event channel.
    pub fn mount(
        config: WidgetConfig,
        style: MapStyle,
        surface: S,
    ) -> Result<(Self, UnboundedReceiver<WidgetEvent>)> {
        let coordinate = config.coordinate();
        coordinate.validate()?;

        let (events, receiver) = unbounded_channel();
        let mut widget = Self {
            config,
            style,
            surface,
            marker: None,
            bindings: Vec::new(),
            state: WidgetState::new(coordinate),
            events,
        };
        widget.rebuild()?;

        info!(
            editable = config.editable,
            lat = coordinate.latitude,
            lng = coordinate.longitude,
            zoom = config.resolved_zoom(),
            "mounted map widget"
        );

        Ok((widget, receiver))
    }

    /// Tear down the current map generation and build a fresh one at the
    /// held coordinate
    ///
    /// A failure part way through leaves the surface torn down.
    pub fn rebuild(&mut self) -> Result<()> {
        self.teardown();
        if let Err(e) = self.build() {
            warn!(error = %e, "map build failed, tearing down partial map");
            self.teardown();
            return Err(e);
        }
        Ok(())
    }

    /// Release every listener and the map itself
    pub fn teardown(&mut self) {
        self.surface.off();
        self.surface.remove();
        self.marker = None;
        self.bindings.clear();
    }

    fn build(&mut self) -> Result<()> {
        let at = self.state.coordinate;

        self.surface.set_view(at, self.config.resolved_zoom())?;
        self.surface.add_tile_layer(self.style.tile_layer.clone())?;

        let marker = self.surface.add_marker(MarkerSpec {
            position: at,
            icon: self.style.icon.clone(),
            draggable: self.config.editable,
        })?;
        self.marker = Some(marker);

        if self.config.editable {
            for kind in [MapEventKind::Click, MapEventKind::MarkerMove] {
                let id = self.surface.subscribe(kind)?;
                self.bindings.push((id, kind));
            }
        } else {
            self.surface.bind_popup(marker, self.style.popup_html(at))?;
        }

        Ok(())
    }

    fn is_bound(&self, kind: MapEventKind) -> bool {
        self.bindings.iter().any(|(_, k)| *k == kind)
    }

    fn emit(&self, event: WidgetEvent) {
        // The consumer may have gone away; the widget keeps working
        let _ = self.events.send(event);
    }

    /// Deliver a gesture from the renderer
    ///
    /// Gestures without a listener in the current generation are ignored.
    /// A click returns the ticket of the reverse lookup it triggers.
    pub fn dispatch(&mut self, event: MapEvent) -> Result<Option<LookupTicket>> {
        if !self.is_bound(event.kind()) {
            debug!(kind = ?event.kind(), "ignoring unbound map event");
            return Ok(None);
        }

        let at = event.coordinate();
        at.validate()?;

        // The marker always sits at the held coordinate
        if let Some(marker) = self.marker {
            self.surface.set_marker_position(marker, at)?;
        }
        self.state.coordinate = at;

        match event {
            MapEvent::Click { .. } => Ok(Some(self.begin_lookup())),
            MapEvent::MarkerMove { .. } => Ok(None),
        }
    }

    /// Start a reverse lookup for the held coordinate
    pub fn begin_lookup(&mut self) -> LookupTicket {
        self.state.issue_lookup()
    }

    /// Apply the result of a reverse lookup
    ///
    /// Returns `Ok(None)` when the ticket was superseded. Failures are
    /// emitted to the consumer and returned.
    pub fn complete_lookup(
        &mut self,
        ticket: LookupTicket,
        result: LookupResult<Address>,
    ) -> Result<Option<AddressInfo>> {
        if !self.state.lookup_is_current(&ticket) {
            debug!(lat = ticket.at().latitude, lng = ticket.at().longitude, "dropping stale lookup");
            return Ok(None);
        }

        match result {
            Ok(address) => {
                let info = AddressInfo::new(address, ticket.at());
                self.state.address = Some(info.clone());
                self.emit(WidgetEvent::Address(info.clone()));
                Ok(Some(info))
            }
            Err(e) => {
                warn!(error = %e, "reverse lookup failed");
                self.emit(WidgetEvent::LookupFailed(e.clone()));
                Err(e.into())
            }
        }
    }

    /// Reverse-geocode the held coordinate and emit the address
    pub async fn resolve_address<G: Geocoder>(
        &mut self,
        geocoder: &G,
    ) -> Result<Option<AddressInfo>> {
        let ticket = self.begin_lookup();
        let result = geocoder.reverse(ticket.at()).await;
        self.complete_lookup(ticket, result)
    }

    /// Simulate or forward a map click and resolve the clicked position
    pub async fn click<G: Geocoder>(
        &mut self,
        geocoder: &G,
        at: Coordinate,
    ) -> Result<Option<AddressInfo>> {
        match self.dispatch(MapEvent::Click { at })? {
            Some(ticket) => {
                let result = geocoder.reverse(ticket.at()).await;
                self.complete_lookup(ticket, result)
            }
            None => Ok(None),
        }
    }

    /// Start a forward search
    ///
    /// Absent or blank queries are a no-op and return `None`. Otherwise the
    /// suggestions are cleared, the empty address is emitted and pending
    /// lookups are superseded.
    pub fn begin_search(&mut self, query: Option<&str>) -> Option<SearchTicket> {
        let query = query.map(str::trim).filter(|q| !q.is_empty())?;

        self.state.places.clear();
        self.state.address = None;
        self.state.cancel_lookups();
        self.emit(WidgetEvent::Address(AddressInfo::default()));

        Some(self.state.issue_search(query))
    }

    /// Apply the result of a forward search
    ///
    /// Returns `Ok(None)` when the ticket was superseded.
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        result: LookupResult<Vec<PlaceSuggestion>>,
    ) -> Result<Option<&[PlaceSuggestion]>> {
        if !self.state.search_is_current(&ticket) {
            debug!(query = ticket.query(), "dropping stale search");
            return Ok(None);
        }

        match result {
            Ok(places) => {
                debug!(query = ticket.query(), count = places.len(), "search results");
                self.state.places = places;
                Ok(Some(self.state.places.as_slice()))
            }
            Err(e) => {
                warn!(error = %e, query = ticket.query(), "place search failed");
                self.emit(WidgetEvent::LookupFailed(e.clone()));
                Err(e.into())
            }
        }
    }

    /// Search places and replace the suggestion list
    pub async fn search_places<G: Geocoder>(
        &mut self,
        geocoder: &G,
        query: Option<&str>,
    ) -> Result<Option<&[PlaceSuggestion]>> {
        let Some(ticket) = self.begin_search(query) else {
            return Ok(None);
        };
        let result = geocoder.search(ticket.query()).await;
        self.complete_search(ticket, result)
    }

    /// Move the widget to a suggestion
    ///
    /// Rebuilds the map at the place, clears the suggestions and returns
    /// the ticket of the reverse lookup to run. `None` place is a no-op.
    pub fn begin_select(&mut self, place: Option<&PlaceSuggestion>) -> Result<Option<LookupTicket>> {
        let Some(place) = place else {
            return Ok(None);
        };
        let at = place.coordinate();
        at.validate()?;

        self.state.coordinate = at;
        self.state.cancel_searches();
        self.state.places.clear();
        self.rebuild()?;

        Ok(Some(self.begin_lookup()))
    }

    /// Select a suggestion and resolve its address
    pub async fn select_place<G: Geocoder>(
        &mut self,
        geocoder: &G,
        place: Option<&PlaceSuggestion>,
    ) -> Result<Option<AddressInfo>> {
        match self.begin_select(place)? {
            Some(ticket) => {
                let result = geocoder.reverse(ticket.at()).await;
                self.complete_lookup(ticket, result)
            }
            None => Ok(None),
        }
    }

    /// Current suggestions, in service order
    pub fn places(&self) -> &[PlaceSuggestion] {
        &self.state.places
    }

    /// Held marker coordinate
    pub fn coordinate(&self) -> Coordinate {
        self.state.coordinate
    }

    /// Last address emitted, if the selection has not been cleared since
    pub fn address(&self) -> Option<&AddressInfo> {
        self.state.address.as_ref()
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn is_editable(&self) -> bool {
        self.config.editable
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn scene(&self) -> Scene {
        self.surface.scene()
    }
}

impl<S: MapSurface> Drop for MapWidget<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
