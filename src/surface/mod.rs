//! Map rendering surfaces
//!
//! This module defines the `MapSurface` trait: the primitives a widget
//! needs from a map renderer (view, tile layer, marker, popup, event
//! subscriptions, teardown). `HeadlessMap` keeps the scene in memory so it
//! can be serialized for a browser front end or inspected in tests.

pub mod headless;

use crate::constants::map;
use crate::coord::Coordinate;
use crate::error::Result;
use serde::{Deserialize, Serialize};

pub use headless::HeadlessMap;

/// Handle to a marker on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

/// Handle to an event subscription on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

/// Kinds of gesture a widget can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapEventKind {
    /// Click anywhere on the map
    Click,
    /// The marker changed position
    MarkerMove,
}

/// A user gesture delivered by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapEvent {
    Click { at: Coordinate },
    MarkerMove { at: Coordinate },
}

impl MapEvent {
    pub fn kind(&self) -> MapEventKind {
        match self {
            MapEvent::Click { .. } => MapEventKind::Click,
            MapEvent::MarkerMove { .. } => MapEventKind::MarkerMove,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        match self {
            MapEvent::Click { at } | MapEvent::MarkerMove { at } => *at,
        }
    }
}

/// Base raster layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: map::TILE_URL.to_string(),
            attribution: map::TILE_ATTRIBUTION.to_string(),
        }
    }
}

/// Custom marker icon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerIcon {
    pub url: String,
    pub size: (u32, u32),
    pub anchor: (i32, i32),
    pub popup_anchor: (i32, i32),
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            url: map::MARKER_ICON_URL.to_string(),
            size: map::MARKER_ICON_SIZE,
            anchor: map::MARKER_ICON_ANCHOR,
            popup_anchor: map::MARKER_POPUP_ANCHOR,
        }
    }
}

/// Marker to place on a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub position: Coordinate,
    pub icon: MarkerIcon,
    pub draggable: bool,
}

/// Marker as it currently appears on a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMarker {
    pub position: Coordinate,
    pub icon: MarkerIcon,
    pub draggable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<String>,
}

/// Serializable snapshot of everything a surface displays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub mounted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_layer: Option<TileLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<SceneMarker>,
    /// Active subscriptions, in registration order
    pub listeners: Vec<MapEventKind>,
    /// Number of times the surface has been torn down
    pub generation: u64,
}

/// Trait for map renderers
///
/// Implementations must be Send to live inside server sessions.
pub trait MapSurface: Send {
    /// Center the viewport; mounts the surface if it was removed
    fn set_view(&mut self, center: Coordinate, zoom: u8) -> Result<()>;

    /// Add the base raster layer
    fn add_tile_layer(&mut self, layer: TileLayer) -> Result<()>;

    /// Place a marker
    fn add_marker(&mut self, spec: MarkerSpec) -> Result<MarkerId>;

    /// Move an existing marker
    fn set_marker_position(&mut self, marker: MarkerId, at: Coordinate) -> Result<()>;

    /// Attach popup html to a marker
    fn bind_popup(&mut self, marker: MarkerId, html: String) -> Result<()>;

    /// Subscribe to a gesture kind
    fn subscribe(&mut self, kind: MapEventKind) -> Result<ListenerId>;

    /// Drop every subscription
    fn off(&mut self);

    /// Drop the viewport and everything on it
    fn remove(&mut self);

    /// Number of active subscriptions of a kind
    fn listener_count(&self, kind: MapEventKind) -> usize;

    /// Snapshot of the current scene
    fn scene(&self) -> Scene;
}
