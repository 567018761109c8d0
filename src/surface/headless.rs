//! In-memory map surface
//!
//! Records what a renderer would display. Used by the HTTP server, which
//! hands the scene to a browser, and by tests.

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::surface::{
    ListenerId, MapEventKind, MapSurface, MarkerId, MarkerSpec, Scene, SceneMarker, TileLayer,
};

/// Headless map surface
#[derive(Debug, Default)]
pub struct HeadlessMap {
    view: Option<(Coordinate, u8)>,
    tile_layer: Option<TileLayer>,
    marker: Option<(MarkerId, SceneMarker)>,
    listeners: Vec<(ListenerId, MapEventKind)>,
    next_id: u64,
    generation: u64,
}

impl HeadlessMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn ensure_mounted(&self) -> Result<()> {
        if self.view.is_none() {
            return Err(Error::Surface("map is not mounted".to_string()));
        }
        Ok(())
    }

    fn marker_mut(&mut self, id: MarkerId) -> Result<&mut SceneMarker> {
        match &mut self.marker {
            Some((current, marker)) if *current == id => Ok(marker),
            _ => Err(Error::Surface(format!("unknown marker {}", id.0))),
        }
    }
}

impl MapSurface for HeadlessMap {
    fn set_view(&mut self, center: Coordinate, zoom: u8) -> Result<()> {
        self.view = Some((center, zoom));
        Ok(())
    }

    fn add_tile_layer(&mut self, layer: TileLayer) -> Result<()> {
        self.ensure_mounted()?;
        self.tile_layer = Some(layer);
        Ok(())
    }

    fn add_marker(&mut self, spec: MarkerSpec) -> Result<MarkerId> {
        self.ensure_mounted()?;
        // One marker per map
        if self.marker.is_some() {
            return Err(Error::Surface("map already has a marker".to_string()));
        }
        let id = MarkerId(self.next_id());
        self.marker = Some((
            id,
            SceneMarker {
                position: spec.position,
                icon: spec.icon,
                draggable: spec.draggable,
                popup: None,
            },
        ));
        Ok(id)
    }

    fn set_marker_position(&mut self, marker: MarkerId, at: Coordinate) -> Result<()> {
        self.marker_mut(marker)?.position = at;
        Ok(())
    }

    fn bind_popup(&mut self, marker: MarkerId, html: String) -> Result<()> {
        self.marker_mut(marker)?.popup = Some(html);
        Ok(())
    }

    fn subscribe(&mut self, kind: MapEventKind) -> Result<ListenerId> {
        self.ensure_mounted()?;
        let id = ListenerId(self.next_id());
        self.listeners.push((id, kind));
        Ok(id)
    }

    fn off(&mut self) {
        self.listeners.clear();
    }

    fn remove(&mut self) {
        if self.view.is_none() && self.listeners.is_empty() {
            return;
        }
        self.view = None;
        self.tile_layer = None;
        self.marker = None;
        self.listeners.clear();
        self.generation += 1;
    }

    fn listener_count(&self, kind: MapEventKind) -> usize {
        self.listeners.iter().filter(|(_, k)| *k == kind).count()
    }

    fn scene(&self) -> Scene {
        Scene {
            mounted: self.view.is_some(),
            center: self.view.map(|(center, _)| center),
            zoom: self.view.map(|(_, zoom)| zoom),
            tile_layer: self.tile_layer.clone(),
            marker: self.marker.as_ref().map(|(_, marker)| marker.clone()),
            listeners: self.listeners.iter().map(|(_, kind)| *kind).collect(),
            generation: self.generation,
        }
    }
}
