//! Server shared state
//!
//! Holds configuration, the geocoder and the live widget sessions.
//! Sessions nobody has touched for `server.session_ttl_secs` are reaped,
//! and each session keeps at most `MAX_PENDING_EVENTS` undrained events.

use crate::config::Config;
use crate::constants::server::MAX_PENDING_EVENTS;
use crate::error::Result;
use crate::geo::locationiq::LocationIqBackend;
use crate::surface::HeadlessMap;
use crate::widget::{MapStyle, MapWidget, WidgetConfig, WidgetEvent};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// A widget event with the time the server observed it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: WidgetEvent,
}

/// One mounted widget and its pending events
pub struct Session {
    pub widget: MapWidget<HeadlessMap>,
    receiver: UnboundedReceiver<WidgetEvent>,
    pending: Vec<EventRecord>,
}

impl Session {
    /// Move emitted events into the pending log
    pub fn collect_events(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            self.pending.push(EventRecord {
                at: Utc::now(),
                event,
            });
        }

        let excess = self.pending.len().saturating_sub(MAX_PENDING_EVENTS);
        if excess > 0 {
            debug!(dropped = excess, "pending event log full");
            self.pending.drain(..excess);
        }
    }

    /// Take all pending events, oldest first
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        self.collect_events();
        std::mem::take(&mut self.pending)
    }
}

/// Registry entry with the session's last access time
struct SessionEntry {
    session: Arc<Mutex<Session>>,
    last_seen: DateTime<Utc>,
}

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// Geocoding backend shared by all sessions
    pub geocoder: LocationIqBackend,

    style: MapStyle,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    started: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, geocoder: LocationIqBackend) -> Self {
        let style = MapStyle::from_config(&config);
        Self {
            config,
            geocoder,
            style,
            sessions: RwLock::new(HashMap::new()),
            started: Instant::now(),
        }
    }

    /// Idle lifetime of a session, None when sessions never expire
    fn session_ttl(&self) -> Option<Duration> {
        match self.config.server.session_ttl_secs {
            0 => None,
            secs => Some(Duration::seconds(secs.min(u64::from(u32::MAX)) as i64)),
        }
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        self.session_ttl()
            .is_some_and(|ttl| now.signed_duration_since(entry.last_seen) > ttl)
    }

    /// Mount a widget and register its session
    ///
    /// A request without zoom gets the configured default.
    pub async fn mount(&self, mut widget_config: WidgetConfig) -> Result<(Uuid, Arc<Mutex<Session>>)> {
        if widget_config.zoom.is_none() {
            widget_config.zoom = Some(self.config.map.zoom);
        }
        let (widget, receiver) =
            MapWidget::mount(widget_config, self.style.clone(), HeadlessMap::new())?;

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session {
            widget,
            receiver,
            pending: Vec::new(),
        }));

        self.reap_expired().await;
        self.sessions.write().await.insert(
            id,
            SessionEntry {
                session: session.clone(),
                last_seen: Utc::now(),
            },
        );
        Ok((id, session))
    }

    /// Look up a live session and mark it as used
    ///
    /// An expired session is removed and reported as missing.
    pub async fn session(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        if sessions.get(&id).is_some_and(|entry| self.is_expired(entry, now)) {
            info!(%id, "widget session expired");
            sessions.remove(&id);
            return None;
        }

        let entry = sessions.get_mut(&id)?;
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    /// Drop every expired session, returning how many were removed
    pub async fn reap_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));

        let reaped = before - sessions.len();
        if reaped > 0 {
            info!(reaped, remaining = sessions.len(), "reaped idle widget sessions");
        }
        reaped
    }

    /// Drop a session; its map is torn down with the widget
    pub async fn unmount(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Pretend a session was last used `secs` seconds ago
    #[cfg(test)]
    pub(crate) async fn backdate(&self, id: Uuid, secs: i64) {
        if let Some(entry) = self.sessions.write().await.get_mut(&id) {
            entry.last_seen = entry.last_seen - Duration::seconds(secs);
        }
    }
}
