//! Widget state and request sequencing

use crate::coord::Coordinate;
use crate::geo::{AddressInfo, PlaceSuggestion};

/// Monotonic token source
///
/// Every request takes a token; a response is only applied while its
/// token is still the latest one issued.
#[derive(Debug, Default, Clone)]
pub struct Sequencer {
    latest: u64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, superseding all earlier ones
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Supersede every outstanding token without issuing a new request
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.latest
    }
}

/// A reverse lookup in flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupTicket {
    token: u64,
    at: Coordinate,
}

impl LookupTicket {
    /// Coordinate the lookup must be issued for
    pub fn at(&self) -> Coordinate {
        self.at
    }
}

/// A forward search in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    token: u64,
    query: String,
}

impl SearchTicket {
    /// Query text to send
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Everything a widget remembers between gestures
#[derive(Debug, Clone)]
pub struct WidgetState {
    pub coordinate: Coordinate,
    pub address: Option<AddressInfo>,
    pub places: Vec<PlaceSuggestion>,
    lookups: Sequencer,
    searches: Sequencer,
}

impl WidgetState {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            address: None,
            places: Vec::new(),
            lookups: Sequencer::new(),
            searches: Sequencer::new(),
        }
    }

    pub fn issue_lookup(&mut self) -> LookupTicket {
        LookupTicket {
            token: self.lookups.issue(),
            at: self.coordinate,
        }
    }

    pub fn issue_search(&mut self, query: &str) -> SearchTicket {
        SearchTicket {
            token: self.searches.issue(),
            query: query.to_string(),
        }
    }

    pub fn lookup_is_current(&self, ticket: &LookupTicket) -> bool {
        self.lookups.is_current(ticket.token)
    }

    pub fn search_is_current(&self, ticket: &SearchTicket) -> bool {
        self.searches.is_current(ticket.token)
    }

    pub fn cancel_lookups(&mut self) {
        self.lookups.invalidate();
    }

    pub fn cancel_searches(&mut self) {
        self.searches.invalidate();
    }
}
