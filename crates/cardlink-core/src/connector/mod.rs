//! Connector subsystem.
//!
//! This module provides everything needed to link cards:
//! - Endpoints on card edges and corners, owned by an [`EndpointRegistry`]
//! - Snapping a drag to the nearest endpoint on another card
//! - Growing an edge's endpoints as links land on it
//! - The drag-to-connect gesture as a state machine
//! - Committed connections and their rendered lines
//!
//! [`ConnectorSystem`] bundles these behind the calls collaborators use.
//! Card geometry is never stored here; it is read through an
//! [`EndpointLocator`] passed into each call that needs it.

mod drawing;
mod endpoint;
pub mod generator;
mod recalc;
mod registry;
pub mod snap;
mod store;

pub use drawing::{ActiveDrawing, ConnectionDrawing, DrawingContext, DrawingOutcome, DrawingState};
pub use endpoint::{
    Endpoint, EndpointDescriptor, EndpointId, EndpointRef, LegacyEndpointId, MIDPOINT,
    POSITION_TOLERANCE, Side, normalize_position,
};
pub use recalc::{RenderedLines, recompute_all};
pub use registry::EndpointRegistry;
pub use store::{Connection, ConnectionId, ConnectionStore, ConnectionStyle, SavedConnection};

use crate::card::CardId;
use crate::config::ConnectorConfig;
use crate::geometry::EndpointLocator;
use crate::input::PointerEvent;

/// The connector subsystem: endpoints, connections, lines and the gesture.
///
/// Created once before any card registers endpoints. All mutation goes
/// through these methods so the registry, store and line table stay
/// consistent with each other.
#[derive(Debug, Clone, Default)]
pub struct ConnectorSystem {
    config: ConnectorConfig,
    registry: EndpointRegistry,
    store: ConnectionStore,
    lines: RenderedLines,
    drawing: ConnectionDrawing,
}

impl ConnectorSystem {
    /// Set up an empty connector system.
    pub fn new(config: ConnectorConfig) -> Self {
        log::debug!("Connector system initialised with {:?}", config);
        Self {
            registry: EndpointRegistry::with_min_separation(config.proximity_epsilon),
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ConnectionStore {
        &self.store
    }

    pub fn lines(&self) -> &RenderedLines {
        &self.lines
    }

    pub fn drawing(&self) -> &ConnectionDrawing {
        &self.drawing
    }

    /// Register a card's endpoints. Duplicates are ignored.
    pub fn register_endpoints(
        &mut self,
        card: CardId,
        descriptors: &[EndpointDescriptor],
    ) -> Vec<EndpointId> {
        descriptors
            .iter()
            .map(|&descriptor| self.registry.register(card, descriptor))
            .collect()
    }

    /// Register the eight endpoints every new card starts with.
    pub fn register_default_endpoints(&mut self, card: CardId) -> Vec<EndpointId> {
        self.register_endpoints(card, &EndpointDescriptor::defaults())
    }

    /// Forget a card: its endpoints, its connections and any drawing started on it.
    ///
    /// Returns the connections that were removed.
    pub fn unregister_card(&mut self, card: CardId) -> Vec<Connection> {
        if self
            .drawing
            .active()
            .is_some_and(|active| active.from_key.card == card)
        {
            self.drawing.cancel();
        }

        let removed = self.store.remove_for_card(card);
        for connection in &removed {
            self.lines.remove(connection.id);
        }
        self.registry.unregister_all(card);
        self.refresh_occupancy(&removed);
        removed
    }

    /// Feed one pointer event to the drawing gesture.
    pub fn handle_event<L: EndpointLocator + ?Sized>(
        &mut self,
        event: PointerEvent,
        locator: &L,
    ) -> DrawingOutcome {
        let mut ctx = DrawingContext {
            registry: &mut self.registry,
            store: &mut self.store,
            lines: &mut self.lines,
            config: &self.config,
            locator,
        };
        self.drawing.handle_event(event, &mut ctx)
    }

    /// Connect two registered endpoints directly, as a completed gesture would.
    pub fn connect<L: EndpointLocator + ?Sized>(
        &mut self,
        from: EndpointId,
        to: EndpointId,
        locator: &L,
    ) -> Option<ConnectionId> {
        let mut ctx = DrawingContext {
            registry: &mut self.registry,
            store: &mut self.store,
            lines: &mut self.lines,
            config: &self.config,
            locator,
        };
        ctx.commit(from, to)
    }

    /// Recreate one saved connection.
    ///
    /// Positions default to the edge midpoint. Missing endpoints are created;
    /// if either card is unknown to `cards` the connection is skipped.
    #[allow(clippy::too_many_arguments)]
    pub fn create_connection_from_saved<L: EndpointLocator + ?Sized>(
        &mut self,
        from_id: CardId,
        from_side: Side,
        to_id: CardId,
        to_side: Side,
        from_position: Option<f64>,
        to_position: Option<f64>,
        cards: &L,
    ) -> Option<ConnectionId> {
        let saved = SavedConnection {
            from_id,
            from_side,
            from_position: from_position.unwrap_or(MIDPOINT),
            to_id,
            to_side,
            to_position: to_position.unwrap_or(MIDPOINT),
        };
        self.load_connections(&[saved], cards).into_iter().next()
    }

    /// Recreate a batch of saved connections, skipping those naming unknown cards.
    ///
    /// The edges the connections land on are subdivided afterwards so the
    /// reloaded layout offers free endpoints just like a freshly drawn one.
    pub fn load_connections<L: EndpointLocator + ?Sized>(
        &mut self,
        saved: &[SavedConnection],
        cards: &L,
    ) -> Vec<ConnectionId> {
        let style = self.config.connection_style();
        let created = self
            .store
            .deserialize(saved, &mut self.registry, cards, style);

        let mut touched: Vec<(CardId, Side)> = Vec::new();
        for connection in created.iter().filter_map(|&id| self.store.get(id)) {
            for endpoint in [connection.from, connection.to] {
                if !touched.contains(&(endpoint.card, endpoint.side)) {
                    touched.push((endpoint.card, endpoint.side));
                }
            }
        }
        for (card, side) in touched {
            generator::refresh_edge(&mut self.registry, card, side, &self.config);
        }

        recompute_all(&self.store, &self.registry, cards, &mut self.lines);
        created
    }

    /// Every connection in wire form, for saving.
    pub fn get_all_connections(&self) -> Vec<SavedConnection> {
        self.store.serialize()
    }

    /// Remove one connection, clearing the occupied flag of endpoints it no
    /// longer shares with another connection.
    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        let Some(removed) = self.store.remove(id) else {
            return false;
        };
        self.lines.remove(id);
        self.refresh_occupancy(std::slice::from_ref(&removed));
        true
    }

    /// Remove every connection, as on layout reset or reload.
    pub fn clear_all_connections(&mut self) {
        let count = self.store.remove_all();
        self.lines.clear();
        self.drawing.cancel();
        let occupied: Vec<EndpointId> = self
            .registry
            .iter()
            .filter(|endpoint| endpoint.occupied)
            .map(|endpoint| endpoint.id)
            .collect();
        for id in occupied {
            self.registry.mark_occupied(id, false);
        }
        log::debug!("Cleared {} connections", count);
    }

    /// Forget all endpoints and connections.
    pub fn reset(&mut self) {
        self.clear_all_connections();
        self.registry.clear();
    }

    /// Recompute every connection's line after cards moved or resized.
    pub fn recalculate_all_lines<L: EndpointLocator + ?Sized>(&mut self, locator: &L) -> usize {
        recompute_all(&self.store, &self.registry, locator, &mut self.lines)
    }

    /// Endpoints currently marked occupied, for persistence.
    pub fn occupied_endpoints(&self) -> Vec<EndpointRef> {
        self.registry.occupied_refs()
    }

    /// Re-apply persisted occupied flags to registered endpoints.
    ///
    /// An endpoint is only marked if a stored connection uses it; unknown
    /// or unused endpoints are skipped.
    pub fn restore_occupancy(&mut self, occupied: &[EndpointRef]) -> usize {
        let mut restored = 0;
        for key in occupied {
            if !self.store.is_endpoint_used(key) {
                log::debug!(
                    "Occupied endpoint {:?}@{} on card {} has no connection",
                    key.side,
                    key.position,
                    key.card
                );
                continue;
            }
            match self.registry.find(key) {
                Some(id) => {
                    self.registry.mark_occupied(id, true);
                    restored += 1;
                }
                None => log::warn!(
                    "Occupied endpoint {:?}@{} on card {} not found",
                    key.side,
                    key.position,
                    key.card
                ),
            }
        }
        restored
    }

    /// Import a connection whose endpoints are written in a legacy encoding.
    pub fn connect_legacy<L: EndpointLocator + ?Sized>(
        &mut self,
        from_card: CardId,
        from: &LegacyEndpointId,
        to_card: CardId,
        to: &LegacyEndpointId,
        cards: &L,
    ) -> Option<ConnectionId> {
        let Some(from_id) = self.registry.resolve_legacy(from_card, from) else {
            log::warn!("Legacy endpoint {:?} not found on card {}", from, from_card);
            return None;
        };
        let Some(to_id) = self.registry.resolve_legacy(to_card, to) else {
            log::warn!("Legacy endpoint {:?} not found on card {}", to, to_card);
            return None;
        };
        let from_key = self.registry.get(from_id)?.key();
        let to_key = self.registry.get(to_id)?.key();
        self.create_connection_from_saved(
            from_key.card,
            from_key.side,
            to_key.card,
            to_key.side,
            Some(from_key.position),
            Some(to_key.position),
            cards,
        )
    }

    /// Set each endpoint of the given connections occupied iff a remaining
    /// connection still uses it.
    fn refresh_occupancy(&mut self, removed: &[Connection]) {
        for connection in removed {
            for endpoint in [connection.from, connection.to] {
                if let Some(id) = self.registry.find(&endpoint) {
                    let used = self.store.is_endpoint_used(&endpoint);
                    self.registry.mark_occupied(id, used);
                }
            }
        }
    }
}
