//! Canvas: cards plus the connector system wired to them.

use crate::card::{Card, CardId, CardSet};
use crate::config::ConnectorConfig;
use crate::connector::{
    ConnectionId, ConnectorSystem, DrawingOutcome, EndpointDescriptor, EndpointId, Side,
};
use crate::error::LayoutResult;
use crate::input::PointerEvent;
use crate::layout::{Layout, SavedCard};
use kurbo::{Point, Vec2};

/// The card canvas.
///
/// Owns the cards and the connector system and keeps them in step: adding
/// a card registers its endpoints, moving or resizing one refreshes every
/// line, removing one drops its endpoints and connections.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    cards: CardSet,
    connector: ConnectorSystem,
}

impl Canvas {
    /// Create an empty canvas.
    pub fn new(config: ConnectorConfig) -> Self {
        Self {
            cards: CardSet::new(),
            connector: ConnectorSystem::new(config),
        }
    }

    /// Create a canvas showing the default grid.
    pub fn with_default_layout(config: ConnectorConfig) -> Self {
        let mut canvas = Self::new(config);
        canvas.install(&Layout::default_grid());
        canvas
    }

    /// Build a canvas from a layout.
    pub fn from_layout(config: ConnectorConfig, layout: &Layout) -> LayoutResult<Self> {
        layout.validate()?;
        let mut canvas = Self::new(config);
        canvas.install(layout);
        Ok(canvas)
    }

    pub fn cards(&self) -> &CardSet {
        &self.cards
    }

    pub fn connector(&self) -> &ConnectorSystem {
        &self.connector
    }

    /// Add a card and register its default endpoints.
    /// A card with the same id is replaced, along with its connections.
    pub fn add_card(&mut self, card: Card) {
        let id = card.id;
        if self.cards.contains(id) {
            self.connector.unregister_card(id);
        }
        self.cards.insert(card);
        self.connector.register_default_endpoints(id);
    }

    /// Register extra endpoints on an existing card.
    /// Returns an empty list if the card is unknown.
    pub fn register_endpoints(
        &mut self,
        card: CardId,
        descriptors: &[EndpointDescriptor],
    ) -> Vec<EndpointId> {
        if !self.cards.contains(card) {
            log::warn!("Cannot register endpoints on unknown card {}", card);
            return Vec::new();
        }
        self.connector.register_endpoints(card, descriptors)
    }

    /// Remove a card with its endpoints and connections.
    pub fn remove_card(&mut self, id: CardId) -> Option<Card> {
        let card = self.cards.remove(id)?;
        let removed = self.connector.unregister_card(id);
        log::debug!("Removed card {} and {} connections", id, removed.len());
        Some(card)
    }

    /// Move a card and refresh all lines.
    pub fn move_card(&mut self, id: CardId, position: Point) -> bool {
        let moved = self.cards.move_to(id, position);
        if moved {
            self.recalculate_all_lines();
        }
        moved
    }

    /// Move a card by a delta and refresh all lines.
    pub fn translate_card(&mut self, id: CardId, delta: Vec2) -> bool {
        let moved = self.cards.translate(id, delta);
        if moved {
            self.recalculate_all_lines();
        }
        moved
    }

    /// Resize a card and refresh all lines.
    pub fn resize_card(&mut self, id: CardId, width: f64, height: f64) -> bool {
        let resized = self.cards.resize(id, width, height);
        if resized {
            self.recalculate_all_lines();
        }
        resized
    }

    pub fn bring_to_front(&mut self, id: CardId) -> bool {
        self.cards.bring_to_front(id)
    }

    /// Feed a pointer event to the connection drawing gesture.
    pub fn handle_event(&mut self, event: PointerEvent) -> DrawingOutcome {
        self.connector.handle_event(event, &self.cards)
    }

    /// Recreate one saved connection against the current cards.
    pub fn create_connection_from_saved(
        &mut self,
        from_id: CardId,
        from_side: Side,
        to_id: CardId,
        to_side: Side,
        from_position: Option<f64>,
        to_position: Option<f64>,
    ) -> Option<ConnectionId> {
        self.connector.create_connection_from_saved(
            from_id,
            from_side,
            to_id,
            to_side,
            from_position,
            to_position,
            &self.cards,
        )
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        self.connector.remove_connection(id)
    }

    pub fn clear_all_connections(&mut self) {
        self.connector.clear_all_connections();
    }

    pub fn recalculate_all_lines(&mut self) -> usize {
        self.connector.recalculate_all_lines(&self.cards)
    }

    /// Snapshot of the canvas in saved-layout form.
    pub fn to_layout(&self) -> Layout {
        Layout {
            cards: self.cards.iter().map(SavedCard::from).collect(),
            connections: self.connector.get_all_connections(),
            occupied: self.connector.occupied_endpoints(),
        }
    }

    /// Replace the canvas with a layout.
    ///
    /// The new state is built aside and swapped in only if the layout is
    /// valid, so a rejected layout leaves the canvas untouched.
    pub fn apply_layout(&mut self, layout: &Layout) -> LayoutResult<()> {
        let config = self.connector.config().clone();
        *self = Self::from_layout(config, layout)?;
        Ok(())
    }

    /// Load a layout from JSON.
    ///
    /// On failure the canvas falls back to the default grid and the error
    /// is returned for the host to report.
    pub fn load_layout(&mut self, json: &str) -> LayoutResult<()> {
        let result = Layout::from_json(json).and_then(|layout| self.apply_layout(&layout));
        if let Err(e) = &result {
            log::error!("Failed to load layout, falling back to default grid: {}", e);
            self.reset();
        }
        result
    }

    /// Reset to the default grid with no connections.
    pub fn reset(&mut self) {
        let config = self.connector.config().clone();
        *self = Self::with_default_layout(config);
    }

    fn install(&mut self, layout: &Layout) {
        for saved in &layout.cards {
            self.add_card(saved.to_card());
        }
        let created = self.connector.load_connections(&layout.connections, &self.cards);
        self.connector.restore_occupancy(&layout.occupied);
        log::info!(
            "Loaded layout with {} cards and {}/{} connections",
            self.cards.len(),
            created.len(),
            layout.connections.len()
        );
    }
}
