//! Connection store: sole owner of committed links.

use super::endpoint::{Endpoint, EndpointRef, MIDPOINT, Side};
use super::registry::EndpointRegistry;
use crate::card::CardId;
use crate::color::SerializableColor;
use crate::config::DEFAULT_STROKE_WIDTH;
use crate::geometry::EndpointLocator;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Display properties of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStyle {
    pub color: SerializableColor,
    pub stroke_width: f64,
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::default(),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

/// A committed, directional link between endpoints on two different cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: EndpointRef,
    pub to: EndpointRef,
    pub style: ConnectionStyle,
}

impl Connection {
    /// Check if this connection touches a card.
    pub fn involves_card(&self, card: CardId) -> bool {
        self.from.card == card || self.to.card == card
    }

    /// Check if this connection uses an endpoint.
    pub fn uses_endpoint(&self, endpoint: &EndpointRef) -> bool {
        self.from.same_endpoint(endpoint) || self.to.same_endpoint(endpoint)
    }

    /// Wire form of this connection.
    pub fn to_saved(&self) -> SavedConnection {
        SavedConnection {
            from_id: self.from.card,
            from_side: self.from.side,
            from_position: self.from.position,
            to_id: self.to.card,
            to_side: self.to.side,
            to_position: self.to.position,
        }
    }
}

/// A connection as written in a saved layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConnection {
    pub from_id: CardId,
    pub from_side: Side,
    #[serde(default = "midpoint")]
    pub from_position: f64,
    pub to_id: CardId,
    pub to_side: Side,
    #[serde(default = "midpoint")]
    pub to_position: f64,
}

fn midpoint() -> f64 {
    MIDPOINT
}

impl SavedConnection {
    pub fn from_ref(&self) -> EndpointRef {
        EndpointRef::new(self.from_id, self.from_side, self.from_position)
    }

    pub fn to_ref(&self) -> EndpointRef {
        EndpointRef::new(self.to_id, self.to_side, self.to_position)
    }
}

/// Owns every committed connection, in creation order.
#[derive(Debug, Clone, Default)]
pub struct ConnectionStore {
    connections: IndexMap<ConnectionId, Connection>,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connection. Self-loops are rejected with `None`.
    pub fn create(
        &mut self,
        from: EndpointRef,
        to: EndpointRef,
        style: ConnectionStyle,
    ) -> Option<ConnectionId> {
        if from.card == to.card {
            log::debug!("Rejected self-connection on card {}", from.card);
            return None;
        }

        let id = ConnectionId::new();
        self.connections.insert(
            id,
            Connection {
                id,
                from,
                to,
                style,
            },
        );
        Some(id)
    }

    /// Remove one connection.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        self.connections.shift_remove(&id)
    }

    /// Remove every connection. Returns how many there were.
    pub fn remove_all(&mut self) -> usize {
        let count = self.connections.len();
        self.connections.clear();
        count
    }

    /// Remove every connection touching a card.
    pub fn remove_for_card(&mut self, card: CardId) -> Vec<Connection> {
        let ids: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|connection| connection.involves_card(card))
            .map(|connection| connection.id)
            .collect();
        ids.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Whether any connection still uses an endpoint.
    pub fn is_endpoint_used(&self, endpoint: &EndpointRef) -> bool {
        self.connections
            .values()
            .any(|connection| connection.uses_endpoint(endpoint))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Wire form of every connection, in creation order.
    pub fn serialize(&self) -> Vec<SavedConnection> {
        self.connections.values().map(Connection::to_saved).collect()
    }

    /// Recreate saved connections against the current cards.
    ///
    /// Endpoint references are resolved in the registry, creating endpoints
    /// that do not exist yet. A connection naming a card that is not in
    /// `cards` is skipped and loading continues. Both endpoints of every
    /// recreated connection are marked occupied.
    pub fn deserialize<L: EndpointLocator + ?Sized>(
        &mut self,
        saved: &[SavedConnection],
        registry: &mut EndpointRegistry,
        cards: &L,
        style: ConnectionStyle,
    ) -> Vec<ConnectionId> {
        let mut created = Vec::with_capacity(saved.len());

        for entry in saved {
            let missing = [entry.from_id, entry.to_id]
                .into_iter()
                .find(|&card| !cards.card_exists(card));
            if let Some(card) = missing {
                log::warn!(
                    "Skipping saved connection {} -> {}: card {} not found",
                    entry.from_id,
                    entry.to_id,
                    card
                );
                continue;
            }

            if entry.from_id == entry.to_id {
                log::debug!("Skipping saved self-connection on card {}", entry.from_id);
                continue;
            }

            // The registry may resolve a position onto a nearby endpoint;
            // the connection keeps the key it resolved to.
            let from_endpoint = registry.find_or_create(&entry.from_ref());
            let to_endpoint = registry.find_or_create(&entry.to_ref());
            let (Some(from), Some(to)) = (
                registry.get(from_endpoint).map(Endpoint::key),
                registry.get(to_endpoint).map(Endpoint::key),
            ) else {
                continue;
            };
            let Some(id) = self.create(from, to, style) else {
                continue;
            };

            registry.mark_occupied(from_endpoint, true);
            registry.mark_occupied(to_endpoint, true);
            created.push(id);
        }

        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, CardSet};
    use crate::connector::endpoint::EndpointDescriptor;
    use kurbo::Point;

    fn cards(ids: &[CardId]) -> CardSet {
        let mut cards = CardSet::new();
        for &id in ids {
            cards.insert(Card::new(id, Point::new(id as f64 * 500.0, 0.0)));
        }
        cards
    }

    fn saved(from_id: CardId, from_side: Side, to_id: CardId, to_side: Side) -> SavedConnection {
        SavedConnection {
            from_id,
            from_side,
            from_position: MIDPOINT,
            to_id,
            to_side,
            to_position: MIDPOINT,
        }
    }

    #[test]
    fn test_create_and_remove() {
        let mut store = ConnectionStore::new();
        let id = store
            .create(
                EndpointRef::new(1, Side::Right, 0.5),
                EndpointRef::new(2, Side::Left, 0.5),
                ConnectionStyle::default(),
            )
            .unwrap();
        assert!(store.contains(id));
        assert_eq!(store.len(), 1);

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.from.side, Side::Right);
        assert!(store.is_empty());
        assert!(store.remove(id).is_none());
    }

    #[test]
    fn test_self_connection_rejected() {
        let mut store = ConnectionStore::new();
        let result = store.create(
            EndpointRef::new(1, Side::Right, 0.5),
            EndpointRef::new(1, Side::Left, 0.5),
            ConnectionStyle::default(),
        );
        assert!(result.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = ConnectionStore::new();
        let from = EndpointRef::new(1, Side::Right, 0.5);
        let to = EndpointRef::new(2, Side::Left, 0.5);
        let a = store.create(from, to, ConnectionStyle::default()).unwrap();
        let b = store.create(from, to, ConnectionStyle::default()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_for_card() {
        let mut store = ConnectionStore::new();
        let style = ConnectionStyle::default();
        store.create(EndpointRef::new(1, Side::Right, 0.5), EndpointRef::new(2, Side::Left, 0.5), style);
        store.create(EndpointRef::new(2, Side::Right, 0.5), EndpointRef::new(3, Side::Left, 0.5), style);
        store.create(EndpointRef::new(3, Side::Top, 0.5), EndpointRef::new(1, Side::Top, 0.5), style);

        let removed = store.remove_for_card(1);
        assert_eq!(removed.len(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.iter().all(|c| !c.involves_card(1)));
    }

    #[test]
    fn test_saved_connection_default_positions() {
        let json = r#"{ "fromId": 1, "fromSide": 1, "toId": 2, "toSide": 3 }"#;
        let entry: SavedConnection = serde_json::from_str(json).unwrap();
        assert_eq!(entry.from_position, 0.5);
        assert_eq!(entry.to_position, 0.5);
        assert_eq!(entry.from_side, Side::Right);
        assert_eq!(entry.to_side, Side::Left);
    }

    #[test]
    fn test_saved_connection_field_names() {
        let value = serde_json::to_value(saved(1, Side::Right, 2, Side::Left)).unwrap();
        assert_eq!(value["fromId"], 1);
        assert_eq!(value["fromSide"], 1);
        assert_eq!(value["toSide"], 3);
        assert_eq!(value["toPosition"], 0.5);
    }

    #[test]
    fn test_round_trip() {
        let cards = cards(&[1, 2, 3]);
        let mut registry = EndpointRegistry::new();
        let mut store = ConnectionStore::new();
        let style = ConnectionStyle::default();
        store.create(EndpointRef::new(1, Side::Right, 0.25), EndpointRef::new(2, Side::Left, 0.5), style);
        store.create(EndpointRef::new(2, Side::BottomRight, 0.5), EndpointRef::new(3, Side::Top, 0.875), style);
        let saved = store.serialize();

        let mut reloaded = ConnectionStore::new();
        let created = reloaded.deserialize(&saved, &mut registry, &cards, style);
        assert_eq!(created.len(), 2);
        assert_eq!(reloaded.serialize(), saved);
    }

    #[test]
    fn test_deserialize_creates_and_occupies_endpoints() {
        let cards = cards(&[1, 2]);
        let mut registry = EndpointRegistry::new();
        let mut store = ConnectionStore::new();
        let mut entry = saved(1, Side::Top, 2, Side::Bottom);
        entry.from_position = 0.3;

        store.deserialize(&[entry], &mut registry, &cards, ConnectionStyle::default());

        assert_eq!(registry.len(), 2);
        let from = registry.find(&EndpointRef::new(1, Side::Top, 0.3)).unwrap();
        assert!(registry.get(from).unwrap().occupied);
        let to = registry.find(&EndpointRef::new(2, Side::Bottom, 0.5)).unwrap();
        assert!(registry.get(to).unwrap().occupied);
    }

    #[test]
    fn test_deserialize_skips_missing_cards() {
        let cards = cards(&[1, 2]);
        let mut registry = EndpointRegistry::new();
        let mut store = ConnectionStore::new();
        let entries = [
            saved(1, Side::Right, 9, Side::Left),
            saved(1, Side::Right, 2, Side::Left),
            saved(8, Side::Right, 2, Side::Left),
        ];

        let created = store.deserialize(&entries, &mut registry, &cards, ConnectionStyle::default());
        assert_eq!(created.len(), 1);
        assert_eq!(store.serialize(), vec![entries[1]]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_deserialize_snaps_to_nearby_endpoint() {
        let cards = cards(&[1, 2]);
        let mut registry = EndpointRegistry::new();
        registry.register(1, EndpointDescriptor::midpoint(Side::Right));
        let mut store = ConnectionStore::new();
        let mut entry = saved(1, Side::Right, 2, Side::Left);
        entry.from_position = 0.47;

        let created = store.deserialize(&[entry], &mut registry, &cards, ConnectionStyle::default());
        assert_eq!(created.len(), 1);
        assert_eq!(registry.find_by_side(1, Side::Right).len(), 1);
        let connection = store.get(created[0]).unwrap();
        assert_eq!(connection.from, EndpointRef::new(1, Side::Right, 0.5));
        assert!(registry.get(registry.find(&connection.from).unwrap()).unwrap().occupied);
    }

    #[test]
    fn test_deserialize_skips_self_loop() {
        let cards = cards(&[1]);
        let mut registry = EndpointRegistry::new();
        let mut store = ConnectionStore::new();
        let created = store.deserialize(
            &[saved(1, Side::Right, 1, Side::Left)],
            &mut registry,
            &cards,
            ConnectionStyle::default(),
        );
        assert!(created.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_is_endpoint_used() {
        let mut store = ConnectionStore::new();
        let from = EndpointRef::new(1, Side::Right, 0.5);
        let id = store
            .create(from, EndpointRef::new(2, Side::Left, 0.5), ConnectionStyle::default())
            .unwrap();
        assert!(store.is_endpoint_used(&from));
        assert!(!store.is_endpoint_used(&EndpointRef::new(1, Side::Left, 0.5)));
        store.remove(id);
        assert!(!store.is_endpoint_used(&from));
    }
}
