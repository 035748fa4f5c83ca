//! Endpoint registry: the arena owning every endpoint on every card.

use super::endpoint::{
    Endpoint, EndpointDescriptor, EndpointId, EndpointRef, LegacyEndpointId, Side,
};
use crate::card::CardId;
use crate::config::PROXIMITY_EPSILON;
use indexmap::IndexMap;

/// Slack for comparing edge spacing against the minimum separation.
const SEPARATION_TOLERANCE: f64 = 1e-9;

/// Owns all endpoints, keyed by stable handle, in insertion order.
///
/// Iteration order is registration order; the snap resolver relies on it for
/// deterministic tie-breaking.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    endpoints: IndexMap<EndpointId, Endpoint>,
    next_id: u32,
    /// No two endpoints on one edge are closer than this.
    min_separation: f64,
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::with_min_separation(PROXIMITY_EPSILON)
    }
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry enforcing a custom minimum spacing between edge endpoints.
    pub fn with_min_separation(min_separation: f64) -> Self {
        Self {
            endpoints: IndexMap::new(),
            next_id: 0,
            min_separation,
        }
    }

    pub fn min_separation(&self) -> f64 {
        self.min_separation
    }

    /// Register an endpoint on a card.
    ///
    /// If the card already has an endpoint at the same side and position, or
    /// on the same edge within the minimum separation, nothing is added and
    /// the nearest existing handle is returned.
    pub fn register(&mut self, card: CardId, descriptor: EndpointDescriptor) -> EndpointId {
        let key = EndpointRef::new(card, descriptor.side, descriptor.position);
        if let Some(existing) = self.find(&key).or_else(|| self.nearby(&key)) {
            log::debug!(
                "Endpoint {:?}@{} on card {} already covered by {:?}",
                key.side,
                key.position,
                card,
                existing
            );
            return existing;
        }

        let id = EndpointId(self.next_id);
        self.next_id += 1;
        self.endpoints.insert(
            id,
            Endpoint {
                id,
                card,
                side: key.side,
                position: key.position,
                occupied: false,
            },
        );
        id
    }

    /// Remove every endpoint of a card. Returns how many were removed.
    pub fn unregister_all(&mut self, card: CardId) -> usize {
        let before = self.endpoints.len();
        self.endpoints.retain(|_, endpoint| endpoint.card != card);
        before - self.endpoints.len()
    }

    /// Endpoints on one side of a card, ordered by position.
    pub fn find_by_side(&self, card: CardId, side: Side) -> Vec<&Endpoint> {
        let mut found: Vec<&Endpoint> = self
            .endpoints
            .values()
            .filter(|endpoint| endpoint.card == card && endpoint.side == side)
            .collect();
        found.sort_by(|a, b| a.position.total_cmp(&b.position));
        found
    }

    /// Set or clear the occupied flag. Returns false for an unknown handle.
    pub fn mark_occupied(&mut self, id: EndpointId, occupied: bool) -> bool {
        match self.endpoints.get_mut(&id) {
            Some(endpoint) => {
                endpoint.occupied = occupied;
                true
            }
            None => false,
        }
    }

    /// Every endpoint not on `card`, in registration order.
    pub fn all_except(&self, card: CardId) -> impl Iterator<Item = &Endpoint> {
        self.endpoints
            .values()
            .filter(move |endpoint| endpoint.card != card)
    }

    /// Every endpoint of `card`, in registration order.
    pub fn endpoints_of(&self, card: CardId) -> impl Iterator<Item = &Endpoint> {
        self.endpoints
            .values()
            .filter(move |endpoint| endpoint.card == card)
    }

    pub fn get(&self, id: EndpointId) -> Option<&Endpoint> {
        self.endpoints.get(&id)
    }

    /// Handle of the endpoint a reference names, if registered.
    pub fn find(&self, key: &EndpointRef) -> Option<EndpointId> {
        let key = EndpointRef::new(key.card, key.side, key.position);
        self.endpoints
            .values()
            .find(|endpoint| endpoint.key().same_endpoint(&key))
            .map(|endpoint| endpoint.id)
    }

    /// Nearest endpoint on the same edge within the minimum separation.
    fn nearby(&self, key: &EndpointRef) -> Option<EndpointId> {
        if key.side.is_corner() {
            return None;
        }
        self.endpoints
            .values()
            .filter(|endpoint| endpoint.card == key.card && endpoint.side == key.side)
            .map(|endpoint| (endpoint.id, (endpoint.position - key.position).abs()))
            .filter(|&(_, gap)| gap <= self.min_separation + SEPARATION_TOLERANCE)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Handle of the endpoint a reference names, registering it if needed.
    ///
    /// A reference falling within the minimum separation of an existing
    /// endpoint resolves to that endpoint.
    pub fn find_or_create(&mut self, key: &EndpointRef) -> EndpointId {
        self.register(key.card, EndpointDescriptor::new(key.side, key.position))
    }

    /// Resolve an endpoint identity written in a legacy encoding.
    ///
    /// Ordinals count endpoints along the side in position order.
    pub fn resolve_legacy(&self, card: CardId, legacy: &LegacyEndpointId) -> Option<EndpointId> {
        match *legacy {
            LegacyEndpointId::Side(side) => self.find(&EndpointRef::new(card, side, 0.5)),
            LegacyEndpointId::SidePosition(side, position) => {
                self.find(&EndpointRef::new(card, side, position))
            }
            LegacyEndpointId::SideIndex(side, index) => self
                .find_by_side(card, side)
                .get(index)
                .map(|endpoint| endpoint.id),
        }
    }

    /// References of all occupied endpoints, in registration order.
    pub fn occupied_refs(&self) -> Vec<EndpointRef> {
        self.endpoints
            .values()
            .filter(|endpoint| endpoint.occupied)
            .map(Endpoint::key)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn clear(&mut self) {
        self.endpoints.clear();
    }
}
