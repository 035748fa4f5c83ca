//! Cards placed on the canvas.
//!
//! The connector only reads card geometry. `CardSet` is the minimal owner
//! used by [`Canvas`](crate::canvas::Canvas); hosts with their own layout
//! model implement [`EndpointLocator`] instead.

use crate::geometry::EndpointLocator;
use indexmap::IndexMap;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Stable card identifier, as written in saved layouts.
pub type CardId = i64;

/// Default card width in logical px.
pub const DEFAULT_CARD_WIDTH: f64 = 350.0;

/// Default card height in logical px.
pub const DEFAULT_CARD_HEIGHT: f64 = 250.0;

/// Smallest width or height a card can be resized to, in logical px.
pub const MIN_CARD_SIZE: f64 = 1.0;

/// A card on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Top-left corner position.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Stacking order; higher is drawn on top.
    pub z: u32,
}

impl Card {
    /// Create a card with the default size.
    pub fn new(id: CardId, position: Point) -> Self {
        Self::with_size(id, position, DEFAULT_CARD_WIDTH, DEFAULT_CARD_HEIGHT)
    }

    /// Create a card with an explicit size.
    pub fn with_size(id: CardId, position: Point, width: f64, height: f64) -> Self {
        Self {
            id,
            position,
            width,
            height,
            z: 0,
        }
    }

    /// Bounding rectangle of the card.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }
}

/// Cards keyed by id, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct CardSet {
    cards: IndexMap<CardId, Card>,
    next_z: u32,
}

impl CardSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card, placing it on top. Replaces any card with the same id.
    pub fn insert(&mut self, mut card: Card) {
        card.z = self.next_z;
        self.next_z += 1;
        self.cards.insert(card.id, card);
    }

    /// Remove a card, keeping the order of the remaining cards.
    pub fn remove(&mut self, id: CardId) -> Option<Card> {
        self.cards.shift_remove(&id)
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Move a card so its top-left corner is at `position`.
    /// Returns false if the card does not exist.
    pub fn move_to(&mut self, id: CardId, position: Point) -> bool {
        match self.cards.get_mut(&id) {
            Some(card) => {
                card.position = position;
                true
            }
            None => false,
        }
    }

    /// Move a card by a delta.
    pub fn translate(&mut self, id: CardId, delta: Vec2) -> bool {
        match self.cards.get_mut(&id) {
            Some(card) => {
                card.position += delta;
                true
            }
            None => false,
        }
    }

    /// Resize a card, keeping its top-left corner.
    /// Sizes are clamped to at least [`MIN_CARD_SIZE`].
    pub fn resize(&mut self, id: CardId, width: f64, height: f64) -> bool {
        match self.cards.get_mut(&id) {
            Some(card) => {
                card.width = width.max(MIN_CARD_SIZE);
                card.height = height.max(MIN_CARD_SIZE);
                true
            }
            None => false,
        }
    }

    /// Raise a card above all others.
    pub fn bring_to_front(&mut self, id: CardId) -> bool {
        match self.cards.get_mut(&id) {
            Some(card) => {
                card.z = self.next_z;
                self.next_z += 1;
                true
            }
            None => false,
        }
    }

    /// Topmost card containing a point.
    pub fn card_at(&self, point: Point) -> Option<CardId> {
        self.cards
            .values()
            .filter(|card| card.bounds().contains(point))
            .max_by_key(|card| card.z)
            .map(|card| card.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.cards.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.next_z = 0;
    }
}

impl EndpointLocator for CardSet {
    fn card_bounds(&self, card: CardId) -> Option<Rect> {
        self.get(card).map(Card::bounds)
    }
}
