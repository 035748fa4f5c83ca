//! Saved layout format.
//!
//! ```json
//! {
//!   "cards": [ { "id": 1, "x": 0, "y": 0, "width": 350, "height": 250 } ],
//!   "connections": [ { "fromId": 1, "fromSide": 1, "fromPosition": 0.5,
//!                      "toId": 2, "toSide": 3, "toPosition": 0.5 } ]
//! }
//! ```

use crate::card::{Card, CardId, DEFAULT_CARD_HEIGHT, DEFAULT_CARD_WIDTH};
use crate::connector::{EndpointRef, SavedConnection};
use crate::error::{LayoutError, LayoutResult};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of cards in the default grid.
pub const DEFAULT_GRID_CARDS: i64 = 6;

/// Columns in the default grid.
pub const DEFAULT_GRID_COLUMNS: i64 = 3;

/// Gap between cards in the default grid.
pub const DEFAULT_GRID_GAP: i64 = 150;

/// Top-left margin of the default grid.
pub const DEFAULT_GRID_MARGIN: i64 = 50;

/// A card as written in a saved layout. Coordinates are whole logical px.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCard {
    pub id: CardId,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl SavedCard {
    pub fn to_card(&self) -> Card {
        Card::with_size(
            self.id,
            Point::new(self.x as f64, self.y as f64),
            self.width as f64,
            self.height as f64,
        )
    }
}

impl From<&Card> for SavedCard {
    /// Sizes never round below 1 px, so a saved card always passes validation.
    fn from(card: &Card) -> Self {
        Self {
            id: card.id,
            x: card.position.x.round() as i64,
            y: card.position.y.round() as i64,
            width: (card.width.round() as i64).max(1),
            height: (card.height.round() as i64).max(1),
        }
    }
}

/// A complete saved layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub cards: Vec<SavedCard>,
    #[serde(default)]
    pub connections: Vec<SavedConnection>,
    /// Occupied endpoints at save time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub occupied: Vec<EndpointRef>,
}

impl Layout {
    /// Parse and validate a layout.
    pub fn from_json(json: &str) -> LayoutResult<Self> {
        let layout: Layout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Serialize the layout to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check the parts of the layout that cannot be skipped piecemeal.
    ///
    /// Connections naming unknown cards are not an error here; they are
    /// dropped one by one while loading.
    pub fn validate(&self) -> LayoutResult<()> {
        let mut seen = HashSet::with_capacity(self.cards.len());
        for card in &self.cards {
            if !seen.insert(card.id) {
                return Err(LayoutError::DuplicateCard(card.id));
            }
            if card.width <= 0 || card.height <= 0 {
                return Err(LayoutError::InvalidDimensions {
                    id: card.id,
                    width: card.width,
                    height: card.height,
                });
            }
        }
        Ok(())
    }

    /// The grid shown on first start and after a failed load.
    pub fn default_grid() -> Self {
        let width = DEFAULT_CARD_WIDTH as i64;
        let height = DEFAULT_CARD_HEIGHT as i64;
        let cards = (0..DEFAULT_GRID_CARDS)
            .map(|index| {
                let column = index % DEFAULT_GRID_COLUMNS;
                let row = index / DEFAULT_GRID_COLUMNS;
                SavedCard {
                    id: index + 1,
                    x: DEFAULT_GRID_MARGIN + column * (width + DEFAULT_GRID_GAP),
                    y: DEFAULT_GRID_MARGIN + row * (height + DEFAULT_GRID_GAP),
                    width,
                    height,
                }
            })
            .collect();

        Self {
            cards,
            connections: Vec::new(),
            occupied: Vec::new(),
        }
    }
}
