//! Endpoint identity: sides, positions and handles.

use crate::card::CardId;
use crate::error::ConnectorError;
use serde::{Deserialize, Serialize};

/// Two positions on the same side closer than this are the same endpoint.
pub const POSITION_TOLERANCE: f64 = 1e-6;

/// Position of an edge midpoint.
pub const MIDPOINT: f64 = 0.5;

/// Attachment side of an endpoint on its card.
///
/// The discriminants are the wire encoding used in saved layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Side {
    Top = 0,
    Right = 1,
    Bottom = 2,
    Left = 3,
    TopLeft = 4,
    TopRight = 5,
    BottomRight = 6,
    BottomLeft = 7,
}

impl Side {
    /// All sides in wire order.
    pub const ALL: [Side; 8] = [
        Side::Top,
        Side::Right,
        Side::Bottom,
        Side::Left,
        Side::TopLeft,
        Side::TopRight,
        Side::BottomRight,
        Side::BottomLeft,
    ];

    /// The four subdividable edges.
    pub const EDGES: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Whether this is a fixed corner.
    pub fn is_corner(self) -> bool {
        (self as u8) >= 4
    }

    /// Whether this is an edge that can hold multiple endpoints.
    pub fn is_edge(self) -> bool {
        !self.is_corner()
    }

    /// Wire code of this side.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Side {
    type Error = ConnectorError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Side::ALL
            .get(code as usize)
            .copied()
            .ok_or(ConnectorError::InvalidSide(code))
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> Self {
        side.code()
    }
}

/// Clamp a position into `[0, 1]`; corners always sit at the midpoint value.
pub fn normalize_position(side: Side, position: f64) -> f64 {
    if side.is_corner() || position.is_nan() {
        MIDPOINT
    } else {
        position.clamp(0.0, 1.0)
    }
}

/// Stable handle of an endpoint inside an [`EndpointRegistry`](super::EndpointRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointId(pub u32);

/// Value identity of an endpoint: which card, which side, where along it.
///
/// Connections hold these instead of handles so they survive a reload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRef {
    #[serde(rename = "cardId")]
    pub card: CardId,
    pub side: Side,
    #[serde(default = "default_position")]
    pub position: f64,
}

fn default_position() -> f64 {
    MIDPOINT
}

impl EndpointRef {
    /// Create a reference with a normalized position.
    pub fn new(card: CardId, side: Side, position: f64) -> Self {
        Self {
            card,
            side,
            position: normalize_position(side, position),
        }
    }

    /// Whether two references name the same endpoint.
    pub fn same_endpoint(&self, other: &EndpointRef) -> bool {
        self.card == other.card
            && self.side == other.side
            && (self.position - other.position).abs() < POSITION_TOLERANCE
    }
}

/// What a card asks the registry to create: a side and a position on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub side: Side,
    #[serde(default = "default_position")]
    pub position: f64,
}

impl EndpointDescriptor {
    pub fn new(side: Side, position: f64) -> Self {
        Self { side, position }
    }

    /// Endpoint at the midpoint of an edge, or at a corner.
    pub fn midpoint(side: Side) -> Self {
        Self::new(side, MIDPOINT)
    }

    /// The endpoints every card starts with: four edge midpoints and four corners.
    pub fn defaults() -> [EndpointDescriptor; 8] {
        Side::ALL.map(EndpointDescriptor::midpoint)
    }
}

/// An attachment point on a card.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub id: EndpointId,
    pub card: CardId,
    pub side: Side,
    /// Relative position along the side in `[0, 1]`.
    pub position: f64,
    /// Used by at least one committed connection.
    pub occupied: bool,
}

impl Endpoint {
    /// Value identity of this endpoint.
    pub fn key(&self) -> EndpointRef {
        EndpointRef {
            card: self.card,
            side: self.side,
            position: self.position,
        }
    }
}

/// Endpoint identities written by older layouts.
///
/// Three encodings have been seen in the wild: a bare side code (`"3"`),
/// side plus ordinal along the side (`"1-2"`), and side plus fractional
/// position (`"0-0.25"`). They are accepted for import only; the canonical
/// form is [`EndpointRef`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegacyEndpointId {
    Side(Side),
    SideIndex(Side, usize),
    SidePosition(Side, f64),
}

impl LegacyEndpointId {
    pub fn parse(raw: &str) -> Result<Self, ConnectorError> {
        let malformed = || ConnectorError::MalformedEndpointId(raw.to_string());
        let raw_trimmed = raw.trim();
        let (side_part, rest) = match raw_trimmed.split_once('-') {
            Some((side, rest)) => (side, Some(rest)),
            None => (raw_trimmed, None),
        };
        let code: u8 = side_part.parse().map_err(|_| malformed())?;
        let side = Side::try_from(code)?;

        match rest {
            None => Ok(LegacyEndpointId::Side(side)),
            Some(rest) if rest.contains('.') => {
                let position: f64 = rest.parse().map_err(|_| malformed())?;
                if !(0.0..=1.0).contains(&position) {
                    return Err(malformed());
                }
                Ok(LegacyEndpointId::SidePosition(side, position))
            }
            Some(rest) => {
                let index: usize = rest.parse().map_err(|_| malformed())?;
                Ok(LegacyEndpointId::SideIndex(side, index))
            }
        }
    }

    pub fn side(&self) -> Side {
        match *self {
            LegacyEndpointId::Side(side)
            | LegacyEndpointId::SideIndex(side, _)
            | LegacyEndpointId::SidePosition(side, _) => side,
        }
    }
}
