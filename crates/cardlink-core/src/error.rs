//! Error types for layout loading and endpoint decoding.

use crate::card::CardId;
use thiserror::Error;

/// Errors raised while decoding endpoint identities.
#[derive(Debug, Error, PartialEq)]
pub enum ConnectorError {
    #[error("Invalid side code: {0} (expected 0-7)")]
    InvalidSide(u8),
    #[error("Malformed endpoint id: {0:?}")]
    MalformedEndpointId(String),
}

/// Errors raised while loading a layout.
///
/// A layout error aborts the whole load; individual missing cards inside an
/// otherwise valid layout are skipped instead (see `ConnectionStore::deserialize`).
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Invalid layout JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate card id: {0}")]
    DuplicateCard(CardId),
    #[error("Card {id} has invalid dimensions {width}x{height}")]
    InvalidDimensions { id: CardId, width: i64, height: i64 },
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
