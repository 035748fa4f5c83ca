//! CardLink Core Library
//!
//! Platform-agnostic connector logic for a card canvas: endpoints on card
//! edges, the drag-to-connect gesture, endpoint snapping, dynamic endpoint
//! growth and link geometry recomputation, plus layout persistence.

pub mod canvas;
pub mod card;
pub mod color;
pub mod config;
pub mod connector;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod storage;

pub use canvas::Canvas;
pub use card::{Card, CardId, CardSet};
pub use color::SerializableColor;
pub use config::ConnectorConfig;
pub use connector::{
    Connection, ConnectionId, ConnectionStyle, ConnectorSystem, DrawingOutcome, DrawingState,
    Endpoint, EndpointDescriptor, EndpointId, EndpointRef, EndpointRegistry, SavedConnection, Side,
};
pub use error::{ConnectorError, LayoutError};
pub use geometry::EndpointLocator;
pub use input::PointerEvent;
pub use layout::{Layout, SavedCard};
pub use storage::{MemoryStorage, Storage, StorageError};
