//! Layout persistence.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{AutoSaveManager, DEFAULT_AUTOSAVE_INTERVAL_SECS, LAST_LAYOUT_KEY};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use autosave::{PlatformAutoSaveManager, create_autosave_manager};
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::layout::Layout;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Layout not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value backend for saved layouts.
///
/// Keys are opaque strings; the backend decides how they map to its own
/// namespace.
pub trait Storage: Send + Sync {
    fn save(&self, key: &str, layout: &Layout) -> StorageResult<()>;

    fn load(&self, key: &str) -> StorageResult<Layout>;

    /// Delete a layout. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    fn list(&self) -> StorageResult<Vec<String>>;

    fn exists(&self, key: &str) -> StorageResult<bool>;
}
