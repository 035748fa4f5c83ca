//! In-memory storage.

use super::{Storage, StorageError, StorageResult};
use crate::layout::Layout;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for tests and hosts without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    layouts: RwLock<HashMap<String, Layout>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, layout: &Layout) -> StorageResult<()> {
        let mut layouts = self.layouts.write().map_err(lock_error)?;
        layouts.insert(key.to_string(), layout.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> StorageResult<Layout> {
        let layouts = self.layouts.read().map_err(lock_error)?;
        layouts
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let mut layouts = self.layouts.write().map_err(lock_error)?;
        layouts.remove(key);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let layouts = self.layouts.read().map_err(lock_error)?;
        let mut keys: Vec<String> = layouts.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        let layouts = self.layouts.read().map_err(lock_error)?;
        Ok(layouts.contains_key(key))
    }
}
