//! Periodic saving of the canvas layout.

use crate::canvas::Canvas;
use crate::layout::Layout;
use crate::storage::{Storage, StorageResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Key holding the most recently saved layout, restored on start.
pub const LAST_LAYOUT_KEY: &str = "__last_layout__";

/// Key used when no layout name has been chosen.
const DEFAULT_LAYOUT_KEY: &str = "default";

/// Saves the layout when it is dirty and the interval has elapsed.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
    layout_key: Option<String>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
            layout_key: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record that the canvas changed since the last save.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_layout_key(&mut self, key: Option<String>) {
        self.layout_key = key;
    }

    pub fn layout_key(&self) -> &str {
        self.layout_key.as_deref().unwrap_or(DEFAULT_LAYOUT_KEY)
    }

    pub fn should_save(&self) -> bool {
        self.should_save_at(Instant::now())
    }

    fn should_save_at(&self, now: Instant) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// Save if dirty and the interval has elapsed. Returns true if saved.
    pub fn maybe_save(&mut self, canvas: &Canvas) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(&canvas.to_layout())?;
        Ok(true)
    }

    /// Save immediately under the layout key and [`LAST_LAYOUT_KEY`].
    pub fn save(&mut self, layout: &Layout) -> StorageResult<()> {
        let key = self.layout_key().to_string();
        self.storage.save(&key, layout)?;
        self.storage.save(LAST_LAYOUT_KEY, layout)?;

        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::debug!(
            "Autosaved layout '{}' ({} cards, {} connections)",
            key,
            layout.cards.len(),
            layout.connections.len()
        );
        Ok(())
    }

    /// Load a named layout and make it the current one.
    pub fn load(&mut self, key: &str) -> StorageResult<Layout> {
        let layout = self.storage.load(key)?;
        self.layout_key = Some(key.to_string());
        self.dirty = false;
        self.last_save = Some(Instant::now());
        Ok(layout)
    }

    /// The last saved layout, if any.
    pub fn load_last(&mut self) -> Option<Layout> {
        match self.storage.load(LAST_LAYOUT_KEY) {
            Ok(layout) => {
                self.dirty = false;
                self.last_save = Some(Instant::now());
                Some(layout)
            }
            Err(e) => {
                log::info!("No last layout restored: {}", e);
                None
            }
        }
    }

    /// Restore the last saved layout into `canvas`.
    ///
    /// Falls back to the default grid when nothing usable was saved.
    /// Returns true if a saved layout was applied.
    pub fn restore(&mut self, canvas: &mut Canvas) -> bool {
        let Some(layout) = self.load_last() else {
            canvas.reset();
            return false;
        };
        match canvas.apply_layout(&layout) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Saved layout rejected, using default grid: {}", e);
                canvas.reset();
                false
            }
        }
    }

    pub fn delete(&self, key: &str) -> StorageResult<()> {
        self.storage.delete(key)
    }

    /// Saved layout names, without [`LAST_LAYOUT_KEY`].
    pub fn list_layouts(&self) -> StorageResult<Vec<String>> {
        let mut keys = self.storage.list()?;
        keys.retain(|key| key != LAST_LAYOUT_KEY);
        Ok(keys)
    }

    pub fn exists(&self, key: &str) -> StorageResult<bool> {
        self.storage.exists(key)
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformAutoSaveManager = AutoSaveManager<crate::storage::FileStorage>;

/// Auto-save manager backed by files in the default data directory.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_autosave_manager() -> StorageResult<PlatformAutoSaveManager> {
    let storage = crate::storage::FileStorage::default_location()?;
    Ok(AutoSaveManager::new(Arc::new(storage)))
}
