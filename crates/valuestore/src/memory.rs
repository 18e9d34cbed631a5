//! In-memory map store

use std::collections::HashMap;

use ahash::RandomState;
use parking_lot::RwLock;

use crate::error::Result;
use crate::store::ValueStore;

/// A [`ValueStore`] backed by a hash map. Never fails.
#[derive(Debug, Default)]
pub struct MapValueStore {
    entries: RwLock<HashMap<String, String, RandomState>>,
}

impl MapValueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Check if `key` is stored
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}

impl ValueStore for MapValueStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
