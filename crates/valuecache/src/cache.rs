//! TieredCache: LRU cache in front of a store chain

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};
use valuestore::{Result, ValueStore};

use crate::chain::StoreChain;
use crate::lru::LruEngine;
use crate::stats::CacheStats;

/// Capacity used by [`TieredCacheBuilder`] when none is given
pub const DEFAULT_CAPACITY: usize = 1000;

/// Read-through, write-through cache over an ordered chain of stores
///
/// - `read` serves hits from the cache and fills it from the chain on a miss
/// - `put` writes the primary store, then caches the value
/// - `delete` drops the cached entry and deletes from every store
///
/// Cached values are never re-validated against the stores; an entry stays
/// authoritative until it is evicted or deleted.
///
/// The engine lock is not held while stores are consulted, so an operation
/// is not atomic across cache and stores. Callers that share one cache
/// between threads and need that guarantee must serialise access themselves.
pub struct TieredCache {
    /// Backing stores, primary first
    chain: StoreChain,

    /// LRU cache for hot data
    engine: RwLock<LruEngine<String, String>>,

    /// Cache statistics
    stats: CacheStats,
}

impl TieredCache {
    /// Create a new cache over `stores` holding at most `capacity` entries
    ///
    /// # Arguments
    /// * `stores` - Backing stores in lookup order; the first is the write target
    /// * `capacity` - Maximum number of cached entries (0 disables caching)
    pub fn new(stores: Vec<Arc<dyn ValueStore>>, capacity: usize) -> Self {
        Self::from_parts(StoreChain::new(stores), LruEngine::new(capacity))
    }

    /// Start building a cache
    pub fn builder() -> TieredCacheBuilder {
        TieredCacheBuilder::default()
    }

    fn from_parts(chain: StoreChain, engine: LruEngine<String, String>) -> Self {
        debug!(
            stores = chain.len(),
            capacity = engine.capacity(),
            "tiered cache ready"
        );
        Self {
            chain,
            engine: RwLock::new(engine),
            stats: CacheStats::new(),
        }
    }

    /// Get a value from the cache, falling back to the store chain
    ///
    /// # Arguments
    /// * `key` - Key to look up
    ///
    /// # Returns
    /// * `Result<Option<String>>` - The value, or `None` if no store has it
    pub fn read(&self, key: &str) -> Result<Option<String>> {
        {
            let mut engine = self.engine.write();
            if let Some(value) = engine.get(key) {
                self.stats.record_hit();
                trace!(key, "cache hit");
                return Ok(Some(value.clone()));
            }
        }

        self.stats.record_miss();
        let Some(value) = self.chain.read(key)? else {
            trace!(key, "cache miss, absent from every store");
            return Ok(None);
        };

        debug!(key, "filling cache from store chain");
        self.insert(key, value.clone());
        Ok(Some(value))
    }

    /// Write a value to the primary store and cache it
    ///
    /// The store is written first; if that fails the cache is left
    /// untouched.
    ///
    /// # Errors
    /// * `Error::Configuration` if there is no primary store
    /// * Any error returned by the primary store
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.chain.write(key, value)?;
        self.insert(key, value.to_string());
        Ok(())
    }

    /// Delete a value from the cache and from every store
    ///
    /// Deleting a key that is not present anywhere succeeds.
    pub fn delete(&self, key: &str) -> Result<()> {
        let was_cached = self.engine.write().remove(key).is_some();
        debug!(key, was_cached, stores = self.chain.len(), "deleting through");
        self.chain.delete(key)
    }

    /// Rebuild the cache with a new capacity
    ///
    /// The store chain and the most recently used entries are kept;
    /// entries beyond the new bound are evicted from the LRU end.
    pub fn rebuild(self, capacity: usize) -> Self {
        let TieredCache {
            chain,
            engine,
            stats,
        } = self;

        let mut engine = engine.into_inner();
        let evicted = engine.resize(capacity);
        stats.record_evictions(evicted.len() as u64);
        debug!(capacity, evicted = evicted.len(), "rebuilt tiered cache");

        Self {
            chain,
            engine: RwLock::new(engine),
            stats,
        }
    }

    /// Check if `key` is currently cached, without touching recency
    pub fn is_cached(&self, key: &str) -> bool {
        self.engine.read().contains(key)
    }

    /// Cached keys from most to least recently used
    pub fn cached_keys(&self) -> Vec<String> {
        self.engine.read().keys().cloned().collect()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get current cache size
    pub fn cache_len(&self) -> usize {
        self.engine.read().len()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.engine.read().capacity()
    }

    /// The backing store chain
    pub fn chain(&self) -> &StoreChain {
        &self.chain
    }

    /// Clear the cache (stores remain unchanged)
    pub fn clear_cache(&self) {
        self.engine.write().clear();
        self.stats.reset();
    }

    fn insert(&self, key: &str, value: String) {
        let evicted = self.engine.write().put(key.to_string(), value);
        self.stats.record_insert();

        if let Some((evicted_key, _)) = evicted {
            self.stats.record_evictions(1);
            debug!(key = %evicted_key, "evicted least recently used entry");
        }
    }
}

/// A cache can itself be a store in another cache's chain
impl ValueStore for TieredCache {
    fn read(&self, key: &str) -> Result<Option<String>> {
        TieredCache::read(self, key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        TieredCache::put(self, key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        TieredCache::delete(self, key)
    }
}

/// Builder for [`TieredCache`]
pub struct TieredCacheBuilder {
    stores: Vec<Arc<dyn ValueStore>>,
    capacity: usize,
}

impl Default for TieredCacheBuilder {
    fn default() -> Self {
        Self {
            stores: Vec::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl TieredCacheBuilder {
    /// Append a store to the chain. The first store added is the primary.
    pub fn store(mut self, store: Arc<dyn ValueStore>) -> Self {
        self.stores.push(store);
        self
    }

    /// Append several stores in order
    pub fn stores<I>(mut self, stores: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ValueStore>>,
    {
        self.stores.extend(stores);
        self
    }

    /// Maximum number of cached entries
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Build the cache
    pub fn build(self) -> TieredCache {
        TieredCache::new(self.stores, self.capacity)
    }
}
