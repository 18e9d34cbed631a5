//! # valuecache
//!
//! Bounded LRU cache in front of an ordered chain of value stores.
//!
//! ## Architecture
//! - **LruEngine**: AHash map + arena-backed doubly linked list with head/tail
//!   sentinels, O(1) get/put/remove
//! - **StoreChain**: ordered stores; reads stop at the first hit, writes go to
//!   the primary (first) store, deletes go to all
//! - **TieredCache**: read-through, write-through to primary, delete-through
//!   to every store
//!
//! ```
//! use std::sync::Arc;
//! use valuecache::TieredCache;
//! use valuestore::MapValueStore;
//!
//! let cache = TieredCache::builder()
//!     .store(Arc::new(MapValueStore::new()))
//!     .capacity(5)
//!     .build();
//!
//! cache.put("a", "b").unwrap();
//! assert_eq!(cache.read("a").unwrap(), Some("b".to_string()));
//! cache.delete("a").unwrap();
//! assert_eq!(cache.read("a").unwrap(), None);
//! ```

#![warn(missing_docs)]

mod cache;
mod chain;
pub mod lru;
mod stats;
#[cfg(test)]
mod testing;

pub use cache::{TieredCache, TieredCacheBuilder, DEFAULT_CAPACITY};
pub use chain::StoreChain;
pub use lru::LruEngine;
pub use stats::{CacheStats, StatsSnapshot};
pub use valuestore::{Error, Result, ValueStore};
