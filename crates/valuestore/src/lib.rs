//! # valuestore
//!
//! String key-value stores that can be chained behind a cache.
//!
//! ## Contents
//! - [`ValueStore`]: the read/put/delete capability every store provides
//! - [`MapValueStore`]: in-memory hash map
//! - [`FileValueStore`]: append-log file with an in-memory offset index
//!
//! Absence is not an error: `read` returns `Ok(None)` and `delete` of a
//! missing key succeeds.

#![warn(missing_docs)]

mod error;
mod file;
mod memory;
pub mod parser;
mod store;

pub use error::{Error, Result};
pub use file::FileValueStore;
pub use memory::MapValueStore;
pub use store::ValueStore;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_stores_behind_trait_objects() {
        let dir = tempfile::TempDir::new().unwrap();
        let stores: Vec<Arc<dyn ValueStore>> = vec![
            Arc::new(MapValueStore::new()),
            Arc::new(FileValueStore::open(dir.path().join("db.log")).unwrap()),
        ];

        for store in &stores {
            store.put("k", "v").unwrap();
            assert_eq!(store.read("k").unwrap(), Some("v".to_string()));
            store.delete("k").unwrap();
            assert_eq!(store.read("k").unwrap(), None);
        }
    }
}
