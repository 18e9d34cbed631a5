//! The capability every backing store provides

use std::sync::Arc;

use crate::error::Result;

/// A string key-value store that can sit in a cache's store chain.
///
/// Methods take `&self` so a single shared handle can be placed in a chain
/// and still be written to directly by its owner. Implementations use
/// interior mutability for their state.
pub trait ValueStore: Send + Sync {
    /// Look up `key`. A missing key is `Ok(None)`, not an error.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Create or overwrite `key`.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key succeeds and does nothing.
    fn delete(&self, key: &str) -> Result<()>;
}

impl<T: ValueStore + ?Sized> ValueStore for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

impl<T: ValueStore + ?Sized> ValueStore for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}
