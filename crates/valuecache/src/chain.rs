//! Ordered chain of backing stores
//!
//! Reads stop at the first store holding the key, writes go to the first
//! (primary) store only, deletes go to every store.

use std::fmt;
use std::sync::Arc;

use tracing::{trace, warn};
use valuestore::{Error, Result, ValueStore};

/// Ordered sequence of stores; the first one is the primary store
#[derive(Clone, Default)]
pub struct StoreChain {
    stores: Vec<Arc<dyn ValueStore>>,
}

impl StoreChain {
    /// Create a chain. Order is kept for the chain's lifetime.
    pub fn new(stores: Vec<Arc<dyn ValueStore>>) -> Self {
        Self { stores }
    }

    /// The write target, if the chain is not empty
    pub fn primary(&self) -> Option<&Arc<dyn ValueStore>> {
        self.stores.first()
    }

    /// All stores in chain order
    pub fn stores(&self) -> &[Arc<dyn ValueStore>] {
        &self.stores
    }

    /// Number of stores
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Check if the chain has no stores
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Return the value from the first store that has `key`.
    ///
    /// Later stores are not queried once a value is found, and nothing is
    /// copied back into earlier stores.
    pub fn read(&self, key: &str) -> Result<Option<String>> {
        for (position, store) in self.stores.iter().enumerate() {
            if let Some(value) = store.read(key)? {
                trace!(key, position, "store chain hit");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Write to the primary store only
    ///
    /// # Errors
    /// * `Error::Configuration` if the chain is empty
    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        let primary = self.primary().ok_or_else(|| {
            Error::Configuration("cannot write to an empty store chain".to_string())
        })?;
        primary.put(key, value)
    }

    /// Delete `key` from every store in order.
    ///
    /// A failing store does not stop the remaining stores from being
    /// visited; the first failure is returned once all have been tried.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut first_error = None;

        for (position, store) in self.stores.iter().enumerate() {
            if let Err(e) = store.delete(key) {
                warn!(key, position, error = %e, "store delete failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl FromIterator<Arc<dyn ValueStore>> for StoreChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn ValueStore>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Debug for StoreChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreChain")
            .field("stores", &self.stores.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingStore, FailingStore};

    fn chain_of(stores: &[&Arc<CountingStore>]) -> StoreChain {
        stores
            .iter()
            .map(|s| Arc::clone(*s) as Arc<dyn ValueStore>)
            .collect()
    }

    #[test]
    fn test_read_short_circuits() {
        let first = Arc::new(CountingStore::new());
        let second = Arc::new(CountingStore::new());
        let third = Arc::new(CountingStore::new());
        second.seed("k", "from second");
        third.seed("k", "from third");

        let chain = chain_of(&[&first, &second, &third]);

        assert_eq!(chain.read("k").unwrap(), Some("from second".to_string()));
        assert_eq!(first.reads(), 1);
        assert_eq!(second.reads(), 1);
        assert_eq!(third.reads(), 0);
        // No back-fill into earlier stores
        assert!(!first.contains("k"));
    }

    #[test]
    fn test_read_absent_everywhere() {
        let first = Arc::new(CountingStore::new());
        let second = Arc::new(CountingStore::new());
        let chain = chain_of(&[&first, &second]);

        assert_eq!(chain.read("missing").unwrap(), None);
        assert_eq!(first.reads(), 1);
        assert_eq!(second.reads(), 1);
    }

    #[test]
    fn test_write_targets_primary_only() {
        let primary = Arc::new(CountingStore::new());
        let secondary = Arc::new(CountingStore::new());
        let chain = chain_of(&[&primary, &secondary]);

        chain.write("k", "v").unwrap();

        assert!(primary.contains("k"));
        assert!(!secondary.contains("k"));
        assert_eq!(secondary.puts(), 0);
    }

    #[test]
    fn test_delete_visits_every_store() {
        let first = Arc::new(CountingStore::new());
        let second = Arc::new(CountingStore::new());
        first.seed("k", "v");
        let chain = chain_of(&[&first, &second]);

        chain.delete("k").unwrap();
        chain.delete("k").unwrap();

        assert!(!first.contains("k"));
        assert_eq!(first.deletes(), 2);
        assert_eq!(second.deletes(), 2);
    }

    #[test]
    fn test_empty_chain() {
        let chain = StoreChain::default();

        assert!(chain.is_empty());
        assert_eq!(chain.read("k").unwrap(), None);
        chain.delete("k").unwrap();
        assert!(matches!(
            chain.write("k", "v"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_delete_continues_past_failure() {
        let after = Arc::new(CountingStore::new());
        after.seed("k", "v");
        let chain = StoreChain::new(vec![
            Arc::new(FailingStore) as Arc<dyn ValueStore>,
            Arc::clone(&after) as Arc<dyn ValueStore>,
        ]);

        let result = chain.delete("k");

        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(after.deletes(), 1);
        assert!(!after.contains("k"));
    }

    #[test]
    fn test_read_error_propagates() {
        let after = Arc::new(CountingStore::new());
        let chain = StoreChain::new(vec![
            Arc::new(FailingStore) as Arc<dyn ValueStore>,
            Arc::clone(&after) as Arc<dyn ValueStore>,
        ]);

        assert!(chain.read("k").is_err());
        assert_eq!(after.reads(), 0);
    }
}
