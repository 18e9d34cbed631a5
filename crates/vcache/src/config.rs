//! Cache configuration: store chain and capacity

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use valuecache::{TieredCache, DEFAULT_CAPACITY};
use valuestore::{FileValueStore, MapValueStore, ValueStore};

/// One backing store in the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreSpec {
    /// In-memory map store
    Memory,
    /// Append-log file store at `path`
    File { path: PathBuf },
}

impl FromStr for StoreSpec {
    type Err = String;

    /// Parses `memory` or `file:<path>`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("memory") {
            return Ok(StoreSpec::Memory);
        }
        match s.split_once(':') {
            Some(("file", path)) if !path.is_empty() => Ok(StoreSpec::File {
                path: PathBuf::from(path),
            }),
            _ => Err(format!(
                "invalid store '{}': expected 'memory' or 'file:<path>'",
                s
            )),
        }
    }
}

impl fmt::Display for StoreSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreSpec::Memory => write!(f, "memory"),
            StoreSpec::File { path } => write!(f, "file:{}", path.display()),
        }
    }
}

impl StoreSpec {
    fn open(&self) -> Result<Arc<dyn ValueStore>> {
        Ok(match self {
            StoreSpec::Memory => Arc::new(MapValueStore::new()),
            StoreSpec::File { path } => Arc::new(
                FileValueStore::open(path)
                    .with_context(|| format!("failed to open file store {}", path.display()))?,
            ),
        })
    }
}

/// Construction options for a [`TieredCache`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Maximum number of cached entries
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Stores in chain order; the first is the primary
    #[serde(default)]
    pub stores: Vec<StoreSpec>,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            stores: Vec::new(),
        }
    }
}

impl CacheConfig {
    /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Open every store and assemble the cache.
    ///
    /// With no stores configured a single in-memory store is used.
    pub fn build(&self) -> Result<TieredCache> {
        let specs = if self.stores.is_empty() {
            info!("No stores configured, using a single in-memory store");
            vec![StoreSpec::Memory]
        } else {
            self.stores.clone()
        };

        let mut stores = Vec::with_capacity(specs.len());
        for spec in &specs {
            info!("Opening store {}", spec);
            stores.push(spec.open()?);
        }

        Ok(TieredCache::new(stores, self.capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_store_spec() {
        assert_eq!("memory".parse::<StoreSpec>().unwrap(), StoreSpec::Memory);
        assert_eq!(
            "file:/tmp/a.log".parse::<StoreSpec>().unwrap(),
            StoreSpec::File {
                path: PathBuf::from("/tmp/a.log")
            }
        );
        assert!("file:".parse::<StoreSpec>().is_err());
        assert!("redis://x".parse::<StoreSpec>().is_err());
    }

    #[test]
    fn test_json_config() {
        let config: CacheConfig = serde_json::from_str(
            r#"{ "capacity": 2, "stores": [ { "kind": "memory" }, { "kind": "file", "path": "db.log" } ] }"#,
        )
        .unwrap();

        assert_eq!(config.capacity, 2);
        assert_eq!(
            config.stores,
            vec![
                StoreSpec::Memory,
                StoreSpec::File {
                    path: PathBuf::from("db.log")
                }
            ]
        );
    }

    #[test]
    fn test_json_defaults_and_unknown_fields() {
        let config: CacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CacheConfig::default());

        assert!(serde_json::from_str::<CacheConfig>(r#"{ "ttl": 5 }"#).is_err());
    }

    #[test]
    fn test_build_chain() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfig {
            capacity: 3,
            stores: vec![
                StoreSpec::Memory,
                StoreSpec::File {
                    path: dir.path().join("nested/db.log"),
                },
            ],
        };

        let cache = config.build().unwrap();
        assert_eq!(cache.capacity(), 3);
        assert_eq!(cache.chain().len(), 2);
        cache.put("k", "v").unwrap();
        assert_eq!(cache.read("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_build_defaults_to_memory_store() {
        let cache = CacheConfig::default().build().unwrap();
        assert_eq!(cache.chain().len(), 1);
        cache.put("k", "v").unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(CacheConfig::load(&dir.path().join("missing.json")).is_err());
    }
}
