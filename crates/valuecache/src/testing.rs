//! Store doubles for unit tests

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use valuestore::{Error, MapValueStore, Result, ValueStore};

/// Map store that counts every call made to it
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MapValueStore,
    reads: AtomicUsize,
    puts: AtomicUsize,
    deletes: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without counting it as a put
    pub fn seed(&self, key: &str, value: &str) {
        self.inner.put(key, value).unwrap();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

impl ValueStore for CountingStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key)
    }
}

/// Store whose every operation fails with an I/O error
#[derive(Debug, Default)]
pub struct FailingStore;

impl FailingStore {
    fn fail<T>() -> Result<T> {
        Err(Error::Io(io::Error::new(io::ErrorKind::Other, "store offline")))
    }
}

impl ValueStore for FailingStore {
    fn read(&self, _key: &str) -> Result<Option<String>> {
        Self::fail()
    }

    fn put(&self, _key: &str, _value: &str) -> Result<()> {
        Self::fail()
    }

    fn delete(&self, _key: &str) -> Result<()> {
        Self::fail()
    }
}
