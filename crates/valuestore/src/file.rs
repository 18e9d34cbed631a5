//! File-backed store
//!
//! The file is an append-only log of put and delete records (see
//! [`crate::parser`]). An in-memory index maps each live key to the offset of
//! its latest value, so reads are a single seek + read. Deletes append a
//! tombstone. [`FileValueStore::compact`] rewrites the log with live records
//! only.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use ahash::RandomState;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Error, Result};
use crate::parser::{encode_delete, encode_put, parse_header, parse_record, Record, STORE_MAGIC};
use crate::store::ValueStore;

/// Where a value lives in the log
#[derive(Debug, Clone, Copy)]
struct ValueLocation {
    offset: u64,
    len: usize,
}

type Index = HashMap<String, ValueLocation, RandomState>;

/// File handle, index and append position change together under one lock
struct Inner {
    file: File,
    index: Index,
    end: u64,
}

/// A [`ValueStore`] persisted to a single append-log file
pub struct FileValueStore {
    /// Path to the log file
    path: PathBuf,

    inner: RwLock<Inner>,
}

impl FileValueStore {
    /// Open or create a store at the given file path
    ///
    /// A missing or zero-length file is initialised with a fresh header.
    /// An existing log is replayed to rebuild the index.
    ///
    /// # Arguments
    /// * `path` - Log file path
    ///
    /// # Returns
    /// * `Result<FileValueStore>` - Store handle
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        let file_len = file.seek(SeekFrom::End(0))?;
        let index = if file_len == 0 {
            file.write_all(STORE_MAGIC)?;
            Index::default()
        } else {
            let mut contents = Vec::with_capacity(file_len as usize);
            file.seek(SeekFrom::Start(0))?;
            file.read_to_end(&mut contents)?;
            replay(&contents)?
        };
        let end = file.seek(SeekFrom::End(0))?;

        debug!(path = %path.display(), keys = index.len(), "opened file store");

        Ok(FileValueStore {
            path: path.to_path_buf(),
            inner: RwLock::new(Inner { file, index, end }),
        })
    }

    /// Path to the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.inner.read().index.len()
    }

    /// Check if the store holds no live keys
    pub fn is_empty(&self) -> bool {
        self.inner.read().index.is_empty()
    }

    /// Size of the log file in bytes
    pub fn log_size(&self) -> u64 {
        self.inner.read().end
    }

    /// Flush the log to disk
    pub fn sync(&self) -> Result<()> {
        self.inner.read().file.sync_all()?;
        Ok(())
    }

    /// Rewrite the log so it holds exactly one put record per live key
    pub fn compact(&self) -> Result<()> {
        let mut inner = self.inner.write();

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".compact");
        let tmp_path = PathBuf::from(tmp_name);

        let mut out = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        out.write_all(STORE_MAGIC)?;

        let mut keys: Vec<String> = inner.index.keys().cloned().collect();
        keys.sort();

        let mut index = Index::with_capacity_and_hasher(keys.len(), RandomState::new());
        let mut end = STORE_MAGIC.len() as u64;
        for key in keys {
            let location = inner.index[&key];
            let value = read_value(&mut inner.file, location)?;

            let record = encode_put(&key, &value);
            out.write_all(&record)?;
            end += record.len() as u64;

            index.insert(
                key,
                ValueLocation {
                    offset: end - 1 - location.len as u64,
                    len: location.len,
                },
            );
        }
        out.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;

        debug!(
            path = %self.path.display(),
            before = inner.end,
            after = end,
            "compacted file store"
        );

        inner.file = out;
        inner.index = index;
        inner.end = end;
        Ok(())
    }

    fn append(inner: &mut Inner, record: &[u8]) -> Result<u64> {
        let offset = inner.end;
        inner.file.seek(SeekFrom::Start(offset))?;
        if let Err(e) = inner.file.write_all(record) {
            // Drop any partial record so the log stays replayable
            let _ = inner.file.set_len(offset);
            return Err(e.into());
        }
        inner.end = offset + record.len() as u64;
        Ok(inner.end)
    }
}

impl ValueStore for FileValueStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let mut inner = self.inner.write();
        let Some(location) = inner.index.get(key).copied() else {
            return Ok(None);
        };
        read_value(&mut inner.file, location).map(Some)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let record = encode_put(key, value);
        let mut inner = self.inner.write();
        let end = Self::append(&mut inner, &record)?;

        inner.index.insert(
            key.to_string(),
            ValueLocation {
                offset: end - 1 - value.len() as u64,
                len: value.len(),
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.index.contains_key(key) {
            return Ok(());
        }

        Self::append(&mut inner, &encode_delete(key))?;
        inner.index.remove(key);
        Ok(())
    }
}

impl Drop for FileValueStore {
    fn drop(&mut self) {
        let _ = self.inner.get_mut().file.sync_all();
    }
}

fn read_value(file: &mut File, location: ValueLocation) -> Result<String> {
    file.seek(SeekFrom::Start(location.offset))?;
    let mut value = vec![0u8; location.len];
    file.read_exact(&mut value)?;
    Ok(String::from_utf8(value)?)
}

fn replay(contents: &[u8]) -> Result<Index> {
    let mut rest = parse_header(contents)?;
    let mut index = Index::default();

    while !rest.is_empty() {
        let record_start = contents.len() - rest.len();
        let (remaining, record) = parse_record(rest).map_err(|_| {
            Error::Parse(format!("Corrupt record at offset {}", record_start))
        })?;
        let record_end = contents.len() - remaining.len();

        match record {
            Record::Put { key, value } => {
                let key = String::from_utf8(key.to_vec())?;
                let location = ValueLocation {
                    offset: (record_end - 1 - value.len()) as u64,
                    len: value.len(),
                };
                index.insert(key, location);
            }
            Record::Delete { key } => {
                let key = String::from_utf8(key.to_vec())?;
                index.remove(&key);
            }
        }
        rest = remaining;
    }

    Ok(index)
}
