//! Concurrent, persisted store
//!
//! [`DataStore`] wraps a [`MemoryStore`] with two locks:
//!
//! - a mutex around the [`SnapshotWriter`], held for the whole of every
//!   mutating operation, validation and snapshot flush included. Only one
//!   mutation runs at a time, so the "key is free" check and the insert
//!   cannot interleave with another writer.
//! - a reader-writer lock around the map itself, held only briefly. Reads
//!   never wait for a flush to finish.
//!
//! Expiration is lazy. Expired entries leave memory when a read observes
//! them, when a create overwrites them, or on an explicit
//! [`purge_expired`](DataStore::purge_expired). Nothing sweeps them in the
//! background.

use super::entry::Entry;
use super::memory::{MemoryStore, StoreStats};
use crate::error::{Result, StoreError};
use crate::snapshot::{
    capture_entries, restore_entries, SnapshotConfig, SnapshotReader, SnapshotWriter,
};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Maximum key length, in UTF-16 code units
pub const MAX_KEY_LEN: usize = 32;

/// Maximum value size, in bytes
pub const MAX_VALUE_SIZE: usize = 16 * 1024;

/// Maximum number of pairs in one batch
pub const MAX_BATCH_SIZE: usize = 100;

/// Outcome of [`DataStore::delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// A live entry was removed
    Deleted,
    /// The key was absent or already expired; nothing changed
    NotFoundOrExpired,
}

impl DeleteOutcome {
    /// Message reported to clients
    pub fn message(&self) -> &'static str {
        match self {
            DeleteOutcome::Deleted => "Key deleted",
            DeleteOutcome::NotFoundOrExpired => "Key not found or expired",
        }
    }
}

/// Thread-safe key-value store persisted to a single snapshot file
pub struct DataStore {
    /// The map, shared by readers
    store: RwLock<MemoryStore>,

    /// Snapshot writer; holding this lock is what makes a mutation exclusive
    writer: Mutex<SnapshotWriter>,

    path: PathBuf,
}

impl DataStore {
    /// Open a store backed by the given snapshot file
    ///
    /// An existing file is loaded in full; a malformed one fails the open.
    pub fn open(config: &SnapshotConfig) -> Result<Self> {
        let mut store = MemoryStore::new();

        if let Some(reader) = SnapshotReader::load_if_exists(&config.path)? {
            info!("Loading snapshot from {:?} ({} bytes)", config.path, reader.size());
            let snapshot = reader.parse_records()?;
            restore_entries(&mut store, snapshot);
        }

        info!(
            "Store opened at {:?}: {} entries, sync policy {:?}",
            config.path,
            store.len(),
            config.sync_policy
        );

        Ok(DataStore {
            store: RwLock::new(store),
            writer: Mutex::new(SnapshotWriter::new(&config.path, config.sync_policy)),
            path: config.path.clone(),
        })
    }

    /// Open a store at `path` with the default sync policy
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(&SnapshotConfig::new(path.as_ref()))
    }

    /// Store `value` under `key`
    ///
    /// Fails if the key or value is too large, or if the key already holds a
    /// live value. An expired value is silently replaced. With `ttl_seconds`
    /// the entry expires that many seconds from now, otherwise never. A TTL
    /// of zero or less stores an entry that is already expired.
    ///
    /// If the snapshot flush fails the error is returned, but the entry stays
    /// in memory and is visible to subsequent reads.
    pub fn create(&self, key: &str, value: &str, ttl_seconds: Option<i64>) -> Result<()> {
        let mut writer = self.lock_writer();
        self.create_locked(&mut writer, key, value, ttl_seconds)
    }

    /// Read the value of a live key
    ///
    /// An expired entry is removed from memory on the way out. That removal
    /// is not flushed; the snapshot keeps the stale entry until the next
    /// mutation rewrites it.
    pub fn read(&self, key: &str) -> Option<String> {
        {
            let store = self.read_store();
            match store.peek(key) {
                None => return None,
                Some(entry) if !entry.is_expired() => return Some(entry.value().to_owned()),
                Some(_) => {}
            }
        }

        if self.write_store().remove_if_expired(key) {
            debug!("Pruned expired key '{}' on read", key);
        }
        None
    }

    /// Delete a live key
    ///
    /// Absent and expired keys report [`DeleteOutcome::NotFoundOrExpired`]
    /// and leave both the map and the snapshot untouched.
    pub fn delete(&self, key: &str) -> Result<DeleteOutcome> {
        let mut writer = self.lock_writer();

        let removed = {
            let mut store = self.write_store();
            if store.contains_live(key) {
                store.remove(key)
            } else {
                None
            }
        };

        if removed.is_none() {
            return Ok(DeleteOutcome::NotFoundOrExpired);
        }

        debug!("Deleted key '{}'", key);
        self.persist(&mut writer)?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Create every pair with the same TTL
    ///
    /// More than [`MAX_BATCH_SIZE`] pairs fail before anything is created.
    /// Pairs are then created one by one, in iteration order, under a single
    /// hold of the write lock. The batch is not atomic: the first failing
    /// pair aborts the batch, and the pairs created before it stay in the
    /// store.
    ///
    /// Returns the number of pairs created.
    pub fn batch_create<K, V>(
        &self,
        pairs: impl IntoIterator<Item = (K, V)>,
        ttl_seconds: Option<i64>,
    ) -> Result<usize>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pairs: Vec<(K, V)> = pairs.into_iter().collect();
        if pairs.len() > MAX_BATCH_SIZE {
            return Err(StoreError::BatchTooLarge {
                size: pairs.len(),
                limit: MAX_BATCH_SIZE,
            });
        }

        let mut writer = self.lock_writer();
        for (key, value) in &pairs {
            self.create_locked(&mut writer, key.as_ref(), value.as_ref(), ttl_seconds)?;
        }

        debug!("Batch of {} pairs created", pairs.len());
        Ok(pairs.len())
    }

    /// Remove every expired entry and flush if anything was removed
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let mut writer = self.lock_writer();

        let removed = self.write_store().cleanup_expired();
        if removed > 0 {
            info!("Purged {} expired entries", removed);
            self.persist(&mut writer)?;
        }
        Ok(removed)
    }

    /// Number of entries in memory, expired ones included
    pub fn len(&self) -> usize {
        self.read_store().len()
    }

    /// Check if the store holds no entry at all
    pub fn is_empty(&self) -> bool {
        self.read_store().is_empty()
    }

    /// Number of live entries
    pub fn live_len(&self) -> usize {
        self.read_store().live_len()
    }

    /// Get statistics about the store
    pub fn stats(&self) -> StoreStats {
        self.read_store().stats()
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn create_locked(
        &self,
        writer: &mut SnapshotWriter,
        key: &str,
        value: &str,
        ttl_seconds: Option<i64>,
    ) -> Result<()> {
        let key_len = key.encode_utf16().count();
        if key_len > MAX_KEY_LEN || value.len() > MAX_VALUE_SIZE {
            return Err(StoreError::EntryTooLarge {
                key_len,
                value_len: value.len(),
            });
        }

        let entry = match ttl_seconds {
            Some(ttl) => Entry::with_ttl_seconds(value, ttl)
                .ok_or(StoreError::TtlOutOfRange { ttl_seconds: ttl })?,
            None => Entry::new(value),
        };

        {
            let mut store = self.write_store();
            if store.contains_live(key) {
                return Err(StoreError::KeyExists {
                    key: key.to_owned(),
                });
            }
            store.insert(key, entry);
        }

        debug!("Created key '{}' (ttl: {:?})", key, ttl_seconds);
        self.persist(writer)
    }

    /// Flush the full map. Callers must hold the writer lock.
    fn persist(&self, writer: &mut SnapshotWriter) -> Result<()> {
        let snapshot = capture_entries(&self.read_store());

        writer.write(&snapshot).map_err(|e| {
            warn!(
                "Failed to write snapshot to {:?}: {} (in-memory state kept)",
                writer.path(),
                e
            );
            e
        })
    }

    fn lock_writer(&self) -> MutexGuard<'_, SnapshotWriter> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_store(&self) -> RwLockReadGuard<'_, MemoryStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, MemoryStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("path", &self.path())
            .field("entries", &self.len())
            .finish()
    }
}
