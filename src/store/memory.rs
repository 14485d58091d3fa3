//! In-memory storage implementation

use super::entry::Entry;
use serde::Serialize;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::time::SystemTime;

/// Type alias for our hash map with SipHasher
type StoreMap = HashMap<String, Entry, BuildHasherDefault<SipHasher13>>;

/// In-memory key-value map
///
/// Plain single-owner map; [`DataStore`](super::DataStore) adds locking and
/// persistence on top. Expired entries stay in the map until something
/// removes them explicitly, so every lookup here distinguishes between
/// "physically present" and "live".
pub struct MemoryStore {
    /// The main storage map
    store: StoreMap,
}

impl MemoryStore {
    /// Create a new memory store with default capacity
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a new memory store with specified initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryStore {
            store: HashMap::with_capacity_and_hasher(
                capacity,
                BuildHasherDefault::<SipHasher13>::default(),
            ),
        }
    }

    /// Get the entry for a key, expired or not
    pub fn peek(&self, key: &str) -> Option<&Entry> {
        self.store.get(key)
    }

    /// Get the entry for a key if it is live
    pub fn get_live(&self, key: &str) -> Option<&Entry> {
        self.store.get(key).filter(|entry| !entry.is_expired())
    }

    /// Check if a key holds a live entry
    pub fn contains_live(&self, key: &str) -> bool {
        self.get_live(key).is_some()
    }

    /// Insert or overwrite an entry, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, entry: Entry) -> Option<Entry> {
        self.store.insert(key.into(), entry)
    }

    /// Remove a key regardless of its expiration state
    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.store.remove(key)
    }

    /// Remove a key only if its entry has expired
    ///
    /// Returns true if an entry was removed. A live entry (for instance one
    /// that replaced the expired value since the caller last looked) is kept.
    pub fn remove_if_expired(&mut self, key: &str) -> bool {
        let expired = self.store.get(key).is_some_and(Entry::is_expired);
        if expired {
            self.store.remove(key);
        }
        expired
    }

    /// Iterate over every physical entry
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.store.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Number of physical entries, expired ones included
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the map holds no entry at all
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of live entries
    pub fn live_len(&self) -> usize {
        let now = SystemTime::now();
        self.store
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    /// Cleanup expired keys (proactive expiration)
    /// Returns the number of keys removed
    pub fn cleanup_expired(&mut self) -> usize {
        let now = SystemTime::now();
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_expired_at(now));
        before - self.store.len()
    }

    /// Calculate approximate memory usage of live data in bytes
    pub fn memory_usage(&self) -> usize {
        let now = SystemTime::now();
        self.store
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| key.len() + entry.memory_usage())
            .sum()
    }

    /// Get statistics about the store
    pub fn stats(&self) -> StoreStats {
        let active_keys = self.live_len();

        StoreStats {
            total_keys: self.store.len(),
            expired_keys: self.store.len() - active_keys,
            active_keys,
            used_memory_bytes: self.memory_usage(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the memory store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_keys: usize,
    pub expired_keys: usize,
    pub active_keys: usize,
    pub used_memory_bytes: usize,
}
