//! Snapshot restore
//!
//! Converts between a parsed snapshot and the in-memory map.

use super::{Snapshot, SnapshotRecord};
use crate::store::MemoryStore;
use tracing::info;

/// Restore snapshot records into a memory store
///
/// Records overwrite whatever the store holds under the same key. Records
/// whose deadline already passed are restored as-is; they stay unreadable
/// and get pruned by the first read that observes them.
pub fn restore_entries(store: &mut MemoryStore, snapshot: Snapshot) -> usize {
    let mut restored = 0;

    for (key, record) in snapshot {
        store.insert(key, record.into_entry());
        restored += 1;
    }

    info!("Successfully restored {} snapshot entries", restored);
    restored
}

/// Capture the full contents of a memory store, expired entries included
pub fn capture_entries(store: &MemoryStore) -> Snapshot {
    store
        .iter()
        .map(|(key, entry)| (key.to_owned(), SnapshotRecord::from_entry(entry)))
        .collect()
}
