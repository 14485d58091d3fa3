//! FlatKV - an embeddable key-value store persisted to a single file
//!
//! Keys are short strings, values are strings of at most 16 KiB, and each
//! entry may carry a time-to-live. Every mutation rewrites a JSON snapshot of
//! the whole store before it returns; the snapshot is reloaded at startup.
//!
//! ```rust,no_run
//! use flatkv::{DataStore, DeleteOutcome};
//!
//! # fn main() -> flatkv::Result<()> {
//! let store = DataStore::open_path("datastore.json")?;
//!
//! store.create("user:1", "alice", Some(60))?;
//! assert_eq!(store.read("user:1").as_deref(), Some("alice"));
//! assert_eq!(store.delete("user:1")?, DeleteOutcome::Deleted);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod snapshot;
pub mod store;
pub mod web;

/// Re-export commonly used types
pub use config::Config;
pub use error::{ErrorKind, Result, StoreError};
pub use snapshot::{SnapshotConfig, SyncPolicy};
pub use store::{DataStore, DeleteOutcome, Entry, MemoryStore, StoreStats};
