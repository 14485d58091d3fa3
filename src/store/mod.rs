//! Storage module
//!
//! Provides the in-memory map of entries and the concurrent, persisted
//! [`DataStore`] built on top of it. This module is independent of the HTTP
//! layer (loose coupling).

mod entry;
mod memory;
mod datastore;

pub use entry::{from_unix_millis, to_unix_millis, Entry};
pub use memory::{MemoryStore, StoreStats};
pub use datastore::{DataStore, DeleteOutcome, MAX_BATCH_SIZE, MAX_KEY_LEN, MAX_VALUE_SIZE};
