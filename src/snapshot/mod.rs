//! Snapshot persistence module
//!
//! Provides durability by rewriting the whole store to a single JSON file
//! after every mutation. The file is a full snapshot, never an append log:
//! loading it at startup reproduces the store as of the last successful save.

mod record;
mod reader;
mod writer;
mod restore;

pub use record::{Snapshot, SnapshotRecord};
pub use reader::SnapshotReader;
pub use writer::SnapshotWriter;
pub use restore::{capture_entries, restore_entries};

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

/// Snapshot sync policy
///
/// Decides whether a save is fsynced before it replaces the previous file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPolicy {
    /// Sync after every write (safest, slowest)
    Always,
    /// Sync at most once per second (balanced)
    #[serde(rename = "everysec")]
    EverySecond,
    /// Let the OS decide when to sync (fastest, least safe)
    No,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        SyncPolicy::Always
    }
}

impl FromStr for SyncPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(SyncPolicy::Always),
            "everysec" => Ok(SyncPolicy::EverySecond),
            "no" => Ok(SyncPolicy::No),
            other => Err(format!(
                "unknown sync policy '{}' (expected always, everysec or no)",
                other
            )),
        }
    }
}

/// Snapshot configuration
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Path to the snapshot file
    pub path: PathBuf,
    /// Sync policy
    pub sync_policy: SyncPolicy,
}

impl SnapshotConfig {
    /// Configuration for the given file with the default sync policy
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotConfig {
            path: path.into(),
            sync_policy: SyncPolicy::default(),
        }
    }

    /// Set the sync policy
    pub fn with_sync_policy(mut self, sync_policy: SyncPolicy) -> Self {
        self.sync_policy = sync_policy;
        self
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        SnapshotConfig::new("datastore.json")
    }
}
