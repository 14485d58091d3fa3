//! Snapshot reader
//!
//! Loads the snapshot file at startup.

use super::Snapshot;
use crate::error::Result;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use tracing::{debug, info};

/// Snapshot reader
pub struct SnapshotReader {
    data: String,
}

impl SnapshotReader {
    /// Load snapshot file
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(SnapshotReader { data })
    }

    /// Load snapshot file, `None` if it does not exist yet
    pub fn load_if_exists<P: AsRef<Path>>(path: P) -> io::Result<Option<Self>> {
        match Self::load(&path) {
            Ok(reader) => Ok(Some(reader)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {:?}", path.as_ref());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Parse the whole snapshot
    ///
    /// There is no partial recovery: any malformed content fails the parse.
    /// A blank file is an empty snapshot.
    pub fn parse_records(&self) -> Result<Snapshot> {
        if self.data.trim().is_empty() {
            return Ok(Snapshot::new());
        }

        let snapshot: Snapshot = serde_json::from_str(&self.data)?;
        info!("Snapshot parsed: {} entries", snapshot.len());
        Ok(snapshot)
    }

    /// Get the total size of the snapshot data
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
