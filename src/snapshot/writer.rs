//! Snapshot writer
//!
//! Rewrites the snapshot file in full. Each save goes to a sibling temporary
//! file first and is then renamed over the target, so readers of the file
//! only ever see a complete snapshot. A failed save removes its temporary
//! file and leaves the previous snapshot in place.

use super::{Snapshot, SyncPolicy};
use crate::error::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Snapshot writer
pub struct SnapshotWriter {
    path: PathBuf,
    tmp_path: PathBuf,
    sync_policy: SyncPolicy,
    last_sync: Option<Instant>,
}

impl SnapshotWriter {
    /// Create a new snapshot writer
    ///
    /// Nothing touches the disk until the first [`write`](Self::write).
    pub fn new<P: AsRef<Path>>(path: P, sync_policy: SyncPolicy) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");

        SnapshotWriter {
            path,
            tmp_path: PathBuf::from(tmp_name),
            sync_policy,
            last_sync: None,
        }
    }

    /// Replace the snapshot file with `snapshot`
    pub fn write(&mut self, snapshot: &Snapshot) -> Result<()> {
        let bytes = serde_json::to_vec(snapshot)?;

        if let Err(e) = self.replace_with(&bytes) {
            if let Err(cleanup) = fs::remove_file(&self.tmp_path) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove {:?}: {}", self.tmp_path, cleanup);
                }
            }
            return Err(e.into());
        }

        debug!("Snapshot written: {} entries, {} bytes", snapshot.len(), bytes.len());
        Ok(())
    }

    fn replace_with(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(&self.tmp_path)?;
        file.write_all(bytes)?;

        // Apply sync policy
        match self.sync_policy {
            SyncPolicy::Always => {
                file.sync_all()?;
            }
            SyncPolicy::EverySecond => {
                let due = self
                    .last_sync
                    .map_or(true, |last| last.elapsed() >= Duration::from_secs(1));
                if due {
                    file.sync_all()?;
                    self.last_sync = Some(Instant::now());
                }
            }
            SyncPolicy::No => {}
        }
        drop(file);

        fs::rename(&self.tmp_path, &self.path)?;

        // The rename lives in the directory entry
        if self.sync_policy == SyncPolicy::Always {
            sync_dir(parent_dir(&self.path))?;
        }
        Ok(())
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sync policy in effect
    pub fn sync_policy(&self) -> SyncPolicy {
        self.sync_policy
    }
}

/// Directory holding `path`; `.` for a bare file name
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

// Directories cannot be opened as files here
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotRecord;

    fn record(value: &str) -> SnapshotRecord {
        SnapshotRecord {
            value: value.to_string(),
            expiration_time: None,
        }
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut writer = SnapshotWriter::new(&path, SyncPolicy::Always);

        let mut snapshot = Snapshot::new();
        snapshot.insert("a".to_string(), record("1"));
        snapshot.insert("b".to_string(), record("2"));
        writer.write(&snapshot).unwrap();

        snapshot.remove("a");
        writer.write(&snapshot).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let loaded: Snapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded, snapshot);
        assert!(!dir.path().join("store.json.tmp").exists());
    }

    #[test]
    fn test_write_every_policy() {
        let dir = tempfile::tempdir().unwrap();

        for (name, policy) in [
            ("always.json", SyncPolicy::Always),
            ("everysec.json", SyncPolicy::EverySecond),
            ("no.json", SyncPolicy::No),
        ] {
            let mut writer = SnapshotWriter::new(dir.path().join(name), policy);
            assert_eq!(writer.sync_policy(), policy);
            writer.write(&Snapshot::new()).unwrap();
            writer.write(&Snapshot::new()).unwrap();
            assert_eq!(fs::read_to_string(writer.path()).unwrap(), "{}");
        }
    }

    #[test]
    fn test_failed_write_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        // A non-empty directory in place of the snapshot makes the rename fail
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        let mut writer = SnapshotWriter::new(&path, SyncPolicy::Always);
        assert!(writer.write(&Snapshot::new()).is_err());
        assert!(!dir.path().join("store.json.tmp").exists());
        assert!(path.join("occupied").exists());
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("store.json")), Path::new("."));
        assert_eq!(parent_dir(Path::new("data/store.json")), Path::new("data"));
        assert_eq!(parent_dir(Path::new("/var/lib/store.json")), Path::new("/var/lib"));
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_dir() {
        let dir = tempfile::tempdir().unwrap();
        sync_dir(dir.path()).unwrap();
        assert!(sync_dir(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer =
            SnapshotWriter::new(dir.path().join("missing").join("store.json"), SyncPolicy::No);
        assert!(writer.write(&Snapshot::new()).is_err());
    }
}
