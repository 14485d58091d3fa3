//! Snapshot record format
//!
//! JSON layout: `{ "<key>": { "value": "<string>", "expirationTime": <millis | null> } }`
//! where `expirationTime` counts milliseconds since the UNIX epoch.

use crate::store::{from_unix_millis, to_unix_millis, Entry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whole-store snapshot, ordered by key so the file is stable between saves
pub type Snapshot = BTreeMap<String, SnapshotRecord>;

/// One persisted entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// The stored value
    pub value: String,

    /// Expiration deadline in UNIX milliseconds, absent if the entry never expires
    #[serde(rename = "expirationTime", default)]
    pub expiration_time: Option<u64>,
}

impl SnapshotRecord {
    /// Build a record from an in-memory entry
    pub fn from_entry(entry: &Entry) -> Self {
        SnapshotRecord {
            value: entry.value().to_owned(),
            expiration_time: entry.expires_at().map(to_unix_millis),
        }
    }

    /// Convert back to an in-memory entry
    pub fn into_entry(self) -> Entry {
        Entry::with_deadline(self.value, self.expiration_time.map(from_unix_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_layout() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "a".to_string(),
            SnapshotRecord {
                value: "x".to_string(),
                expiration_time: Some(1_700_000_000_000),
            },
        );
        snapshot.insert(
            "b".to_string(),
            SnapshotRecord {
                value: "y".to_string(),
                expiration_time: None,
            },
        );

        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"{"a":{"value":"x","expirationTime":1700000000000},"b":{"value":"y","expirationTime":null}}"#
        );
    }

    #[test]
    fn test_missing_expiration_field() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"k":{"value":"v"}}"#).unwrap();
        assert_eq!(snapshot["k"].expiration_time, None);
        assert!(!snapshot["k"].clone().into_entry().is_expired());
    }

    #[test]
    fn test_expired_record_stays_expired() {
        let record = SnapshotRecord {
            value: "v".to_string(),
            expiration_time: Some(1_000),
        };
        let entry = record.into_entry();
        assert!(entry.is_expired());
        assert_eq!(SnapshotRecord::from_entry(&entry).expiration_time, Some(1_000));
    }
}
