//! Error types for store operations

use std::io;
use thiserror::Error;

/// Result alias used by every store and snapshot operation
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors returned by the store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key longer than the key limit or value larger than the value limit
    #[error("Key or value exceeds allowed size")]
    EntryTooLarge {
        /// Key length in UTF-16 code units
        key_len: usize,
        /// Value length in bytes
        value_len: usize,
    },

    /// More pairs than a single batch may carry
    #[error("Batch size exceeds the limit of {limit}")]
    BatchTooLarge {
        /// Number of pairs submitted
        size: usize,
        /// Maximum pairs per batch
        limit: usize,
    },

    /// TTL whose deadline cannot be represented as a timestamp
    #[error("TTL exceeds allowed range")]
    TtlOutOfRange {
        /// Requested TTL in seconds
        ttl_seconds: i64,
    },

    /// The key already holds a live value
    #[error("Key already exists")]
    KeyExists {
        /// The conflicting key
        key: String,
    },

    /// Reading or writing the snapshot file failed
    #[error("snapshot I/O error: {0}")]
    Io(#[from] io::Error),

    /// The snapshot file could not be encoded or decoded
    #[error("malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Coarse classification of a [`StoreError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input violates a static constraint; nothing was changed
    Validation,
    /// The key is taken by a live entry
    Conflict,
    /// Persistence failed
    Io,
}

impl StoreError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::EntryTooLarge { .. }
            | StoreError::BatchTooLarge { .. }
            | StoreError::TtlOutOfRange { .. } => ErrorKind::Validation,
            StoreError::KeyExists { .. } => ErrorKind::Conflict,
            StoreError::Io(_) | StoreError::Snapshot(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = StoreError::EntryTooLarge { key_len: 40, value_len: 1 };
        assert_eq!(err.to_string(), "Key or value exceeds allowed size");

        let err = StoreError::BatchTooLarge { size: 101, limit: 100 };
        assert_eq!(err.to_string(), "Batch size exceeds the limit of 100");

        let err = StoreError::KeyExists { key: "a".to_string() };
        assert_eq!(err.to_string(), "Key already exists");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            StoreError::TtlOutOfRange { ttl_seconds: i64::MAX }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            StoreError::KeyExists { key: "a".to_string() }.kind(),
            ErrorKind::Conflict
        );

        let io_err = StoreError::from(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert_eq!(io_err.kind(), ErrorKind::Io);

        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(StoreError::from(parse_err).kind(), ErrorKind::Io);
    }
}
