//! Entry structure for stored values

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Represents a single value in the store
///
/// Expiration is a wall-clock deadline so that it survives a snapshot
/// round-trip through the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The value
    value: String,

    /// Optional expiration time (absolute)
    expires_at: Option<SystemTime>,
}

impl Entry {
    /// Create a new entry without expiration
    pub fn new(value: impl Into<String>) -> Self {
        Entry {
            value: value.into(),
            expires_at: None,
        }
    }

    /// Create a new entry that expires at the given instant
    pub fn with_deadline(value: impl Into<String>, expires_at: Option<SystemTime>) -> Self {
        Entry {
            value: value.into(),
            expires_at,
        }
    }

    /// Create a new entry expiring `ttl` from now
    ///
    /// Returns `None` when the deadline overflows the clock.
    pub fn with_expiration(value: impl Into<String>, ttl: Duration) -> Option<Self> {
        let expires_at = SystemTime::now().checked_add(ttl)?;
        Some(Entry {
            value: value.into(),
            expires_at: Some(expires_at),
        })
    }

    /// Create a new entry expiring `ttl_seconds` from now
    ///
    /// A negative TTL puts the deadline in the past, so the entry is born
    /// expired. Returns `None` when the deadline overflows the clock.
    pub fn with_ttl_seconds(value: impl Into<String>, ttl_seconds: i64) -> Option<Self> {
        let now = SystemTime::now();
        let offset = Duration::from_secs(ttl_seconds.unsigned_abs());
        let expires_at = if ttl_seconds >= 0 {
            now.checked_add(offset)?
        } else {
            now.checked_sub(offset)?
        };
        Some(Entry::with_deadline(value, Some(expires_at)))
    }

    /// The stored value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Absolute expiration time, `None` if the entry never expires
    pub fn expires_at(&self) -> Option<SystemTime> {
        self.expires_at
    }

    /// Check if the entry has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }

    /// Check expiration against a given clock reading
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }

    /// Approximate memory usage of this entry in bytes
    pub fn memory_usage(&self) -> usize {
        self.value.len() + std::mem::size_of::<Option<SystemTime>>()
    }
}

/// Milliseconds since the UNIX epoch, clamped to zero for earlier times
pub fn to_unix_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().min(u64::MAX as u128) as u64)
        .unwrap_or(0)
}

/// Inverse of [`to_unix_millis`]
pub fn from_unix_millis(millis: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(millis)
}
