//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and priority metadata.

use crate::codec::CodecId;

/// Most recent access stamps kept per entry
pub const MAX_ACCESS_HISTORY: usize = 64;

// == Cache Entry ==
/// Represents a single stored payload with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The key this entry is stored under
    pub key: String,
    /// Encoded payload bytes
    pub payload: Vec<u8>,
    /// Bytes charged against capacity, fixed at insert
    pub size_bytes: u64,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Lifetime in seconds, None = never expires
    pub ttl_seconds: Option<u64>,
    /// Eviction priority in [0, 1], None = never preferred for eviction
    pub priority: Option<f64>,
    /// Access timestamps (Unix milliseconds), oldest first
    pub access_timestamps: Vec<u64>,
    /// Codecs applied to `payload`, in write order
    pub codecs: Vec<CodecId>,
    /// Store tick of the last insert or lookup, higher = more recent
    pub last_touch: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry charged at the payload's byte length.
    ///
    /// # Arguments
    /// * `key` - The key the entry belongs to
    /// * `payload` - Encoded bytes
    /// * `created_at` - Creation time in Unix milliseconds
    pub fn new(key: impl Into<String>, payload: Vec<u8>, created_at: u64) -> Self {
        let size_bytes = payload.len() as u64;
        Self {
            key: key.into(),
            payload,
            size_bytes,
            created_at,
            ttl_seconds: None,
            priority: None,
            access_timestamps: Vec::new(),
            codecs: Vec::new(),
            last_touch: 0,
        }
    }

    /// Overrides the charged size.
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    pub fn with_ttl(mut self, ttl_seconds: Option<u64>) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_codecs(mut self, codecs: Vec<CodecId>) -> Self {
        self.codecs = codecs;
        self
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry expires once strictly more than `ttl_seconds` have elapsed
    /// since creation, so it is still live exactly at the boundary.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.ttl_seconds {
            Some(ttl) => now_ms.saturating_sub(self.created_at) > ttl.saturating_mul(1000),
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.ttl_seconds.map(|ttl| {
            let expires = self.created_at.saturating_add(ttl.saturating_mul(1000));
            expires.saturating_sub(now_ms)
        })
    }

    // == Record Access ==
    /// Appends an access stamp, dropping the oldest beyond the history bound.
    pub fn record_access(&mut self, now_ms: u64) {
        self.access_timestamps.push(now_ms);
        if self.access_timestamps.len() > MAX_ACCESS_HISTORY {
            let excess = self.access_timestamps.len() - MAX_ACCESS_HISTORY;
            self.access_timestamps.drain(..excess);
        }
    }

    /// Priority used by the eviction scan.
    pub(crate) fn eviction_priority(&self) -> f64 {
        match self.priority {
            Some(p) if !p.is_nan() => p,
            _ => f64::INFINITY,
        }
    }
}
