//! Cache Statistics Module
//!
//! Tracks hit, miss, write and prediction counters for the engine.

use serde::Serialize;

// == Cache Stats ==
/// Engine counters. All of them reset on `clear`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Successful reads
    pub hits: u64,
    /// Reads that found nothing, an expired entry or an unreadable payload
    pub misses: u64,
    /// Successful writes
    pub sets: u64,
    /// Predicted keys that were absent when a miss triggered the preload hook
    pub predictions: u64,
    /// Entries removed to make room
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_prediction(&mut self) {
        self.predictions += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Stats Snapshot ==
/// Point-in-time view of the engine, as reported by `CacheEngine::stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub predictions: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// Number of live entries
    pub entries: usize,
    /// Bytes in use
    pub size: u64,
    /// Byte budget
    pub capacity: u64,
    pub hit_rate: f64,
}

impl StatsSnapshot {
    pub fn new(stats: &CacheStats, entries: usize, size: u64, capacity: u64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            sets: stats.sets,
            predictions: stats.predictions,
            evictions: stats.evictions,
            expirations: stats.expirations,
            entries,
            size,
            capacity,
            hit_rate: stats.hit_rate(),
        }
    }
}
