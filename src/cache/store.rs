//! Eviction Store Module
//!
//! Byte-budgeted storage: a HashMap index whose entries carry a touch stamp,
//! with priority-weighted eviction.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

// == Eviction Store ==
/// Bounded container that evicts the lowest-priority entry when over budget.
///
/// Among entries of equal priority the least recently used goes first.
/// Entries without a priority are only chosen when nothing else is left to
/// choose from.
#[derive(Debug)]
pub struct EvictionStore {
    /// Key-entry storage
    entries: HashMap<String, CacheEntry>,
    /// Monotonic counter stamped onto entries on insert and lookup
    tick: u64,
    /// Byte budget, fixed at construction
    capacity_bytes: u64,
    /// Sum of `size_bytes` over all entries
    used_bytes: u64,
}

impl EvictionStore {
    // == Constructor ==
    /// Creates an empty store with the given byte budget.
    pub fn new(capacity_bytes: u64) -> Self {
        Self {
            entries: HashMap::new(),
            tick: 0,
            capacity_bytes,
            used_bytes: 0,
        }
    }

    // == Insert ==
    /// Stores `entry` under `key`, evicting as needed.
    ///
    /// Fails with `EntrySizeExceedsCapacity` without touching the store when the
    /// entry alone is larger than the budget. Returns the keys evicted to make
    /// room, in eviction order.
    pub fn insert(&mut self, key: String, mut entry: CacheEntry) -> Result<Vec<String>> {
        if entry.size_bytes > self.capacity_bytes {
            return Err(CacheError::EntrySizeExceedsCapacity {
                size: entry.size_bytes,
                capacity: self.capacity_bytes,
            });
        }

        // Overwrite: drop the old contribution before sizing the new one
        if let Some(old) = self.entries.remove(&key) {
            self.used_bytes -= old.size_bytes;
        }

        let mut evicted = Vec::new();
        while self.used_bytes + entry.size_bytes > self.capacity_bytes && !self.entries.is_empty()
        {
            match self.evict_one() {
                Some(victim) => evicted.push(victim),
                None => break,
            }
        }

        entry.key.clone_from(&key);
        entry.last_touch = self.next_tick();
        self.used_bytes += entry.size_bytes;
        self.entries.insert(key, entry);

        Ok(evicted)
    }

    // == Lookup ==
    /// Returns the entry and marks it most recently used.
    pub fn lookup(&mut self, key: &str) -> Option<&CacheEntry> {
        let tick = self.next_tick();
        let entry = self.entries.get_mut(key)?;
        entry.last_touch = tick;
        Some(entry)
    }

    // == Peek ==
    /// Returns the entry without affecting recency.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    // == Contains ==
    /// Checks presence without affecting recency.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Remove ==
    /// Removes an entry, returning whether one was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.used_bytes -= entry.size_bytes;
                true
            }
            None => false,
        }
    }

    // == Record Access ==
    /// Appends an access stamp to the entry and returns its access history.
    pub fn record_access(&mut self, key: &str, now_ms: u64) -> Option<Vec<u64>> {
        self.entries.get_mut(key).map(|entry| {
            entry.record_access(now_ms);
            entry.access_timestamps.clone()
        })
    }

    // == Purge Expired ==
    /// Removes every entry expired at `now_ms`, returning their keys.
    pub fn purge_expired(&mut self, now_ms: u64) -> Vec<String> {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now_ms))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }

        expired
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
        self.used_bytes = 0;
    }

    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        let mut touched: Vec<(&String, u64)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key, entry.last_touch))
            .collect();
        touched.sort_unstable_by_key(|(_, tick)| *tick);
        touched.into_iter().map(|(key, _)| key.clone()).collect()
    }

    fn next_tick(&mut self) -> u64 {
        self.tick = self.tick.saturating_add(1);
        self.tick
    }

    // == Eviction ==
    /// Removes the single best eviction candidate.
    fn evict_one(&mut self) -> Option<String> {
        let victim = self.select_victim()?;
        if let Some(entry) = self.entries.get(&victim) {
            debug!(
                key = %victim,
                priority = ?entry.priority,
                size = entry.size_bytes,
                "evicting entry"
            );
        }
        self.remove(&victim);
        Some(victim)
    }

    /// Lowest priority wins, the oldest touch among equals.
    fn select_victim(&self) -> Option<String> {
        let mut victim: Option<(&str, f64, u64)> = None;

        for (key, entry) in &self.entries {
            let priority = entry.eviction_priority();
            let replace = match victim {
                None => true,
                Some((_, lowest, oldest)) => {
                    priority < lowest || (priority == lowest && entry.last_touch < oldest)
                }
            };
            if replace {
                victim = Some((key, priority, entry.last_touch));
            }
        }

        victim.map(|(key, _, _)| key.to_string())
    }
}
