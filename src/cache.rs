//! Bounded result cache owned by each formatter.
//!
//! Unlike [`crate::translation_cache::TranslationCache`] this is not strict
//! LRU: when full, the oldest quarter of entries by insertion order is dropped
//! in one sweep. Formatter results are deterministic per key, so a coarse trim
//! only costs a recomputation. Entries older than the TTL are never returned;
//! they are removed on lookup or before a trim.

use std::{collections::HashMap, hash::Hash};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use crate::clock::{SharedClock, system_clock};

pub const DEFAULT_FORMAT_CACHE_CAPACITY: usize = 1000;

/// One hour.
pub fn default_format_cache_ttl() -> Duration {
    Duration::hours(1)
}

#[derive(Debug, Clone)]
struct CachedValue {
    value: String,
    created_at: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
    access_count: u64,
    inserted: u64,
}

/// Hit/miss counters of a formatter cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FormatCacheStats {
    pub len: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped because they outlived the TTL.
    pub expired: u64,
}

#[derive(Debug, Clone)]
pub struct FormatCache<K> {
    entries: HashMap<K, CachedValue>,
    capacity: usize,
    ttl: Duration,
    clock: SharedClock,
    next_sequence: u64,
    hits: u64,
    misses: u64,
    expired: u64,
}

impl<K: Hash + Eq + Clone> Default for FormatCache<K> {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT_CACHE_CAPACITY)
    }
}

impl<K: Hash + Eq + Clone> FormatCache<K> {
    /// Creates a cache holding at most `capacity` entries (at least one),
    /// expiring them after an hour of wall-clock time.
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, default_format_cache_ttl(), system_clock())
    }

    /// A non-positive `ttl` falls back to the default.
    pub fn with_clock(capacity: usize, ttl: Duration, clock: SharedClock) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            ttl: if ttl > Duration::zero() {
                ttl
            } else {
                default_format_cache_ttl()
            },
            clock,
            next_sequence: 0,
            hits: 0,
            misses: 0,
            expired: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&mut self, key: &K) -> Option<String> {
        let now = self.clock.now();
        let ttl = self.ttl;
        match self.entries.get_mut(key) {
            Some(cached) if now - cached.created_at <= ttl => {
                cached.last_accessed = now;
                cached.access_count += 1;
                self.hits += 1;
                trace!(access_count = cached.access_count, "format cache hit");
                Some(cached.value.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                self.expired += 1;
                self.misses += 1;
                trace!("format cache entry expired");
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: K, value: String) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.purge_expired();
            if self.entries.len() >= self.capacity {
                self.trim_oldest_quarter();
            }
        }
        let now = self.clock.now();
        let inserted = self.next_sequence;
        self.next_sequence += 1;
        self.entries.insert(
            key,
            CachedValue {
                value,
                created_at: now,
                last_accessed: now,
                access_count: 0,
                inserted,
            },
        );
    }

    /// Drops every entry past the TTL and returns how many went.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, cached| now - cached.created_at <= ttl);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.expired += removed as u64;
            debug!(removed, "purged expired format cache entries");
        }
        removed
    }

    /// Times `key` was served from the cache, if it is still present.
    pub fn access_count(&self, key: &K) -> Option<u64> {
        self.entries.get(key).map(|cached| cached.access_count)
    }

    pub fn last_accessed(&self, key: &K) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|cached| cached.last_accessed)
    }

    /// Returns the cached value or computes, stores and returns it.
    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce() -> String) -> String {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> FormatCacheStats {
        FormatCacheStats {
            len: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            expired: self.expired,
        }
    }

    fn trim_oldest_quarter(&mut self) {
        let remove = self.entries.len().div_ceil(4).max(1);
        let mut by_age: Vec<(u64, K)> = self
            .entries
            .iter()
            .map(|(k, v)| (v.inserted, k.clone()))
            .collect();
        by_age.sort_unstable_by_key(|(inserted, _)| *inserted);

        for (_, key) in by_age.into_iter().take(remove) {
            self.entries.remove(&key);
        }
        debug!(removed = remove, remaining = self.entries.len(), "trimmed format cache");
    }
}
