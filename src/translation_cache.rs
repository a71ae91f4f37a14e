//! Strict LRU + TTL cache for translated strings, keyed by (key, locale).
//!
//! Entry lifecycle: absent → live → (expired but present | evicted). Expired
//! entries are never returned; they are removed lazily on lookup or by
//! [`TranslationCache::perform_maintenance`].

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    clock::{SharedClock, system_clock},
    error::Error,
};

/// Tunables of a [`TranslationCache`].
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationCacheConfig {
    pub capacity: usize,
    pub ttl: Duration,
    /// Minimum spacing between two maintenance sweeps.
    pub maintenance_interval: Duration,
    /// Bytes added per entry on top of its value when estimating memory.
    pub per_entry_overhead: usize,
    /// Fraction of capacity kept when an insert finds the cache full.
    pub full_trim_ratio: f64,
    /// Fraction of live entries kept under memory pressure.
    pub pressure_ratio: f64,
}

impl Default for TranslationCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            ttl: Duration::hours(1),
            maintenance_interval: Duration::minutes(5),
            per_entry_overhead: 64,
            full_trim_ratio: 0.8,
            pressure_ratio: 0.5,
        }
    }
}

impl TranslationCacheConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_maintenance_interval(mut self, interval: Duration) -> Self {
        self.maintenance_interval = interval;
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.capacity == 0 {
            return Err(Error::invalid_configuration(
                "translation cache capacity must be positive",
            ));
        }
        if self.ttl <= Duration::zero() {
            return Err(Error::invalid_configuration(
                "translation cache TTL must be positive",
            ));
        }
        for (name, ratio) in [
            ("full trim ratio", self.full_trim_ratio),
            ("pressure ratio", self.pressure_ratio),
        ] {
            if !(0.0..1.0).contains(&ratio) {
                return Err(Error::invalid_configuration(format!(
                    "{} must be within [0, 1), got {}",
                    name, ratio
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TranslationKey {
    key: String,
    locale: String,
}

/// A cached translation with its access bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
    // Tie-breaker for entries touched within the same clock tick.
    touched: u64,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }
}

/// Observability snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStatistics {
    pub count: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub estimated_memory_usage: usize,
}

#[derive(Debug)]
pub struct TranslationCache {
    entries: HashMap<TranslationKey, CacheEntry>,
    config: TranslationCacheConfig,
    clock: SharedClock,
    hits: u64,
    misses: u64,
    touch_counter: u64,
    last_maintenance: Option<DateTime<Utc>>,
}

impl TranslationCache {
    pub fn new(config: TranslationCacheConfig) -> Result<Self, Error> {
        Self::with_clock(config, system_clock())
    }

    pub fn with_clock(config: TranslationCacheConfig, clock: SharedClock) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            entries: HashMap::new(),
            config,
            clock,
            hits: 0,
            misses: 0,
            touch_counter: 0,
            last_maintenance: None,
        })
    }

    pub fn config(&self) -> &TranslationCacheConfig {
        &self.config
    }

    /// Looks up a live entry, refreshing its access time on a hit.
    pub fn get(&mut self, key: &str, locale: &str) -> Option<String> {
        let now = self.clock.now();
        let ttl = self.config.ttl;
        let lookup = TranslationKey {
            key: key.to_string(),
            locale: locale.to_string(),
        };

        let expired = match self.entries.get(&lookup) {
            None => {
                self.misses += 1;
                trace!(key, locale, "translation cache miss");
                return None;
            }
            Some(entry) => entry.is_expired(now, ttl),
        };
        if expired {
            self.entries.remove(&lookup);
            self.misses += 1;
            trace!(key, locale, "translation cache entry expired");
            return None;
        }

        self.touch_counter += 1;
        let touched = self.touch_counter;
        let entry = self.entries.get_mut(&lookup)?;
        entry.last_accessed = now;
        entry.access_count += 1;
        entry.touched = touched;
        self.hits += 1;
        Some(entry.value.clone())
    }

    /// Inserts or replaces a translation.
    pub fn set(&mut self, key: &str, locale: &str, value: impl Into<String>) {
        let now = self.clock.now();
        let cache_key = TranslationKey {
            key: key.to_string(),
            locale: locale.to_string(),
        };

        if !self.entries.contains_key(&cache_key) && self.entries.len() >= self.config.capacity {
            self.remove_expired(now);
            if self.entries.len() >= self.config.capacity {
                let target = (self.config.capacity as f64 * self.config.full_trim_ratio) as usize;
                self.trim_to(target);
            }
        }

        self.touch_counter += 1;
        self.entries.insert(
            cache_key,
            CacheEntry {
                value: value.into(),
                created_at: now,
                last_accessed: now,
                access_count: 0,
                touched: self.touch_counter,
            },
        );
    }

    /// Whether a live entry exists, without counting as an access.
    pub fn contains(&self, key: &str, locale: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .get(&TranslationKey {
                key: key.to_string(),
                locale: locale.to_string(),
            })
            .is_some_and(|e| !e.is_expired(now, self.config.ttl))
    }

    pub fn remove(&mut self, key: &str, locale: &str) -> Option<String> {
        self.entries
            .remove(&TranslationKey {
                key: key.to_string(),
                locale: locale.to_string(),
            })
            .map(|e| e.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        debug!("translation cache cleared");
    }

    /// Removes expired entries and trims back to capacity.
    ///
    /// Runs at most once per maintenance interval; returns `None` when skipped,
    /// otherwise the number of entries removed.
    pub fn perform_maintenance(&mut self) -> Option<usize> {
        let now = self.clock.now();
        if let Some(last) = self.last_maintenance
            && now - last < self.config.maintenance_interval
        {
            return None;
        }
        self.last_maintenance = Some(now);

        let before = self.entries.len();
        self.remove_expired(now);
        if self.entries.len() > self.config.capacity {
            self.trim_to(self.config.capacity);
        }
        let removed = before - self.entries.len();
        debug!(removed, remaining = self.entries.len(), "translation cache maintenance");
        Some(removed)
    }

    /// Drops expired entries, then keeps only the most recently used half of
    /// what is left. Returns the number of entries removed.
    pub fn handle_memory_pressure(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.remove_expired(now);
        let target = (self.entries.len() as f64 * self.config.pressure_ratio) as usize;
        self.trim_to(target);
        let removed = before - self.entries.len();
        debug!(removed, remaining = self.entries.len(), "translation cache memory pressure");
        removed
    }

    /// Entries currently stored, including expired ones not yet swept.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn live_count(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .values()
            .filter(|e| !e.is_expired(now, self.config.ttl))
            .count()
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn estimated_memory_usage(&self) -> usize {
        self.entries
            .values()
            .map(|e| e.value.len() + self.config.per_entry_overhead)
            .sum()
    }

    pub fn statistics(&self) -> CacheStatistics {
        CacheStatistics {
            count: self.count(),
            capacity: self.config.capacity,
            hits: self.hits,
            misses: self.misses,
            hit_rate: self.hit_rate(),
            estimated_memory_usage: self.estimated_memory_usage(),
        }
    }

    fn remove_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.config.ttl;
        self.entries.retain(|_, e| !e.is_expired(now, ttl));
    }

    // Evicts least recently used entries until at most `target` remain.
    fn trim_to(&mut self, target: usize) {
        if self.entries.len() <= target {
            return;
        }
        let excess = self.entries.len() - target;
        let mut by_access: Vec<(DateTime<Utc>, u64, TranslationKey)> = self
            .entries
            .iter()
            .map(|(k, e)| (e.last_accessed, e.touched, k.clone()))
            .collect();
        by_access.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        for (_, _, key) in by_access.into_iter().take(excess) {
            self.entries.remove(&key);
        }
        debug!(evicted = excess, "translation cache LRU trim");
    }
}
