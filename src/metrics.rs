//! Cache operation counters.
//!
//! Counters use relaxed atomics so the hot path pays two uncontended
//! fetch-adds per operation at most. Snapshots are best-effort: each field
//! is read independently, so a snapshot taken under concurrent load is not
//! a consistent cut.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of cache counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    /// Lookups that returned a value.
    pub hits: u64,
    /// Lookups that returned no value, collisions included.
    pub misses: u64,
    /// Lookups that found a resident entry under the same 64-bit hash but a
    /// different key.
    pub collisions: u64,
    /// Completed `set` calls.
    pub insertions: u64,
    /// Entries reclaimed by the age-gated eviction on write.
    pub evictions: u64,
}

/// Live counter cells, owned by the cache.
#[derive(Debug, Default)]
pub(crate) struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    collisions: AtomicU64,
    insertions: AtomicU64,
    evictions: AtomicU64,
}

impl CacheMetrics {
    pub(crate) fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            collisions: self.collisions.load(Ordering::Relaxed),
            insertions: self.insertions.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_collision(&self) {
        self.collisions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insertion(&self) {
        self.insertions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }
}
