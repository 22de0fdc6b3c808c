//! Sharded byte-arena cache.
//!
//! ## Architecture
//!
//! ```text
//!   key ──► hasher.sum64 ──► hash
//!                             │
//!              low bits       │        all 64 bits
//!            ┌────────────────┴──────────────┐
//!            ▼                               ▼
//!   shards[hash & mask]              shard.map[hash] ──► handle
//!            │                               │
//!       RwLock<CacheShard>                   ▼
//!            │                        shard.queue.get(handle)
//!            ▼                               │
//!      read / write guard                    ▼
//!                                 [ts | hash | klen | key | value]
//! ```
//!
//! Payloads live in one contiguous arena per shard, so the process heap
//! carries O(shards) long-lived allocations no matter how many entries are
//! resident. There is no per-entry box to trace, which keeps the cache
//! nearly invisible to heap scanners and allocator bookkeeping.
//!
//! ## Eviction
//!
//! FIFO by arrival, gated by age: every `set` peeks the shard's oldest blob
//! and reclaims it only if it is older than the configured life window.
//! Exactly one attempt per write, so cleanup cost is amortized across the
//! write stream instead of spiking. Overwrites do not rewrite the arena;
//! the superseded blob is tombstoned in place and reclaimed when it reaches
//! the head.
//!
//! ## Thread Safety
//!
//! Every shard carries its own `parking_lot::RwLock`; readers of one shard
//! proceed in parallel and never touch another shard's lock, so there is no
//! lock ordering to get wrong. Operations within one shard are linearizable
//! with respect to its lock; across shards no ordering is promised.
//!
//! ## Example Usage
//!
//! ```
//! use bytecache::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new()
//!     .shards(64)
//!     .life_window(std::time::Duration::from_secs(300))
//!     .try_build()
//!     .unwrap();
//!
//! cache.set("user:1", b"profile bytes");
//! assert_eq!(cache.get("user:1").unwrap(), b"profile bytes");
//! assert!(cache.get("user:2").is_err());
//! ```

use parking_lot::RwLock;

use crate::builder::Config;
use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, ConfigError};
use crate::hasher::{Fnv1a64, KeyHasher};
use crate::metrics::{CacheMetrics, CacheMetricsSnapshot};
use crate::shard::{CacheShard, LookupOutcome};

/// Floor for the per-shard entry sizing hint.
const MINIMUM_ENTRIES_PER_SHARD: usize = 10;

/// Concurrent cache storing entry payloads in per-shard byte arenas.
///
/// Values are opaque byte slices; serialize in front of the cache. See the
/// [module docs](self) for layout and eviction behavior.
pub struct ShardedCache {
    shards: Box<[RwLock<CacheShard>]>,
    hasher: Box<dyn KeyHasher>,
    clock: Box<dyn Clock>,
    shard_mask: u64,
    shard_size: usize,
    life_window_secs: u64,
    verbose: bool,
    metrics: CacheMetrics,
}

impl std::fmt::Debug for ShardedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedCache")
            .field("shard_mask", &self.shard_mask)
            .field("shard_size", &self.shard_size)
            .field("life_window_secs", &self.life_window_secs)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl ShardedCache {
    /// Creates a cache from `config` with the system clock.
    ///
    /// Fails with [`ConfigError`] when the shard count is not a power of two
    /// or `max_entry_size` is zero.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub(crate) fn with_clock(config: Config, clock: Box<dyn Clock>) -> Result<Self, ConfigError> {
        if !config.shards.is_power_of_two() {
            return Err(ConfigError::new("shards must be a power of two"));
        }
        if config.max_entry_size == 0 {
            return Err(ConfigError::new("max_entry_size must be greater than zero"));
        }

        let shard_size =
            (config.max_entries_in_window / config.shards).max(MINIMUM_ENTRIES_PER_SHARD);
        let arena_capacity = shard_size * config.max_entry_size;

        let shards: Vec<RwLock<CacheShard>> = (0..config.shards)
            .map(|_| {
                RwLock::new(CacheShard::new(
                    shard_size,
                    arena_capacity,
                    config.max_entry_size,
                    config.verbose,
                ))
            })
            .collect();

        let hasher = config.hasher.unwrap_or_else(|| Box::new(Fnv1a64));

        Ok(Self {
            shards: shards.into_boxed_slice(),
            hasher,
            clock,
            shard_mask: (config.shards - 1) as u64,
            shard_size,
            life_window_secs: config.life_window.as_secs(),
            verbose: config.verbose,
            metrics: CacheMetrics::default(),
        })
    }

    /// Returns an owned copy of the value stored under `key`.
    ///
    /// Fails with [`CacheError::NotFound`] for absent keys and for 64-bit
    /// hash collisions (a resident entry whose stored key differs).
    pub fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let hash = self.hasher.sum64(key);
        let outcome = self.shard_for(hash).read().lookup(key, hash);

        match outcome {
            LookupOutcome::Hit(value) => {
                self.metrics.record_hit();
                Ok(value)
            }
            LookupOutcome::Miss => {
                self.metrics.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
            LookupOutcome::Collision(resident_key) => {
                self.metrics.record_collision();
                self.metrics.record_miss();
                if self.verbose {
                    tracing::warn!(
                        requested = key,
                        resident = resident_key.as_str(),
                        hash,
                        "hash collision"
                    );
                }
                Err(CacheError::NotFound(key.to_string()))
            }
            LookupOutcome::Broken(err) => Err(err.into()),
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// Infallible from the caller's perspective: arena growth absorbs
    /// oversized writes, and expired entries are reclaimed opportunistically
    /// (at most one per call).
    pub fn set(&self, key: &str, value: &[u8]) {
        let hash = self.hasher.sum64(key);
        let mut shard = self.shard_for(hash).write();

        // Read the clock after taking the write lock so timestamps are
        // non-decreasing in arena order within the shard.
        let now = self.clock.epoch_seconds();
        let evicted = shard.insert(key, hash, value, now, self.life_window_secs);
        drop(shard);

        self.metrics.record_insertion();
        if evicted {
            self.metrics.record_eviction();
        }
    }

    /// Drops every entry in every shard. Arena buffers are retained at
    /// their current capacity.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.write().clear(self.shard_size);
        }
    }

    /// Calls `accept` for every resident entry.
    ///
    /// Not a consistent snapshot: each shard is visited under its own read
    /// lock, so entries written concurrently in other shards may be missed
    /// or observed. Entries whose lookup fails are silently skipped. The
    /// callback runs with a shard lock held and must not call back into the
    /// cache.
    pub fn iterate(&self, mut accept: impl FnMut(&str, &[u8])) {
        for shard in self.shards.iter() {
            shard.read().for_each(&mut accept);
        }
    }

    /// Returns the number of resident entries across all shards.
    ///
    /// Best-effort under concurrent writes: shards are counted one at a
    /// time.
    pub fn size(&self) -> u64 {
        self.shards
            .iter()
            .map(|shard| shard.read().len() as u64)
            .sum()
    }

    /// Returns the total arena capacity in bytes across all shards.
    pub fn capacity(&self) -> u64 {
        self.shards
            .iter()
            .map(|shard| shard.read().arena_capacity() as u64)
            .sum()
    }

    /// Returns a snapshot of the cache's operation counters.
    pub fn metrics(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }

    fn shard_for(&self, hash: u64) -> &RwLock<CacheShard> {
        &self.shards[(hash & self.shard_mask) as usize]
    }
}
