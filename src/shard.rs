//! A single cache shard: hash map, byte arena, and scratch buffer.
//!
//! A shard never locks anything itself; [`ShardedCache`](crate::cache::ShardedCache)
//! wraps each shard in a `parking_lot::RwLock` and calls in with the guard
//! held. Lookups take `&self`, writes take `&mut self`, so the borrow rules
//! mirror the read/write lock discipline one level up.
//!
//! The map stores `hash → handle` where the handle is the blob's byte offset
//! in the arena. The arena reserves offset zero, so no valid handle is ever
//! zero; absence is simply a missing map entry.

use rustc_hash::FxHashMap;

use crate::ds::ByteQueue;
use crate::entry;
use crate::error::QueueError;

/// Outcome of a shard lookup, before error mapping and metrics.
pub(crate) enum LookupOutcome {
    /// The key is resident; carries an owned copy of the value.
    Hit(Vec<u8>),
    /// No map entry for the hash.
    Miss,
    /// The hash is mapped but the resident entry stores a different key.
    /// Carries the resident key for diagnostics.
    Collision(String),
    /// The stored handle was rejected by the arena.
    Broken(QueueError),
}

pub(crate) struct CacheShard {
    map: FxHashMap<u64, u32>,
    queue: ByteQueue,
    scratch: Vec<u8>,
}

impl CacheShard {
    pub(crate) fn new(
        entries_hint: usize,
        arena_capacity: usize,
        max_entry_size: usize,
        verbose: bool,
    ) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(entries_hint, Default::default()),
            queue: ByteQueue::new(arena_capacity, verbose),
            scratch: vec![0; max_entry_size + entry::HEADERS_SIZE],
        }
    }

    /// Looks up `key` under its precomputed `hash`.
    pub(crate) fn lookup(&self, key: &str, hash: u64) -> LookupOutcome {
        let handle = match self.map.get(&hash) {
            Some(&handle) => handle,
            None => return LookupOutcome::Miss,
        };

        let blob = match self.queue.get(handle as usize) {
            Ok(blob) => blob,
            Err(err) => return LookupOutcome::Broken(err),
        };

        let resident_key = entry::read_key(blob);
        if resident_key != key {
            return LookupOutcome::Collision(resident_key.to_string());
        }

        LookupOutcome::Hit(entry::read_value(blob).to_vec())
    }

    /// Inserts `key → value`, tombstoning any superseded entry and making
    /// exactly one age-gated eviction attempt. Returns `true` if an entry
    /// was evicted.
    pub(crate) fn insert(
        &mut self,
        key: &str,
        hash: u64,
        value: &[u8],
        now: u64,
        life_window: u64,
    ) -> bool {
        if let Some(&previous) = self.map.get(&hash) {
            if let Ok(previous_blob) = self.queue.get_mut(previous as usize) {
                entry::reset_hash(previous_blob);
            }
        }

        let evicted = self.evict_oldest_if_expired(now, life_window);

        let blob = entry::wrap(now, hash, key, value, &mut self.scratch);
        let handle = self.queue.push(blob);
        self.map.insert(hash, handle as u32);

        evicted
    }

    /// Considers the single oldest arena entry for eviction.
    ///
    /// Fillers and tombstones carry hash zero, so their map delete is a
    /// no-op; they still free their arena bytes when popped.
    fn evict_oldest_if_expired(&mut self, now: u64, life_window: u64) -> bool {
        let (oldest_timestamp, oldest_hash) = match self.queue.peek() {
            Ok(oldest) => (entry::read_timestamp(oldest), entry::read_hash(oldest)),
            Err(_) => return false,
        };

        if now.saturating_sub(oldest_timestamp) <= life_window {
            return false;
        }

        let _ = self.queue.pop();
        self.map.remove(&oldest_hash);
        true
    }

    /// Visits every resident entry. Entries whose handle fails to resolve
    /// are skipped.
    pub(crate) fn for_each(&self, accept: &mut dyn FnMut(&str, &[u8])) {
        for &handle in self.map.values() {
            if let Ok(blob) = self.queue.get(handle as usize) {
                accept(entry::read_key(blob), entry::read_value(blob));
            }
        }
    }

    pub(crate) fn clear(&mut self, entries_hint: usize) {
        self.queue.clear();
        self.map = FxHashMap::with_capacity_and_hasher(entries_hint, Default::default());
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn arena_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Plants a raw `hash → handle` mapping, bypassing the arena. Only for
    /// tests that exercise the corrupted-handle path.
    #[cfg(test)]
    pub(crate) fn inject_handle(&mut self, hash: u64, handle: u32) {
        self.map.insert(hash, handle);
    }
}
