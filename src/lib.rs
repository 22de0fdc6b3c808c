//! bytecache: a sharded byte-arena cache for very large entry counts.
//!
//! Entry payloads live in a handful of contiguous per-shard buffers instead
//! of individual heap boxes, so resident-entry count has no effect on heap
//! topology: the process carries O(shards) long-lived allocations whether
//! the cache holds a thousand entries or a hundred million. Values are
//! opaque byte slices; serialize in front of the cache.
//!
//! Eviction is FIFO by arrival, gated by an age window, paid for one entry
//! at a time on the write path. There is no per-entry TTL and no explicit
//! delete; entries leave through eviction or [`ShardedCache::clear`].
//!
//! ```
//! use std::time::Duration;
//!
//! use bytecache::prelude::*;
//!
//! let cache = CacheBuilder::new()
//!     .shards(1024)
//!     .life_window(Duration::from_secs(300))
//!     .try_build()
//!     .unwrap();
//!
//! cache.set("user:1", b"serialized profile");
//! assert_eq!(cache.get("user:1").unwrap(), b"serialized profile");
//! ```
//!
//! [`ShardedCache::clear`]: crate::cache::ShardedCache::clear

pub mod builder;
pub mod cache;
pub mod clock;
pub mod ds;
pub mod error;
pub mod hasher;
pub mod metrics;
pub mod prelude;

mod entry;
mod shard;
