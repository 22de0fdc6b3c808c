//! Cache configuration and builder.
//!
//! [`Config`] is a plain options struct; [`CacheBuilder`] is the fluent way
//! to produce one and construct the cache in a single expression. Both end
//! in the same validation: shard counts must be a power of two so routing
//! can mask instead of divide.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//!
//! use bytecache::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new()
//!     .shards(512)
//!     .life_window(Duration::from_secs(600))
//!     .max_entries_in_window(1_000_000)
//!     .max_entry_size(500)
//!     .try_build()
//!     .unwrap();
//!
//! cache.set("greeting", b"hello");
//! assert_eq!(cache.get("greeting").unwrap(), b"hello");
//! ```

use std::time::Duration;

use crate::cache::ShardedCache;
use crate::clock::{Clock, SystemClock};
use crate::error::ConfigError;
use crate::hasher::KeyHasher;

/// Cache configuration.
///
/// All fields are public; [`Config::default`] gives a setup sized for a
/// large working set (1024 shards, ten-minute life window, 600k entries in
/// window, 500-byte typical entries).
pub struct Config {
    /// Number of shards. Must be a power of two.
    pub shards: usize,
    /// Age after which an entry may be evicted on a subsequent write to its
    /// shard. Truncated to whole seconds.
    pub life_window: Duration,
    /// Expected number of entries inside one life window; sizing hint only.
    /// Per-shard capacity is `max(this / shards, 10)`.
    pub max_entries_in_window: usize,
    /// Expected upper bound on one entry's size in bytes; sizes each
    /// shard's initial arena. Larger entries still fit via arena growth.
    pub max_entry_size: usize,
    /// Emit `tracing` diagnostics on arena growth and hash collisions.
    pub verbose: bool,
    /// Key hasher. `None` installs the default FNV-1a 64.
    pub hasher: Option<Box<dyn KeyHasher>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shards: 1024,
            life_window: Duration::from_secs(600),
            max_entries_in_window: 600_000,
            max_entry_size: 500,
            verbose: false,
            hasher: None,
        }
    }
}

/// Fluent builder for [`ShardedCache`].
pub struct CacheBuilder {
    config: Config,
    clock: Box<dyn Clock>,
}

impl CacheBuilder {
    /// Starts from [`Config::default`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            clock: Box::new(SystemClock),
        }
    }

    /// Sets the shard count. Must be a power of two.
    pub fn shards(mut self, shards: usize) -> Self {
        self.config.shards = shards;
        self
    }

    /// Sets the eviction life window.
    pub fn life_window(mut self, life_window: Duration) -> Self {
        self.config.life_window = life_window;
        self
    }

    /// Sets the expected entry count within one life window.
    pub fn max_entries_in_window(mut self, entries: usize) -> Self {
        self.config.max_entries_in_window = entries;
        self
    }

    /// Sets the expected maximum entry size in bytes.
    pub fn max_entry_size(mut self, bytes: usize) -> Self {
        self.config.max_entry_size = bytes;
        self
    }

    /// Enables growth and collision diagnostics via `tracing`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Installs a custom key hasher.
    pub fn hasher(mut self, hasher: impl KeyHasher + 'static) -> Self {
        self.config.hasher = Some(Box::new(hasher));
        self
    }

    /// Installs a custom clock. Intended for deterministic tests and
    /// benchmarks; production callers keep the default system clock.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Validates the configuration and constructs the cache.
    pub fn try_build(self) -> Result<ShardedCache, ConfigError> {
        ShardedCache::with_clock(self.config, self.clock)
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
