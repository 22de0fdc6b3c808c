//! Error types for the bytecache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. shard count not a power of two, zero entry size).
//! - [`QueueError`]: Returned by [`ByteQueue`](crate::ds::ByteQueue) operations
//!   on an empty queue or an invalid handle.
//! - [`CacheError`]: Returned by [`ShardedCache::get`](crate::cache::ShardedCache::get)
//!   for absent keys, hash collisions, and propagated queue failures.
//!
//! ## Example Usage
//!
//! ```
//! use bytecache::builder::CacheBuilder;
//!
//! // Fallible constructor for user-configurable parameters
//! let cache = CacheBuilder::new().shards(256).try_build();
//! assert!(cache.is_ok());
//!
//! // Shard counts that are not a power of two are caught without panicking
//! let bad = CacheBuilder::new().shards(100).try_build();
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`ShardedCache::new`](crate::cache::ShardedCache::new) and
/// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// QueueError
// ---------------------------------------------------------------------------

/// Error returned by [`ByteQueue`](crate::ds::ByteQueue) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// `pop` or `peek` was called on a queue with no live entries.
    Empty,
    /// `get` or `get_mut` was called with a handle outside the live region.
    InvalidIndex,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Empty => f.write_str("empty queue"),
            QueueError::InvalidIndex => f.write_str("invalid queue index"),
        }
    }
}

impl std::error::Error for QueueError {}

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Error returned by cache lookups.
///
/// `NotFound` covers both genuinely absent keys and 64-bit hash collisions
/// (a resident entry whose stored key differs from the requested one). Queue
/// failures observed while resolving a handle propagate as `Queue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// No entry for the key. Carries the requested key for diagnostics.
    NotFound(String),
    /// The shard's queue rejected the stored handle.
    Queue(QueueError),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::NotFound(key) => write!(f, "entry not found for key {key:?}"),
            CacheError::Queue(err) => write!(f, "queue error: {err}"),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::NotFound(_) => None,
            CacheError::Queue(err) => Some(err),
        }
    }
}

impl From<QueueError> for CacheError {
    fn from(err: QueueError) -> Self {
        CacheError::Queue(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
