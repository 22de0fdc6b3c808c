//! Seconds-granularity clock abstraction.
//!
//! The cache only needs a monotonically non-decreasing epoch-seconds reading
//! to stamp entries and age the eviction head; wall-clock precision beyond
//! one second is irrelevant to the life-window policy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of epoch timestamps at seconds granularity.
///
/// Implementations must be monotonically non-decreasing: a later call never
/// observes a smaller value than an earlier one.
pub trait Clock: Send + Sync {
    /// Returns seconds elapsed since the Unix epoch.
    fn epoch_seconds(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn epoch_seconds(&self) -> u64 {
        (**self).epoch_seconds()
    }
}

/// System wall clock truncated to whole seconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}

/// Manually advanced clock for deterministic tests and benchmarks.
///
/// # Example
///
/// ```
/// use bytecache::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(100);
/// assert_eq!(clock.epoch_seconds(), 100);
///
/// clock.advance(5);
/// assert_eq!(clock.epoch_seconds(), 105);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reading `epoch_seconds`.
    pub fn new(epoch_seconds: u64) -> Self {
        Self {
            now: AtomicU64::new(epoch_seconds),
        }
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::Relaxed);
    }

    /// Sets the clock to an absolute reading.
    pub fn set(&self, epoch_seconds: u64) {
        self.now.store(epoch_seconds, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn epoch_seconds(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}
