pub use crate::builder::{CacheBuilder, Config};
pub use crate::cache::ShardedCache;
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::ds::ByteQueue;
pub use crate::error::{CacheError, ConfigError, QueueError};
pub use crate::hasher::{Fnv1a64, KeyHasher};
pub use crate::metrics::CacheMetricsSnapshot;
