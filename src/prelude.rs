pub use crate::builder::{Cache, CacheBuilder, CachePolicy};
pub use crate::ds::{IndexedMinHeap, IntrusiveList, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::CacheMetrics;
pub use crate::policy::fifo::FifoCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lrfu::{LrfuCache, LrfuPriority};
pub use crate::policy::lru::LruCache;
pub use crate::traits::{
    CoreCache, FifoCacheTrait, LfuCacheTrait, LruCacheTrait, MutableCache, ReadOnlyCache,
    SetOutcome,
};
