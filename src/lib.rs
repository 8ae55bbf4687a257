//! evictkit: bounded in-memory caches with pluggable eviction policies.
//!
//! Four policies share one contract. A cache holds at most `capacity`
//! entries; admitting a new key into a full cache evicts exactly one
//! resident entry chosen by the policy.
//!
//! | Policy                             | Evicts                                 |
//! |------------------------------------|----------------------------------------|
//! | [`FifoCache`](policy::fifo::FifoCache) | the oldest insertion               |
//! | [`LruCache`](policy::lru::LruCache)    | the least recently used entry      |
//! | [`LfuCache`](policy::lfu::LfuCache)    | the entry with the fewest hits     |
//! | [`LrfuCache`](policy::lrfu::LrfuCache) | fewest hits, least recent on ties  |
//!
//! ```
//! use evictkit::prelude::*;
//!
//! let mut cache = LruCache::new(2);
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.get(&"a");
//! cache.set("c", 3);
//! assert!(!cache.contains(&"b"));
//! ```
//!
//! Storage is arena-backed: entries live in a [`SlotArena`](ds::SlotArena)
//! and ordering structures refer to them by [`SlotId`](ds::SlotId).
//!
//! ## Features
//!
//! - `metrics`: per-cache hit, miss and eviction counters.
//! - `tracing`: `tracing` events on construction and eviction.

pub mod builder;
pub mod ds;
pub mod error;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod traits;

pub use builder::{Cache, CacheBuilder, CachePolicy};
pub use error::{ConfigError, InvariantError};
pub use traits::SetOutcome;
