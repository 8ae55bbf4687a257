//! Unified cache builder for all eviction policies.
//!
//! Lets callers pick a policy at runtime and drive it through one type.
//!
//! ## Example
//!
//! ```rust
//! use evictkit::builder::{CacheBuilder, CachePolicy};
//!
//! let mut cache = CacheBuilder::new(100).build::<u64, String>(CachePolicy::Lru);
//! cache.set(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::fifo::FifoCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lrfu::LrfuCache;
use crate::policy::lru::LruCache;
use crate::traits::SetOutcome;

/// Available cache eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    /// First In, First Out eviction.
    Fifo,
    /// Least Recently Used eviction.
    Lru,
    /// Least Frequently Used eviction.
    Lfu,
    /// Least Frequently Used eviction, ties broken by recency.
    Lrfu,
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CachePolicy::Fifo => "fifo",
            CachePolicy::Lru => "lru",
            CachePolicy::Lfu => "lfu",
            CachePolicy::Lrfu => "lrfu",
        };
        f.write_str(name)
    }
}

/// Unified cache wrapper that provides a consistent API regardless of policy.
pub struct Cache<K, V>
where
    K: Clone + Eq + Hash,
{
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V>
where
    K: Clone + Eq + Hash,
{
    Fifo(FifoCache<K, V>),
    Lru(LruCache<K, V>),
    Lfu(LfuCache<K, V>),
    Lrfu(LrfuCache<K, V>),
}

impl<K, V> Cache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Insert or update a key-value pair, reporting what happened.
    pub fn insert(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        match &mut self.inner {
            CacheInner::Fifo(fifo) => fifo.insert(key, value),
            CacheInner::Lru(lru) => lru.insert(key, value),
            CacheInner::Lfu(lfu) => lfu.insert(key, value),
            CacheInner::Lrfu(lrfu) => lrfu.insert(key, value),
        }
    }

    /// Insert or update; returns `true` if a new slot was consumed.
    pub fn set(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).consumed_slot()
    }

    /// Get a reference to a value by key, counting as a use.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match &mut self.inner {
            CacheInner::Fifo(fifo) => fifo.get(key),
            CacheInner::Lru(lru) => lru.get(key),
            CacheInner::Lfu(lfu) => lfu.get(key),
            CacheInner::Lrfu(lrfu) => lrfu.get(key),
        }
    }

    /// Get a reference to a value by key without counting as a use.
    pub fn peek(&self, key: &K) -> Option<&V> {
        match &self.inner {
            CacheInner::Fifo(fifo) => fifo.peek(key),
            CacheInner::Lru(lru) => lru.peek(key),
            CacheInner::Lfu(lfu) => lfu.peek(key),
            CacheInner::Lrfu(lrfu) => lrfu.peek(key),
        }
    }

    /// Check if a key exists.
    pub fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::Fifo(fifo) => fifo.contains(key),
            CacheInner::Lru(lru) => lru.contains(key),
            CacheInner::Lfu(lfu) => lfu.contains(key),
            CacheInner::Lrfu(lrfu) => lrfu.contains(key),
        }
    }

    /// Return the number of entries.
    pub fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Fifo(fifo) => fifo.len(),
            CacheInner::Lru(lru) => lru.len(),
            CacheInner::Lfu(lfu) => lfu.len(),
            CacheInner::Lrfu(lrfu) => lrfu.len(),
        }
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the maximum capacity.
    pub fn capacity(&self) -> usize {
        match &self.inner {
            CacheInner::Fifo(fifo) => fifo.capacity(),
            CacheInner::Lru(lru) => lru.capacity(),
            CacheInner::Lfu(lfu) => lfu.capacity(),
            CacheInner::Lrfu(lrfu) => lrfu.capacity(),
        }
    }

    /// Clear all entries.
    pub fn clear(&mut self) {
        match &mut self.inner {
            CacheInner::Fifo(fifo) => fifo.clear(),
            CacheInner::Lru(lru) => lru.clear(),
            CacheInner::Lfu(lfu) => lfu.clear(),
            CacheInner::Lrfu(lrfu) => lrfu.clear(),
        }
    }

    /// The policy this cache was built with.
    pub fn policy(&self) -> CachePolicy {
        match &self.inner {
            CacheInner::Fifo(_) => CachePolicy::Fifo,
            CacheInner::Lru(_) => CachePolicy::Lru,
            CacheInner::Lfu(_) => CachePolicy::Lfu,
            CacheInner::Lrfu(_) => CachePolicy::Lrfu,
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("policy", &self.policy())
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

/// Builder for creating cache instances.
#[derive(Debug, Clone, Copy)]
pub struct CacheBuilder {
    capacity: usize,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Build a cache with the specified policy.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is zero. See [`try_build`](Self::try_build).
    ///
    /// # Example
    ///
    /// ```rust
    /// use evictkit::builder::{CacheBuilder, CachePolicy};
    ///
    /// let lfu = CacheBuilder::new(100).build::<u64, String>(CachePolicy::Lfu);
    /// let lrfu = CacheBuilder::new(100).build::<u64, String>(CachePolicy::Lrfu);
    /// assert_eq!(lfu.capacity(), lrfu.capacity());
    /// ```
    pub fn build<K, V>(self, policy: CachePolicy) -> Cache<K, V>
    where
        K: Clone + Eq + Hash,
    {
        match self.try_build(policy) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Build a cache with the specified policy, rejecting a zero capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the capacity is zero.
    pub fn try_build<K, V>(self, policy: CachePolicy) -> Result<Cache<K, V>, ConfigError>
    where
        K: Clone + Eq + Hash,
    {
        let inner = match policy {
            CachePolicy::Fifo => CacheInner::Fifo(FifoCache::try_new(self.capacity)?),
            CachePolicy::Lru => CacheInner::Lru(LruCache::try_new(self.capacity)?),
            CachePolicy::Lfu => CacheInner::Lfu(LfuCache::try_new(self.capacity)?),
            CachePolicy::Lrfu => CacheInner::Lrfu(LrfuCache::try_new(self.capacity)?),
        };
        Ok(Cache { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CachePolicy; 4] = [
        CachePolicy::Fifo,
        CachePolicy::Lru,
        CachePolicy::Lfu,
        CachePolicy::Lrfu,
    ];

    #[test]
    fn test_all_policies_basic_ops() {
        for policy in ALL {
            let mut cache = CacheBuilder::new(10).build::<u64, String>(policy);
            assert_eq!(cache.policy(), policy);
            assert!(cache.is_empty());

            assert!(cache.set(1, "one".to_string()));
            assert!(cache.set(2, "two".to_string()));
            assert_eq!(cache.len(), 2);
            assert_eq!(cache.get(&1), Some(&"one".to_string()));
            assert_eq!(cache.peek(&2), Some(&"two".to_string()));

            assert_eq!(
                cache.insert(1, "uno".to_string()),
                SetOutcome::Updated("one".to_string()),
                "{policy}"
            );
            assert_eq!(cache.len(), 2);

            cache.clear();
            assert!(cache.is_empty());
            assert!(!cache.contains(&1));
        }
    }

    #[test]
    fn test_capacity_is_enforced() {
        for policy in ALL {
            let mut cache = CacheBuilder::new(3).build::<u32, u32>(policy);
            for i in 0..10 {
                cache.set(i, i);
            }
            assert_eq!(cache.len(), 3, "{policy}");
            assert_eq!(cache.capacity(), 3);
        }
    }

    #[test]
    fn test_dispatch_reaches_policy() {
        // After A, B, read A, C: FIFO drops A, the others drop B.
        for policy in ALL {
            let mut cache = CacheBuilder::new(2).build::<&str, i32>(policy);
            cache.set("a", 1);
            cache.set("b", 2);
            cache.get(&"a");
            let evicted = cache.insert("c", 3).into_evicted().map(|(k, _)| k);
            let expected = if policy == CachePolicy::Fifo { "a" } else { "b" };
            assert_eq!(evicted, Some(expected), "{policy}");
        }
    }

    #[test]
    fn test_zero_capacity() {
        for policy in ALL {
            let err = CacheBuilder::new(0)
                .try_build::<u8, u8>(policy)
                .unwrap_err();
            assert!(err.message().contains("capacity"));
        }
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn test_build_panics_on_zero_capacity() {
        let _ = CacheBuilder::new(0).build::<u8, u8>(CachePolicy::Lru);
    }

    #[test]
    fn test_policy_display() {
        let names: Vec<String> = ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["fifo", "lru", "lfu", "lrfu"]);
    }
}
