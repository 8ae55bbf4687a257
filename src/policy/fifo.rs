//! # FIFO (First In, First Out) Cache
//!
//! Evicts the entry that was inserted first. Reads never change the order
//! and neither do repeated writes to a resident key: a key's place in line
//! is fixed the moment it is first admitted.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                     FifoCache<K, V>                          │
//!   │                                                              │
//!   │   map: FxHashMap<K, V>          queue: VecDeque<K>           │
//!   │   ┌──────┬───────┐              front              back      │
//!   │   │ "A"  │  v_a  │               │                  │        │
//!   │   │ "B"  │  v_b  │               ▼                  ▼        │
//!   │   │ "C"  │  v_c  │              [A] ─ [B] ─ [C]              │
//!   │   └──────┴───────┘             oldest          newest        │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `map` and `queue` always hold the same key set. FIFO never removes an
//! arbitrary key, so the queue never contains stale entries and eviction is
//! a single `pop_front`.
//!
//! ## Operations
//!
//! | Method         | Complexity | Effect on order             |
//! |----------------|------------|-----------------------------|
//! | `set` (new)    | O(1)       | push back, maybe pop front  |
//! | `set` (update) | O(1)       | none                        |
//! | `get`          | O(1)       | none                        |
//! | `pop_oldest`   | O(1)       | pop front                   |
//! | `age_rank`     | O(n)       | none                        |
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::fifo::FifoCache;
//!
//! let mut cache = FifoCache::new(2);
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.get(&"a"); // reads do not protect "a"
//! cache.set("c", 3);
//!
//! assert!(!cache.contains(&"a"));
//! assert!(cache.contains(&"b"));
//! assert!(cache.contains(&"c"));
//! ```

use std::collections::VecDeque;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::{check_capacity, ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::CacheMetrics;
use crate::traits::{CoreCache, FifoCacheTrait, ReadOnlyCache, SetOutcome};

/// Bounded cache with insertion-order eviction.
pub struct FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    map: FxHashMap<K, V>,
    /// Keys in insertion order, oldest at the front.
    queue: VecDeque<K>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates an empty cache, rejecting a zero capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        let capacity = check_capacity(capacity)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(policy = "fifo", capacity, "cache created");
        Ok(Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            queue: VecDeque::with_capacity(capacity),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::default(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Looks up a value. FIFO order is unaffected by reads, so this is the
    /// same as [`get`](Self::get) minus the hit/miss accounting.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Looks up a value without changing eviction order.
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<&V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_get(self.map.contains_key(key));
        self.map.get(key)
    }

    /// Inserts or updates a key-value pair.
    ///
    /// - Resident key: value replaced in place, queue position unchanged.
    /// - New key, room left: appended to the back.
    /// - New key, cache full: the front (oldest) entry is evicted first.
    pub fn insert(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        let outcome = self.insert_inner(key, value);
        #[cfg(feature = "metrics")]
        self.metrics.record_set(&outcome);
        outcome
    }

    /// Inserts or updates; returns `true` if a new slot was consumed.
    #[inline]
    pub fn set(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).consumed_slot()
    }

    fn insert_inner(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        if let Some(slot) = self.map.get_mut(&key) {
            return SetOutcome::Updated(std::mem::replace(slot, value));
        }

        let evicted = if self.map.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        self.queue.push_back(key.clone());
        self.map.insert(key, value);

        match evicted {
            Some((key, value)) => SetOutcome::Evicted { key, value },
            None => SetOutcome::Inserted,
        }
    }

    fn evict_oldest(&mut self) -> Option<(K, V)> {
        let key = self.queue.pop_front()?;
        let value = self.map.remove(&key).expect("queue/table out of sync");
        #[cfg(feature = "tracing")]
        tracing::trace!(policy = "fifo", len = self.map.len(), "evicted oldest entry");
        Some((key, value))
    }

    /// Removes and returns the oldest entry.
    pub fn pop_oldest(&mut self) -> Option<(K, V)> {
        let popped = self.evict_oldest();
        #[cfg(feature = "metrics")]
        {
            if popped.is_some() {
                self.metrics.evictions += 1;
            }
        }
        popped
    }

    /// Returns the oldest entry, the one the next overflow will evict.
    pub fn peek_oldest(&self) -> Option<(&K, &V)> {
        let key = self.queue.front()?;
        self.map.get(key).map(|value| (key, value))
    }

    /// Position of `key` in insertion order (0 = oldest).
    pub fn age_rank(&self, key: &K) -> Option<usize> {
        self.queue.iter().position(|k| k == key)
    }

    /// Snapshot of resident entries, oldest first.
    pub fn entries(&self) -> Vec<(&K, &V)> {
        self.queue
            .iter()
            .map(|key| (key, self.map.get(key).expect("queue/table out of sync")))
            .collect()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.queue.clear();
    }

    /// Returns the counters recorded so far.
    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Resets all counters to zero.
    #[cfg(feature = "metrics")]
    pub fn reset_metrics(&mut self) {
        self.metrics = CacheMetrics::default();
    }

    /// Verifies that the table and the queue agree on membership.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() != self.queue.len() {
            return Err(InvariantError::new(format!(
                "table holds {} keys but queue holds {}",
                self.map.len(),
                self.queue.len()
            )));
        }
        if self.map.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                self.map.len(),
                self.capacity
            )));
        }
        // Equal lengths plus every queued key resident implies no duplicates.
        if self.queue.iter().any(|key| !self.map.contains_key(key)) {
            return Err(InvariantError::new("queue holds a key missing from the table"));
        }
        Ok(())
    }
}

impl<K, V> std::fmt::Debug for FifoCache<K, V>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoCache")
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl<K, V> ReadOnlyCache<K, V> for FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn contains(&self, key: &K) -> bool {
        FifoCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        FifoCache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn peek(&self, key: &K) -> Option<&V> {
        FifoCache::peek(self, key)
    }
}

impl<K, V> CoreCache<K, V> for FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        FifoCache::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        FifoCache::get(self, key)
    }

    fn clear(&mut self) {
        FifoCache::clear(self);
    }
}

impl<K, V> FifoCacheTrait<K, V> for FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn pop_oldest(&mut self) -> Option<(K, V)> {
        FifoCache::pop_oldest(self)
    }

    fn peek_oldest(&self) -> Option<(&K, &V)> {
        FifoCache::peek_oldest(self)
    }

    fn age_rank(&self, key: &K) -> Option<usize> {
        FifoCache::age_rank(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<V>(cache: &FifoCache<&'static str, V>) -> Vec<&'static str> {
        cache.entries().into_iter().map(|(k, _)| *k).collect()
    }

    // ==============================================
    // Basic Operations
    // ==============================================

    mod basic_operations {
        use super::*;

        #[test]
        fn new_cache_is_empty() {
            let cache: FifoCache<&str, i32> = FifoCache::new(100);
            assert!(cache.is_empty());
            assert_eq!(cache.len(), 0);
            assert_eq!(cache.capacity(), 100);
        }

        #[test]
        fn set_reports_new_slot() {
            let mut cache = FifoCache::new(4);
            assert!(cache.set("a", 1));
            assert!(!cache.set("a", 2));
            assert_eq!(cache.get(&"a"), Some(&2));
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn get_missing_key_returns_none() {
            let mut cache: FifoCache<&str, i32> = FifoCache::new(4);
            cache.set("a", 1);
            assert_eq!(cache.get(&"missing"), None);
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn insert_reports_outcomes() {
            let mut cache = FifoCache::new(1);
            assert_eq!(cache.insert("a", 1), SetOutcome::Inserted);
            assert_eq!(cache.insert("a", 2), SetOutcome::Updated(1));
            assert_eq!(
                cache.insert("b", 3),
                SetOutcome::Evicted { key: "a", value: 2 }
            );
        }

        #[test]
        fn clear_removes_all_entries() {
            let mut cache = FifoCache::new(4);
            cache.set("a", 1);
            cache.set("b", 2);
            cache.clear();
            assert!(cache.is_empty());
            assert!(cache.peek_oldest().is_none());
            cache.check_invariants().unwrap();
        }
    }

    // ==============================================
    // FIFO Ordering
    // ==============================================

    mod fifo_behavior {
        use super::*;

        #[test]
        fn reads_do_not_protect_entries() {
            let mut cache = FifoCache::new(4);
            for key in ["A", "B", "C", "D", "E"] {
                cache.set(key, key);
            }
            assert!(!cache.contains(&"A"));

            assert_eq!(cache.get(&"D"), Some(&"D"));
            cache.set("F", "F");

            assert_eq!(keys(&cache), vec!["C", "D", "E", "F"]);
            assert!(!cache.contains(&"B"));
        }

        #[test]
        fn update_keeps_queue_position() {
            let mut cache = FifoCache::new(3);
            cache.set("a", 1);
            cache.set("b", 2);
            cache.set("c", 3);

            cache.set("a", 10);
            assert_eq!(cache.age_rank(&"a"), Some(0));

            cache.set("d", 4);
            assert!(!cache.contains(&"a"), "update must not refresh FIFO order");
            assert_eq!(keys(&cache), vec!["b", "c", "d"]);
        }

        #[test]
        fn peek_oldest_is_next_victim() {
            let mut cache = FifoCache::new(2);
            cache.set(1, "one");
            cache.set(2, "two");
            assert_eq!(cache.peek_oldest(), Some((&1, &"one")));

            let evicted = cache.insert(3, "three").into_evicted();
            assert_eq!(evicted, Some((1, "one")));
            assert_eq!(cache.peek_oldest(), Some((&2, &"two")));
        }

        #[test]
        fn pop_oldest_drains_in_insertion_order() {
            let mut cache = FifoCache::new(3);
            cache.set("x", 1);
            cache.set("y", 2);
            cache.set("z", 3);

            assert_eq!(cache.pop_oldest(), Some(("x", 1)));
            assert_eq!(cache.pop_oldest(), Some(("y", 2)));
            assert_eq!(cache.pop_oldest(), Some(("z", 3)));
            assert_eq!(cache.pop_oldest(), None);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn age_rank_counts_from_oldest() {
            let mut cache = FifoCache::new(3);
            cache.set("a", 1);
            cache.set("b", 2);
            assert_eq!(cache.age_rank(&"a"), Some(0));
            assert_eq!(cache.age_rank(&"b"), Some(1));
            assert_eq!(cache.age_rank(&"zz"), None);
        }
    }

    // ==============================================
    // Edge Cases
    // ==============================================

    mod edge_cases {
        use super::*;

        #[test]
        fn single_capacity_cache() {
            let mut cache = FifoCache::new(1);
            for _ in 0..5 {
                assert!(!cache.insert("a", 1).is_eviction());
            }
            assert_eq!(cache.len(), 1);

            assert!(cache.insert("b", 2).is_eviction());
            assert!(!cache.contains(&"a"));
            assert_eq!(cache.get(&"b"), Some(&2));
        }

        #[test]
        fn repeated_set_of_single_key_never_evicts() {
            let mut cache = FifoCache::new(1);
            cache.set("only", 0);
            for i in 1..10 {
                assert_eq!(cache.insert("only", i), SetOutcome::Updated(i - 1));
            }
        }

        #[test]
        fn zero_capacity_is_rejected() {
            let err = FifoCache::<u32, u32>::try_new(0).unwrap_err();
            assert!(err.message().contains("capacity"));
        }

        #[test]
        #[should_panic(expected = "capacity")]
        fn zero_capacity_panics_in_new() {
            let _ = FifoCache::<u32, u32>::new(0);
        }

        #[test]
        fn string_keys_and_values() {
            let mut cache = FifoCache::new(8);
            cache.set(String::from("hello"), String::from("world"));
            assert_eq!(
                cache.get(&String::from("hello")),
                Some(&String::from("world"))
            );
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn counts_hits_misses_and_evictions() {
            let mut cache = FifoCache::new(2);
            cache.set(1, 1);
            cache.set(2, 2);
            cache.set(2, 20);
            cache.set(3, 3);
            cache.get(&1);
            cache.get(&3);

            let m = cache.metrics();
            assert_eq!(m.inserts, 3);
            assert_eq!(m.updates, 1);
            assert_eq!(m.evictions, 1);
            assert_eq!(m.hits, 1);
            assert_eq!(m.misses, 1);

            cache.reset_metrics();
            assert_eq!(*cache.metrics(), CacheMetrics::default());
        }
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    proptest! {
        /// len() never exceeds capacity and table/queue stay in sync.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_len_within_capacity(
            capacity in 1usize..32,
            ops in prop::collection::vec((0u32..64, 0u32..100, any::<bool>()), 0..200)
        ) {
            let mut cache = FifoCache::new(capacity);
            for (key, value, is_read) in ops {
                if is_read {
                    cache.get(&key);
                } else {
                    cache.set(key, value);
                }
                prop_assert!(cache.len() <= cache.capacity());
                prop_assert!(cache.check_invariants().is_ok());
            }
        }

        /// Eviction victims follow a reference FIFO model exactly.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_reference_model(
            capacity in 1usize..16,
            ops in prop::collection::vec((0u32..32, any::<bool>()), 0..200)
        ) {
            let mut cache = FifoCache::new(capacity);
            let mut model: VecDeque<u32> = VecDeque::new();

            for (key, is_read) in ops {
                if is_read {
                    prop_assert_eq!(cache.get(&key).is_some(), model.contains(&key));
                    continue;
                }
                let outcome = cache.insert(key, key);
                if model.contains(&key) {
                    prop_assert!(!outcome.consumed_slot());
                } else {
                    let expected = if model.len() == capacity { model.pop_front() } else { None };
                    model.push_back(key);
                    prop_assert_eq!(outcome.into_evicted().map(|(k, _)| k), expected);
                }
            }

            let resident: Vec<u32> = cache.entries().into_iter().map(|(k, _)| *k).collect();
            prop_assert_eq!(resident, model.into_iter().collect::<Vec<_>>());
        }

        /// A miss never changes membership or order.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_miss_is_idempotent(
            capacity in 1usize..16,
            keys in prop::collection::vec(0u32..32, 0..64),
            probe in 100u32..200
        ) {
            let mut cache = FifoCache::new(capacity);
            for key in keys {
                cache.set(key, key);
            }
            let before: Vec<u32> = cache.entries().into_iter().map(|(k, _)| *k).collect();
            prop_assert!(cache.get(&probe).is_none());
            let after: Vec<u32> = cache.entries().into_iter().map(|(k, _)| *k).collect();
            prop_assert_eq!(before, after);
        }
    }
}
