//! # LRU (Least Recently Used) Cache
//!
//! Evicts the entry whose last touch lies furthest in the past. Both reads
//! (`get`, `touch`) and writes (`set`) count as a touch and move the entry to
//! the most-recent end.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────────┐
//!   │                        LruCache<K, V>                              │
//!   │                                                                    │
//!   │   map: FxHashMap<K, SlotId>                                        │
//!   │   ┌──────┬────────┐                                                │
//!   │   │ "A"  │ id_2   │───────────────────────────────┐                │
//!   │   │ "B"  │ id_0   │────────────────┐              │                │
//!   │   │ "C"  │ id_1   │───┐            │              │                │
//!   │   └──────┴────────┘   ▼            ▼              ▼                │
//!   │   list:  head ─► [C, v_c] ◄──► [B, v_b] ◄──► [A, v_a] ◄── tail     │
//!   │                    MRU                           LRU               │
//!   └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table stores [`SlotId`] handles into an
//! [`IntrusiveList`](crate::ds::IntrusiveList) rather than references, so
//! moving a node never invalidates the table. Each node carries its key so
//! the table entry can be dropped when the tail is evicted.
//!
//! ## Operations
//!
//! | Method         | Complexity | Effect on order          |
//! |----------------|------------|--------------------------|
//! | `set` (new)    | O(1)       | push front, maybe pop back |
//! | `set` (update) | O(1)       | move to front            |
//! | `get` (hit)    | O(1)       | move to front            |
//! | `peek`         | O(1)       | none                     |
//! | `remove`       | O(1)       | unlink                   |
//! | `pop_lru`      | O(1)       | pop back                 |
//! | `recency_rank` | O(n)       | none                     |
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lru::LruCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.get(&"a"); // "a" becomes most recent
//! cache.set("c", 3);
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::{IntrusiveList, SlotId};
use crate::error::{check_capacity, ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::CacheMetrics;
use crate::traits::{CoreCache, LruCacheTrait, MutableCache, ReadOnlyCache, SetOutcome};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Bounded cache with least-recently-used eviction.
pub struct LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    map: FxHashMap<K, SlotId>,
    /// Recency order, most recent at the front.
    list: IntrusiveList<Entry<K, V>>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> LruCache<K, V>
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
        tracing::debug!(policy = "lru", capacity, "cache created");
        Ok(Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            list: IntrusiveList::with_capacity(capacity),
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

    /// Looks up a value without refreshing its recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.map.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Looks up a value and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = self.map.get(key).copied();
        #[cfg(feature = "metrics")]
        self.metrics.record_get(id.is_some());
        let id = id?;
        self.list.move_to_front(id);
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Marks `key` most recently used without reading it.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.map.get(key) {
            Some(&id) => self.list.move_to_front(id),
            None => false,
        }
    }

    /// Inserts or updates a key-value pair.
    ///
    /// - Resident key: value replaced and entry moved to the front.
    /// - New key, room left: pushed to the front.
    /// - New key, cache full: the back (least recent) entry is evicted first.
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
        if let Some(&id) = self.map.get(&key) {
            self.list.move_to_front(id);
            let entry = self.list.get_mut(id).expect("map/list out of sync");
            return SetOutcome::Updated(std::mem::replace(&mut entry.value, value));
        }

        let evicted = if self.map.len() >= self.capacity {
            self.evict_lru()
        } else {
            None
        };

        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.map.insert(key, id);

        match evicted {
            Some((key, value)) => SetOutcome::Evicted { key, value },
            None => SetOutcome::Inserted,
        }
    }

    fn evict_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.pop_back()?;
        self.map.remove(&entry.key).expect("map/list out of sync");
        #[cfg(feature = "tracing")]
        tracing::trace!(policy = "lru", len = self.map.len(), "evicted least recent entry");
        Some((entry.key, entry.value))
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.map.remove(key)?;
        let entry = self.list.remove(id).expect("map/list out of sync");
        Some(entry.value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let popped = self.evict_lru();
        #[cfg(feature = "metrics")]
        {
            if popped.is_some() {
                self.metrics.evictions += 1;
            }
        }
        popped
    }

    /// Returns the least recently used entry, the next eviction victim.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Position of `key` in recency order (0 = most recent).
    pub fn recency_rank(&self, key: &K) -> Option<usize> {
        if !self.map.contains_key(key) {
            return None;
        }
        self.list.iter().position(|entry| &entry.key == key)
    }

    /// Snapshot of resident entries, most recently used first.
    pub fn entries(&self) -> Vec<(&K, &V)> {
        self.list
            .iter()
            .map(|entry| (&entry.key, &entry.value))
            .collect()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
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

    /// Verifies that the table and the recency list agree on membership and
    /// that the list is well linked.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "table holds {} keys but list holds {}",
                self.map.len(),
                self.list.len()
            )));
        }
        if self.map.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                self.map.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.map {
            match self.list.get(id) {
                Some(entry) if &entry.key == key => {},
                Some(_) => {
                    return Err(InvariantError::new(format!(
                        "table slot {:?} points at a node for another key",
                        id
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!("table holds stale slot {:?}", id)));
                },
            }
        }
        self.list.check_links()
    }
}

impl<K, V> std::fmt::Debug for LruCache<K, V>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let order: Vec<&K> = self.list.iter().map(|entry| &entry.key).collect();
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .field("order", &order)
            .finish_non_exhaustive()
    }
}

impl<K, V> ReadOnlyCache<K, V> for LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn contains(&self, key: &K) -> bool {
        LruCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        LruCache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn peek(&self, key: &K) -> Option<&V> {
        LruCache::peek(self, key)
    }
}

impl<K, V> CoreCache<K, V> for LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        LruCache::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    fn clear(&mut self) {
        LruCache::clear(self);
    }
}

impl<K, V> MutableCache<K, V> for LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        LruCache::remove(self, key)
    }
}

impl<K, V> LruCacheTrait<K, V> for LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        LruCache::pop_lru(self)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        LruCache::peek_lru(self)
    }

    fn touch(&mut self, key: &K) -> bool {
        LruCache::touch(self, key)
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        LruCache::recency_rank(self, key)
    }
}
