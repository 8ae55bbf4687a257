//! # LFU (Least Frequently Used) Cache
//!
//! Evicts the entry with the smallest hit count. Entries live in a
//! [`SlotArena`]; an [`IndexedMinHeap`] keyed by hit count orders their
//! `SlotId`s, and the table maps keys to the same `SlotId`s.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LfuCache<K, V>                              │
//!   │                                                                      │
//!   │   map: FxHashMap<K, SlotId>       arena: SlotArena<Entry<K, V>>      │
//!   │   ┌──────┬───────┐                ┌───────┬────────────────┐         │
//!   │   │ "A"  │ id_0  │ ─────────────► │ id_0  │ ("A", v_a)     │         │
//!   │   │ "B"  │ id_1  │ ─────────────► │ id_1  │ ("B", v_b)     │         │
//!   │   │ "C"  │ id_2  │ ─────────────► │ id_2  │ ("C", v_c)     │         │
//!   │   └──────┴───────┘                └───────┴────────────────┘         │
//!   │                                                                      │
//!   │   heap: IndexedMinHeap<u64>   (hit count → SlotId)                   │
//!   │                   (1, id_1)  ◄── next victim                         │
//!   │                  /         \                                         │
//!   │            (4, id_0)     (2, id_2)                                   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Hit Counting
//!
//! | Event                 | Hit count            |
//! |-----------------------|----------------------|
//! | `set` of a new key    | 1                    |
//! | `set` of resident key | reset to 1           |
//! | `get` hit             | +1                   |
//! | `get` miss / `peek`   | unchanged            |
//!
//! A write is treated as a fresh access, so it resets the count instead of
//! adding to it.
//!
//! ## Eviction
//!
//! When a new key arrives at a full cache, the heap root's slot is
//! recycled: its old key leaves the table, the slot takes the new key and
//! value with a hit count of 1, and the heap re-sifts from the root. The
//! table and heap never hold a dangling slot in between.
//!
//! Among entries sharing the minimum hit count the choice of victim is
//! **unspecified**; it depends on the heap's internal layout. Use
//! [`LrfuCache`](crate::policy::lrfu::LrfuCache) when ties must resolve
//! deterministically.
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lfu::LfuCache;
//!
//! let mut cache = LfuCache::new(2);
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.get(&"a");
//! cache.get(&"a");
//! cache.set("c", 3); // "b" has the fewest hits
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.frequency(&"a"), Some(3));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::{IndexedMinHeap, SlotArena, SlotId};
use crate::error::{check_capacity, ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::CacheMetrics;
use crate::traits::{CoreCache, LfuCacheTrait, MutableCache, ReadOnlyCache, SetOutcome};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Bounded cache with least-frequently-used eviction.
pub struct LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    map: FxHashMap<K, SlotId>,
    arena: SlotArena<Entry<K, V>>,
    heap: IndexedMinHeap<u64>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> LfuCache<K, V>
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
        tracing::debug!(policy = "lfu", capacity, "cache created");
        Ok(Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            arena: SlotArena::with_capacity(capacity),
            heap: IndexedMinHeap::with_capacity(capacity),
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

    /// Looks up a value without counting a hit.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.map.get(key)?;
        self.arena.get(id).map(|entry| &entry.value)
    }

    /// Looks up a value and adds one to its hit count.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = self.map.get(key).copied();
        #[cfg(feature = "metrics")]
        self.metrics.record_get(id.is_some());
        let id = id?;
        let hits = self.heap.priority(id).copied().expect("map/heap out of sync");
        self.heap.update(id, hits.saturating_add(1));
        self.arena.get(id).map(|entry| &entry.value)
    }

    /// Returns the hit count of `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.map.get(key)?;
        self.heap.priority(id).copied()
    }

    /// Inserts or updates a key-value pair.
    ///
    /// - Resident key: value replaced, hit count reset to 1.
    /// - New key, room left: stored with hit count 1.
    /// - New key, cache full: the minimum-hit entry's slot is recycled.
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
            let entry = self.arena.get_mut(id).expect("map/arena out of sync");
            let old = std::mem::replace(&mut entry.value, value);
            self.heap.update(id, 1);
            return SetOutcome::Updated(old);
        }

        if self.map.len() >= self.capacity {
            let (id, _) = self.heap.peek().expect("full cache with empty heap");
            let entry = self.arena.get_mut(id).expect("heap/arena out of sync");
            let old_key = std::mem::replace(&mut entry.key, key.clone());
            let old_value = std::mem::replace(&mut entry.value, value);
            self.map.remove(&old_key).expect("heap/map out of sync");
            self.map.insert(key, id);
            self.heap.update(id, 1);
            #[cfg(feature = "tracing")]
            tracing::trace!(policy = "lfu", len = self.map.len(), "evicted least frequent entry");
            return SetOutcome::Evicted {
                key: old_key,
                value: old_value,
            };
        }

        let id = self.arena.insert(Entry {
            key: key.clone(),
            value,
        });
        self.heap.push(id, 1);
        self.map.insert(key, id);
        SetOutcome::Inserted
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.map.remove(key)?;
        self.heap.remove(id).expect("map/heap out of sync");
        let entry = self.arena.remove(id).expect("map/arena out of sync");
        Some(entry.value)
    }

    /// Removes and returns the entry with the fewest hits.
    pub fn pop_lfu(&mut self) -> Option<(K, V)> {
        let (id, _) = self.heap.pop()?;
        let entry = self.arena.remove(id).expect("heap/arena out of sync");
        self.map.remove(&entry.key).expect("heap/map out of sync");
        #[cfg(feature = "metrics")]
        {
            self.metrics.evictions += 1;
        }
        Some((entry.key, entry.value))
    }

    /// Returns the entry with the fewest hits, the next eviction victim.
    pub fn peek_lfu(&self) -> Option<(&K, &V)> {
        let (id, _) = self.heap.peek()?;
        self.arena.get(id).map(|entry| (&entry.key, &entry.value))
    }

    /// Snapshot of `(key, hit count)` in ascending hit-count order.
    ///
    /// Entries with equal counts appear in an unspecified order.
    pub fn entries(&self) -> Vec<(&K, u64)> {
        let mut out: Vec<(&K, u64)> = self
            .heap
            .iter()
            .map(|(id, &hits)| {
                let entry = self.arena.get(id).expect("heap/arena out of sync");
                (&entry.key, hits)
            })
            .collect();
        out.sort_by_key(|&(_, hits)| hits);
        out
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.arena.clear();
        self.heap.clear();
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

    /// Verifies table/arena/heap agreement and heap order.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() != self.heap.len() || self.map.len() != self.arena.len() {
            return Err(InvariantError::new(format!(
                "table holds {} keys, heap {} slots, arena {} entries",
                self.map.len(),
                self.heap.len(),
                self.arena.len()
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
            if !self.heap.contains(id) {
                return Err(InvariantError::new(format!("slot {:?} missing from heap", id)));
            }
            match self.arena.get(id) {
                Some(entry) if &entry.key == key => {},
                _ => {
                    return Err(InvariantError::new(format!(
                        "slot {:?} does not hold its table key",
                        id
                    )));
                },
            }
        }
        self.heap.check_heap_order()
    }
}

impl<K, V> std::fmt::Debug for LfuCache<K, V>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LfuCache")
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .field("entries", &self.entries())
            .finish_non_exhaustive()
    }
}

impl<K, V> ReadOnlyCache<K, V> for LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn contains(&self, key: &K) -> bool {
        LfuCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        LfuCache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn peek(&self, key: &K) -> Option<&V> {
        LfuCache::peek(self, key)
    }
}

impl<K, V> CoreCache<K, V> for LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        LfuCache::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        LfuCache::get(self, key)
    }

    fn clear(&mut self) {
        LfuCache::clear(self);
    }
}

impl<K, V> MutableCache<K, V> for LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        LfuCache::remove(self, key)
    }
}

impl<K, V> LfuCacheTrait<K, V> for LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn pop_lfu(&mut self) -> Option<(K, V)> {
        LfuCache::pop_lfu(self)
    }

    fn peek_lfu(&self) -> Option<(&K, &V)> {
        LfuCache::peek_lfu(self)
    }

    fn frequency(&self, key: &K) -> Option<u64> {
        LfuCache::frequency(self, key)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    proptest! {
        /// Table, arena and heap stay in sync under any mix of operations.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_invariants_hold(
            capacity in 1usize..32,
            ops in prop::collection::vec((0u8..4, 0u32..48), 0..200)
        ) {
            let mut cache = LfuCache::new(capacity);
            for (op, key) in ops {
                match op {
                    0 | 1 => { cache.set(key, key); },
                    2 => { cache.get(&key); },
                    _ => { cache.remove(&key); },
                }
                prop_assert!(cache.len() <= capacity);
                prop_assert!(cache.check_invariants().is_ok());
            }
        }

        /// The victim always carries the minimum hit count, and hit counts
        /// follow the reference accounting.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_victim_has_min_hits(
            capacity in 1usize..12,
            ops in prop::collection::vec((any::<bool>(), 0u32..24), 0..200)
        ) {
            let mut cache = LfuCache::new(capacity);
            let mut model: HashMap<u32, u64> = HashMap::new();

            for (is_read, key) in ops {
                if is_read {
                    let hit = cache.get(&key).is_some();
                    prop_assert_eq!(hit, model.contains_key(&key));
                    if let Some(h) = model.get_mut(&key) {
                        *h += 1;
                    }
                } else if let Some(h) = model.get_mut(&key) {
                    prop_assert!(!cache.set(key, key));
                    *h = 1;
                } else {
                    let min = model.values().min().copied();
                    match cache.insert(key, key).into_evicted() {
                        Some((victim, _)) => {
                            prop_assert_eq!(model.len(), capacity);
                            prop_assert_eq!(model.remove(&victim), min);
                        },
                        None => prop_assert!(model.len() < capacity),
                    }
                    model.insert(key, 1);
                }

                for (k, h) in &model {
                    prop_assert_eq!(cache.frequency(k), Some(*h));
                }
            }
        }
    }
}
