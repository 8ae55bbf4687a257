//! # LRFU (Least Recently / Frequently Used) Cache
//!
//! Frequency-first eviction with recency as the tie-breaker. Every entry
//! carries a hit count and the logical-clock tick of its last touch; the
//! victim is the entry with the smallest `(hits, tick)` pair.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LrfuCache<K, V>                             │
//!   │                                                                      │
//!   │   map: FxHashMap<K, SlotId>   arena: SlotArena<Entry<K, V>>          │
//!   │                                                                      │
//!   │   heap: IndexedMinHeap<LrfuPriority>                                 │
//!   │                  (hits 1, tick 4)  ◄── next victim                   │
//!   │                  /              \                                    │
//!   │        (hits 1, tick 7)    (hits 3, tick 2)                          │
//!   │                                                                      │
//!   │   clock: 7   (advanced once per set and once per get hit)            │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Logical Clock
//!
//! The clock starts at 0 and only ever moves forward:
//!
//! | Event                 | Clock   | Entry                                  |
//! |-----------------------|---------|----------------------------------------|
//! | `set` of a new key    | +1      | hits = 1, tick = clock                 |
//! | `set` of resident key | +1      | hits += 1, tick = clock                |
//! | `get` hit             | +1      | hits += 1, tick = clock                |
//! | `get` miss            | none    | unchanged                              |
//! | `peek` / `contains`   | none    | unchanged                              |
//!
//! Because every stamp is a fresh clock value, no two resident entries
//! share a tick and the `(hits, tick)` order is total: eviction is fully
//! deterministic. A miss leaves the clock alone, so the clock counts work
//! done on resident entries rather than call volume. `clear` empties the
//! cache but keeps the clock.
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lrfu::LrfuCache;
//!
//! let mut cache = LrfuCache::new(2);
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.get(&"a");
//! cache.get(&"b");
//! // Both have 2 hits; "a" was touched longer ago.
//! cache.set("c", 3);
//!
//! assert!(!cache.contains(&"a"));
//! assert!(cache.contains(&"b"));
//! assert_eq!(cache.tick(), 5);
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::{IndexedMinHeap, SlotArena, SlotId};
use crate::error::{check_capacity, ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::CacheMetrics;
use crate::traits::{CoreCache, LfuCacheTrait, MutableCache, ReadOnlyCache, SetOutcome};

/// Eviction priority of an LRFU entry.
///
/// Ordered by `hits`, then by `tick`; the smaller value is evicted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LrfuPriority {
    /// Number of credited accesses.
    pub hits: u64,
    /// Clock value at the last touch.
    pub tick: u64,
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Bounded cache with frequency-then-recency eviction.
pub struct LrfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    map: FxHashMap<K, SlotId>,
    arena: SlotArena<Entry<K, V>>,
    heap: IndexedMinHeap<LrfuPriority>,
    clock: u64,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> LrfuCache<K, V>
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
        tracing::debug!(policy = "lrfu", capacity, "cache created");
        Ok(Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            arena: SlotArena::with_capacity(capacity),
            heap: IndexedMinHeap::with_capacity(capacity),
            clock: 0,
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

    /// Current value of the logical clock.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.clock
    }

    #[inline]
    fn advance_clock(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Looks up a value without touching it or advancing the clock.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.map.get(key)?;
        self.arena.get(id).map(|entry| &entry.value)
    }

    /// Looks up a value, crediting a hit and stamping it with a new tick.
    ///
    /// A miss mutates nothing, the clock included.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = self.map.get(key).copied();
        #[cfg(feature = "metrics")]
        self.metrics.record_get(id.is_some());
        let id = id?;
        self.touch_slot(id);
        self.arena.get(id).map(|entry| &entry.value)
    }

    fn touch_slot(&mut self, id: SlotId) {
        let tick = self.advance_clock();
        let prev = *self.heap.priority(id).expect("map/heap out of sync");
        self.heap.update(
            id,
            LrfuPriority {
                hits: prev.hits.saturating_add(1),
                tick,
            },
        );
    }

    /// Returns the eviction priority of `key`.
    pub fn priority(&self, key: &K) -> Option<LrfuPriority> {
        let id = *self.map.get(key)?;
        self.heap.priority(id).copied()
    }

    /// Returns the hit count of `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.priority(key).map(|p| p.hits)
    }

    /// Returns the tick at which `key` was last touched.
    pub fn last_touched(&self, key: &K) -> Option<u64> {
        self.priority(key).map(|p| p.tick)
    }

    /// Inserts or updates a key-value pair. Always advances the clock.
    ///
    /// - Resident key: value replaced, one hit credited, tick refreshed.
    /// - New key, room left: stored with one hit at the current tick.
    /// - New key, cache full: the minimum `(hits, tick)` slot is recycled.
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
        let tick = self.advance_clock();
        let fresh = LrfuPriority { hits: 1, tick };

        if let Some(&id) = self.map.get(&key) {
            let prev = *self.heap.priority(id).expect("map/heap out of sync");
            let entry = self.arena.get_mut(id).expect("map/arena out of sync");
            let old = std::mem::replace(&mut entry.value, value);
            self.heap.update(
                id,
                LrfuPriority {
                    hits: prev.hits.saturating_add(1),
                    tick,
                },
            );
            return SetOutcome::Updated(old);
        }

        if self.map.len() >= self.capacity {
            let (id, _) = self.heap.peek().expect("full cache with empty heap");
            let entry = self.arena.get_mut(id).expect("heap/arena out of sync");
            let old_key = std::mem::replace(&mut entry.key, key.clone());
            let old_value = std::mem::replace(&mut entry.value, value);
            self.map.remove(&old_key).expect("heap/map out of sync");
            self.map.insert(key, id);
            self.heap.update(id, fresh);
            #[cfg(feature = "tracing")]
            tracing::trace!(policy = "lrfu", tick, len = self.map.len(), "evicted lowest priority entry");
            return SetOutcome::Evicted {
                key: old_key,
                value: old_value,
            };
        }

        let id = self.arena.insert(Entry {
            key: key.clone(),
            value,
        });
        self.heap.push(id, fresh);
        self.map.insert(key, id);
        SetOutcome::Inserted
    }

    /// Removes `key` and returns its value. The clock is not advanced.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.map.remove(key)?;
        self.heap.remove(id).expect("map/heap out of sync");
        let entry = self.arena.remove(id).expect("map/arena out of sync");
        Some(entry.value)
    }

    /// Removes and returns the entry with the smallest `(hits, tick)`.
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

    /// Returns the next eviction victim.
    pub fn peek_lfu(&self) -> Option<(&K, &V)> {
        let (id, _) = self.heap.peek()?;
        self.arena.get(id).map(|entry| (&entry.key, &entry.value))
    }

    /// Snapshot of `(key, priority)` in eviction order.
    pub fn entries(&self) -> Vec<(&K, LrfuPriority)> {
        let mut out: Vec<(&K, LrfuPriority)> = self
            .heap
            .iter()
            .map(|(id, &priority)| {
                let entry = self.arena.get(id).expect("heap/arena out of sync");
                (&entry.key, priority)
            })
            .collect();
        out.sort_by_key(|&(_, priority)| priority);
        out
    }

    /// Removes every entry. The clock keeps its value.
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

    /// Verifies table/arena/heap agreement, heap order, and that every
    /// stamp is unique and not ahead of the clock.
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

        let mut ticks: Vec<u64> = self.heap.iter().map(|(_, p)| p.tick).collect();
        ticks.sort_unstable();
        if ticks.windows(2).any(|w| w[0] == w[1]) {
            return Err(InvariantError::new("two entries share a tick"));
        }
        if let Some(&newest) = ticks.last() {
            if newest > self.clock {
                return Err(InvariantError::new(format!(
                    "tick {} is ahead of clock {}",
                    newest, self.clock
                )));
            }
        }

        self.heap.check_heap_order()
    }
}

impl<K, V> std::fmt::Debug for LrfuCache<K, V>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LrfuCache")
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .field("clock", &self.clock)
            .field("entries", &self.entries())
            .finish_non_exhaustive()
    }
}

impl<K, V> ReadOnlyCache<K, V> for LrfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn contains(&self, key: &K) -> bool {
        LrfuCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        LrfuCache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn peek(&self, key: &K) -> Option<&V> {
        LrfuCache::peek(self, key)
    }
}

impl<K, V> CoreCache<K, V> for LrfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        LrfuCache::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        LrfuCache::get(self, key)
    }

    fn clear(&mut self) {
        LrfuCache::clear(self);
    }
}

impl<K, V> MutableCache<K, V> for LrfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        LrfuCache::remove(self, key)
    }
}

impl<K, V> LfuCacheTrait<K, V> for LrfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn pop_lfu(&mut self) -> Option<(K, V)> {
        LrfuCache::pop_lfu(self)
    }

    fn peek_lfu(&self) -> Option<(&K, &V)> {
        LrfuCache::peek_lfu(self)
    }

    fn frequency(&self, key: &K) -> Option<u64> {
        LrfuCache::frequency(self, key)
    }
}
