//! # Cache Trait Hierarchy
//!
//! One contract shared by every eviction policy, plus policy-specific
//! extensions for inspecting and driving eviction directly.
//!
//! ## Architecture
//!
//! ```text
//!                     ┌───────────────────────────────────────┐
//!                     │        ReadOnlyCache<K, V>            │
//!                     │  contains / len / capacity / peek     │
//!                     └──────────────────┬────────────────────┘
//!                                        │
//!                     ┌──────────────────▼────────────────────┐
//!                     │          CoreCache<K, V>              │
//!                     │  insert(K, V) → SetOutcome<K, V>      │
//!                     │  set(K, V)    → bool (new slot used)  │
//!                     │  get(&K)      → Option<&V>            │
//!                     │  clear()                              │
//!                     └──────┬───────────────────────┬────────┘
//!                            │                       │
//!             ┌──────────────▼─────────┐   ┌─────────▼──────────────┐
//!             │  FifoCacheTrait<K, V>  │   │   MutableCache<K, V>   │
//!             │  pop_oldest            │   │   remove(&K)           │
//!             │  peek_oldest           │   └────┬──────────────┬────┘
//!             │  age_rank              │        │              │
//!             │  ⚠ no remove           │        ▼              ▼
//!             └────────────────────────┘  LruCacheTrait   LfuCacheTrait
//!                                         pop_lru         pop_lfu
//!                                         peek_lru        peek_lfu
//!                                         touch           frequency
//!                                         recency_rank
//! ```
//!
//! FIFO extends [`CoreCache`] directly rather than [`MutableCache`]: removing
//! an arbitrary key would leave a hole in the insertion-order queue.
//!
//! | Policy | Implements                               |
//! |--------|------------------------------------------|
//! | FIFO   | `CoreCache`, `FifoCacheTrait`            |
//! | LRU    | `MutableCache`, `LruCacheTrait`          |
//! | LFU    | `MutableCache`, `LfuCacheTrait`          |
//! | LRFU   | `MutableCache`, `LfuCacheTrait`          |
//!
//! ## Thread Safety
//!
//! No cache in this crate is thread-safe. Every operation is synchronous and
//! never blocks, so a single `Mutex` around the cache is enough when sharing
//! is needed.

/// Result of admitting a key-value pair into a cache.
///
/// Distinguishes the three paths a `set` can take. [`consumed_slot`] maps
/// the outcome onto the boolean returned by [`CoreCache::set`].
///
/// [`consumed_slot`]: SetOutcome::consumed_slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome<K, V> {
    /// The key was already resident; carries the value it replaced.
    Updated(V),
    /// The key was new and a free slot was available.
    Inserted,
    /// The key was new and the cache was full; carries the discarded entry.
    Evicted { key: K, value: V },
}

impl<K, V> SetOutcome<K, V> {
    /// Returns `true` if a new key entered the cache.
    #[inline]
    pub fn consumed_slot(&self) -> bool {
        !matches!(self, SetOutcome::Updated(_))
    }

    /// Returns `true` if an entry had to be discarded.
    #[inline]
    pub fn is_eviction(&self) -> bool {
        matches!(self, SetOutcome::Evicted { .. })
    }

    /// Returns the discarded entry, if any.
    pub fn into_evicted(self) -> Option<(K, V)> {
        match self {
            SetOutcome::Evicted { key, value } => Some((key, value)),
            _ => None,
        }
    }
}

/// Side-effect-free queries shared by every cache.
pub trait ReadOnlyCache<K, V> {
    /// Returns `true` if `key` is resident. Never changes eviction order.
    fn contains(&self, key: &K) -> bool;

    /// Returns the number of resident entries.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries.
    fn capacity(&self) -> usize;

    /// Looks up a value without counting it as an access.
    fn peek(&self, key: &K) -> Option<&V>;
}

/// Core cache operations that all caches support.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru::LruCache;
/// use evictkit::traits::{CoreCache, ReadOnlyCache};
///
/// fn warm<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, &str)]) {
///     for (key, value) in data {
///         cache.set(*key, value.to_string());
///     }
/// }
///
/// let mut cache = LruCache::new(8);
/// warm(&mut cache, &[(1, "one"), (2, "two")]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V>: ReadOnlyCache<K, V> {
    /// Admits `key`, evicting exactly one entry if the cache is full and the
    /// key is new.
    fn insert(&mut self, key: K, value: V) -> SetOutcome<K, V>;

    /// Admits `key`; returns `true` if a new slot was consumed, `false` if an
    /// existing key was updated.
    fn set(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).consumed_slot()
    }

    /// Looks up `key`, recording the access according to the policy.
    ///
    /// A miss is `None` and leaves the cache untouched.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Removes every entry.
    fn clear(&mut self);
}

/// Caches that allow removing an arbitrary key.
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes `key` and returns its value.
    fn remove(&mut self, key: &K) -> Option<V>;
}

/// FIFO-specific operations.
pub trait FifoCacheTrait<K, V>: CoreCache<K, V> {
    /// Removes and returns the oldest-inserted entry.
    fn pop_oldest(&mut self) -> Option<(K, V)>;

    /// Returns the oldest-inserted entry, i.e. the next eviction victim.
    fn peek_oldest(&self) -> Option<(&K, &V)>;

    /// Position of `key` in insertion order (0 = oldest).
    fn age_rank(&self, key: &K) -> Option<usize>;
}

/// LRU-specific operations.
pub trait LruCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Returns the least recently used entry without touching it.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Marks `key` as just used. Returns `false` if absent.
    fn touch(&mut self, key: &K) -> bool;

    /// Position of `key` in recency order (0 = most recent).
    fn recency_rank(&self, key: &K) -> Option<usize>;
}

/// Frequency-ordered operations (LFU and LRFU).
pub trait LfuCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the entry with the lowest priority.
    fn pop_lfu(&mut self) -> Option<(K, V)>;

    /// Returns the lowest-priority entry, i.e. the next eviction victim.
    fn peek_lfu(&self) -> Option<(&K, &V)>;

    /// Returns the hit count of `key`.
    fn frequency(&self, key: &K) -> Option<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_slot_accounting() {
        let updated: SetOutcome<&str, i32> = SetOutcome::Updated(1);
        let inserted: SetOutcome<&str, i32> = SetOutcome::Inserted;
        let evicted: SetOutcome<&str, i32> = SetOutcome::Evicted { key: "a", value: 1 };

        assert!(!updated.consumed_slot());
        assert!(inserted.consumed_slot());
        assert!(evicted.consumed_slot());

        assert!(!inserted.is_eviction());
        assert!(evicted.is_eviction());
    }

    #[test]
    fn into_evicted_only_for_evictions() {
        let evicted: SetOutcome<&str, i32> = SetOutcome::Evicted { key: "a", value: 1 };
        assert_eq!(evicted.into_evicted(), Some(("a", 1)));
        assert_eq!(SetOutcome::<&str, i32>::Updated(5).into_evicted(), None);
        assert_eq!(SetOutcome::<&str, i32>::Inserted.into_evicted(), None);
    }
}
