//! Per-cache counters, compiled in with the `metrics` feature.
//!
//! Every policy records the same five counters. They are plain `u64`s:
//! caches are single-threaded, so there is nothing to synchronize.
//!
//! ```
//! # #[cfg(feature = "metrics")]
//! # {
//! use evictkit::policy::fifo::FifoCache;
//!
//! let mut cache = FifoCache::new(1);
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.get(&"b");
//! cache.get(&"a");
//!
//! let m = cache.metrics();
//! assert_eq!((m.hits, m.misses, m.evictions), (1, 1, 1));
//! # }
//! ```

use std::fmt;

/// Hit, miss and admission counters for one cache instance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetrics {
    /// `get` calls that found the key.
    pub hits: u64,
    /// `get` calls that did not.
    pub misses: u64,
    /// `set` calls that admitted a new key.
    pub inserts: u64,
    /// `set` calls that overwrote a resident key.
    pub updates: u64,
    /// Entries discarded to make room, including explicit `pop_*` calls.
    pub evictions: u64,
}

impl CacheMetrics {
    /// Fraction of `get` calls that hit, in `0.0..=1.0`.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    #[inline]
    pub(crate) fn record_get(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    #[inline]
    pub(crate) fn record_set<K, V>(&mut self, outcome: &crate::traits::SetOutcome<K, V>) {
        use crate::traits::SetOutcome;
        match outcome {
            SetOutcome::Updated(_) => self.updates += 1,
            SetOutcome::Inserted => self.inserts += 1,
            SetOutcome::Evicted { .. } => {
                self.inserts += 1;
                self.evictions += 1;
            },
        }
    }
}

impl fmt::Display for CacheMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheMetrics {{ hits: {}, misses: {}, hit_rate: {:.2}%, inserts: {}, updates: {}, evictions: {} }}",
            self.hits,
            self.misses,
            self.hit_rate() * 100.0,
            self.inserts,
            self.updates,
            self.evictions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SetOutcome;

    #[test]
    fn hit_rate_of_empty_is_zero() {
        assert_eq!(CacheMetrics::default().hit_rate(), 0.0);
    }

    #[test]
    fn records_gets_and_sets() {
        let mut m = CacheMetrics::default();
        m.record_get(true);
        m.record_get(true);
        m.record_get(false);
        m.record_set::<u8, u8>(&SetOutcome::Inserted);
        m.record_set::<u8, u8>(&SetOutcome::Updated(1));
        m.record_set(&SetOutcome::Evicted { key: 1u8, value: 2u8 });

        assert_eq!(m.hits, 2);
        assert_eq!(m.misses, 1);
        assert_eq!(m.inserts, 2);
        assert_eq!(m.updates, 1);
        assert_eq!(m.evictions, 1);
        assert!((m.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn display_includes_hit_rate() {
        let m = CacheMetrics {
            hits: 1,
            misses: 1,
            ..Default::default()
        };
        assert!(m.to_string().contains("hit_rate: 50.00%"));
    }
}
