//! Eviction policies.
//!
//! | Policy  | Victim                                   | Ordering structure        |
//! |---------|------------------------------------------|---------------------------|
//! | [`fifo`] | oldest insertion                        | `VecDeque` of keys        |
//! | [`lru`]  | least recently used                     | [`IntrusiveList`]         |
//! | [`lfu`]  | fewest hits                             | [`IndexedMinHeap`]        |
//! | [`lrfu`] | fewest hits, then least recently used   | [`IndexedMinHeap`]        |
//!
//! [`IntrusiveList`]: crate::ds::IntrusiveList
//! [`IndexedMinHeap`]: crate::ds::IndexedMinHeap
pub mod fifo;
pub mod lfu;
pub mod lrfu;
pub mod lru;
