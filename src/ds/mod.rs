//! Ordering structures shared by the eviction policies.
//!
//! - [`SlotArena`]: entry storage addressed by stable [`SlotId`] handles.
//! - [`IntrusiveList`]: `SlotId`-linked doubly linked list (LRU recency order).
//! - [`IndexedMinHeap`]: position-tracking min-heap (LFU / LRFU priority order).
pub mod indexed_heap;
pub mod intrusive_list;
pub mod slot_arena;

pub use indexed_heap::IndexedMinHeap;
pub use intrusive_list::IntrusiveList;
pub use slot_arena::{SlotArena, SlotId};
