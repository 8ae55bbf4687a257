//! Intrusive doubly linked list backed by `SlotArena`.
//!
//! Stores list nodes in a `SlotArena` and links them by `SlotId`, giving
//! stable handles and O(1) move/remove without raw pointers. The LRU policy
//! keeps its lookup table as `key -> SlotId` into one of these lists.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌────────┬─────────────────────────────────────────────┐
//!   │ SlotId │ Node { value, prev, next }                  │
//!   ├────────┼─────────────────────────────────────────────┤
//!   │ id_1   │ { value: A, prev: None, next: Some(id_2) }  │
//!   │ id_2   │ { value: B, prev: Some(id_1), next: id_3 }  │
//!   │ id_3   │ { value: C, prev: Some(id_2), next: None }  │
//!   └────────┴─────────────────────────────────────────────┘
//!
//!   head ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail
//! ```
//!
//! ## Performance
//! - `push_front` / `push_back`: O(1)
//! - `pop_front` / `pop_back`: O(1)
//! - `move_to_front` / `remove`: O(1)
//! - `iter`: O(n)

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Intrusive list that stores nodes in a `SlotArena` and links them via `SlotId`.
#[derive(Debug)]
pub struct IntrusiveList<T> {
    arena: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty list with reserved node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Returns the number of nodes in the list.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns `true` if `id` is currently a node in this list.
    pub fn contains(&self, id: SlotId) -> bool {
        self.arena.contains(id)
    }

    /// Returns the value at the front of the list.
    pub fn front(&self) -> Option<&T> {
        self.head
            .and_then(|id| self.arena.get(id).map(|node| &node.value))
    }

    /// Returns the value at the back of the list.
    pub fn back(&self) -> Option<&T> {
        self.tail
            .and_then(|id| self.arena.get(id).map(|node| &node.value))
    }

    /// Returns the SlotId at the back of the list.
    pub fn back_id(&self) -> Option<SlotId> {
        self.tail
    }

    /// Returns an iterator from front to back.
    pub fn iter(&self) -> IntrusiveListIter<'_, T> {
        IntrusiveListIter {
            list: self,
            current: self.head,
        }
    }

    /// Returns the value for a node id, if present.
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    /// Returns a mutable reference to a node value, if present.
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    /// Inserts a new node at the front and returns its `SlotId`.
    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            prev: None,
            next: self.head,
        });
        if let Some(head) = self.head {
            if let Some(node) = self.arena.get_mut(head) {
                node.prev = Some(id);
            }
        } else {
            self.tail = Some(id);
        }
        self.head = Some(id);
        id
    }

    /// Inserts a new node at the back and returns its `SlotId`.
    pub fn push_back(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            prev: self.tail,
            next: None,
        });
        if let Some(tail) = self.tail {
            if let Some(node) = self.arena.get_mut(tail) {
                node.next = Some(id);
            }
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        id
    }

    /// Removes and returns the front value.
    pub fn pop_front(&mut self) -> Option<T> {
        let id = self.head?;
        self.remove(id)
    }

    /// Removes and returns the back value.
    pub fn pop_back(&mut self) -> Option<T> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Removes the node `id` from the list and returns its value.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.detach(id)?;
        self.arena.remove(id).map(|node| node.value)
    }

    /// Moves an existing node to the front; returns `false` if `id` is not present.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if Some(id) == self.head {
            return true;
        }
        self.detach(id);
        self.attach_front(id);
        true
    }

    /// Clears the list and frees all nodes.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    /// Walks the list from head to tail and checks that every back link
    /// mirrors its forward link and that the walk covers every live node.
    pub fn check_links(&self) -> Result<(), InvariantError> {
        if self.head.is_none() || self.tail.is_none() {
            if self.head.is_some() || self.tail.is_some() || !self.is_empty() {
                return Err(InvariantError::new(format!(
                    "list head/tail disagree: head={:?} tail={:?} len={}",
                    self.head,
                    self.tail,
                    self.len()
                )));
            }
            return Ok(());
        }

        let mut count = 0usize;
        let mut current = self.head;
        let mut prev = None;
        while let Some(id) = current {
            let node = self
                .arena
                .get(id)
                .ok_or_else(|| InvariantError::new(format!("list: stale SlotId {:?}", id)))?;
            if node.prev != prev {
                return Err(InvariantError::new(format!(
                    "list: node {:?} prev={:?}, expected {:?}",
                    id, node.prev, prev
                )));
            }
            if node.next.is_none() && self.tail != Some(id) {
                return Err(InvariantError::new(format!(
                    "list: walk ended at {:?} but tail is {:?}",
                    id, self.tail
                )));
            }
            count += 1;
            if count > self.len() {
                return Err(InvariantError::new("list: cycle detected"));
            }
            prev = Some(id);
            current = node.next;
        }

        if count != self.len() {
            return Err(InvariantError::new(format!(
                "list: walked {} nodes but arena holds {}",
                count,
                self.len()
            )));
        }
        Ok(())
    }

    fn detach(&mut self, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let node = self.arena.get(id)?;
            (node.prev, node.next)
        };

        if let Some(prev_id) = prev {
            if let Some(prev_node) = self.arena.get_mut(prev_id) {
                prev_node.next = next;
            }
        } else {
            self.head = next;
        }

        if let Some(next_id) = next {
            if let Some(next_node) = self.arena.get_mut(next_id) {
                next_node.prev = prev;
            }
        } else {
            self.tail = prev;
        }

        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = None;
        }

        Some(())
    }

    fn attach_front(&mut self, id: SlotId) -> Option<()> {
        let old_head = self.head;
        let node = self.arena.get_mut(id)?;
        node.prev = None;
        node.next = old_head;
        if let Some(old_head) = old_head {
            if let Some(head_node) = self.arena.get_mut(old_head) {
                head_node.prev = Some(id);
            }
        } else {
            self.tail = Some(id);
        }
        self.head = Some(id);
        Some(())
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over list values from front to back.
pub struct IntrusiveListIter<'a, T> {
    list: &'a IntrusiveList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for IntrusiveListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.arena.get(id)?;
        self.current = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intrusive_list_basic_ops() {
        let mut list = IntrusiveList::new();
        let a = list.push_front("a");
        let b = list.push_back("b");
        let c = list.push_back("c");

        assert_eq!(list.front(), Some(&"a"));
        assert_eq!(list.back(), Some(&"c"));
        assert_eq!(list.len(), 3);

        assert!(list.move_to_front(c));
        assert_eq!(list.front(), Some(&"c"));
        assert_eq!(list.back(), Some(&"b"));

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(list.len(), 2);

        assert_eq!(list.pop_front(), Some("c"));
        assert_eq!(list.pop_back(), Some("a"));
        assert!(list.is_empty());

        assert!(!list.contains(a));
        list.check_links().unwrap();
    }

    #[test]
    fn intrusive_list_iter_order() {
        let mut list = IntrusiveList::new();
        list.push_back(1);
        list.push_back(2);
        list.push_front(0);
        let values: Vec<_> = list.iter().copied().collect();
        assert_eq!(values, vec![0, 1, 2]);
    }

    #[test]
    fn move_to_front_of_tail_updates_tail() {
        let mut list = IntrusiveList::new();
        let a = list.push_back("a");
        let b = list.push_back("b");

        assert!(list.move_to_front(b));
        assert_eq!(list.back_id(), Some(a));
        assert_eq!(list.front(), Some(&"b"));
        list.check_links().unwrap();

        // head is already at the front
        assert!(list.move_to_front(b));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn move_to_front_of_removed_id_is_rejected() {
        let mut list = IntrusiveList::new();
        let a = list.push_back(1);
        list.remove(a);
        assert!(!list.move_to_front(a));
        assert_eq!(list.remove(a), None);
    }

    #[test]
    fn get_mut_edits_value_without_moving() {
        let mut list = IntrusiveList::new();
        let a = list.push_back(1);
        list.push_back(2);
        *list.get_mut(a).unwrap() = 10;
        assert_eq!(list.get(a), Some(&10));
        assert_eq!(list.front(), Some(&10));
    }

    #[test]
    fn check_links_after_churn() {
        let mut list = IntrusiveList::with_capacity(8);
        let mut ids = Vec::new();
        for i in 0..8 {
            ids.push(list.push_front(i));
        }
        for id in ids.iter().step_by(3) {
            list.move_to_front(*id);
        }
        list.remove(ids[4]);
        list.pop_back();
        list.check_links().unwrap();
        assert_eq!(list.len(), 6);

        list.clear();
        assert!(list.is_empty());
        list.check_links().unwrap();
    }
}
