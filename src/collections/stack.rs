//! LIFO stack used for the listening history

use super::singly::{Iter, SinglyLinkedList};

/// Classic LIFO stack
///
/// push O(1), pop O(1), peek O(1)
#[derive(Debug, Clone)]
pub struct Stack<T> {
    items: SinglyLinkedList<T>,
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self {
            items: SinglyLinkedList::new(),
        }
    }

    pub fn push(&mut self, data: T) {
        self.items.push_front(data);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.remove_first(|_| true)
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.iter().next()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate from the top (most recent) down
    pub fn iter(&self) -> Iter<'_, T> {
        self.items.iter()
    }

    /// Keep only the elements matching `predicate`, preserving stack order
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: Fn(&T) -> bool,
    {
        let mut kept = Vec::with_capacity(self.len());
        while let Some(item) = self.pop() {
            if predicate(&item) {
                kept.push(item);
            }
        }
        // kept is top first; push the bottom back first
        for item in kept.into_iter().rev() {
            self.push(item);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> Stack<T> {
    /// Snapshot, top first
    pub fn to_vec(&self) -> Vec<T> {
        self.items.to_vec()
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}
