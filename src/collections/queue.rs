//! FIFO queue for "up next" requests

use super::doubly::{DoublyLinkedList, Iter};

/// FIFO queue
///
/// enqueue O(1), dequeue O(1), peek O(1)
#[derive(Debug, Clone)]
pub struct Queue<T> {
    items: DoublyLinkedList<T>,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self {
            items: DoublyLinkedList::new(),
        }
    }

    pub fn enqueue(&mut self, data: T) {
        self.items.append(data);
    }

    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate from head (next to play) to tail
    pub fn iter(&self) -> Iter<'_, T> {
        self.items.iter()
    }

    /// Keep only the elements matching `predicate`, preserving queue order
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: Fn(&T) -> bool,
    {
        self.items.retain(predicate);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> Queue<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.to_vec()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}
