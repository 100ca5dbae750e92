//! Doubly linked list backed by an index arena
//!
//! Nodes live in a slot vector and link to each other by slot index, so
//! unlinking a node rewires both neighbours in one step and never leaves a
//! dangling back-link. Freed slots are recycled by later appends.

#[derive(Debug, Clone)]
struct Node<T> {
    data: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly linked list supporting next/prev lookups around an element
///
/// Operations:
/// - append: O(1)
/// - pop front: O(1)
/// - remove by predicate: O(n)
/// - next/prev of a matching element: O(n) scan, O(1) step
#[derive(Debug, Clone)]
pub struct DoublyLinkedList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> DoublyLinkedList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Add an element at the tail
    pub fn append(&mut self, data: T) {
        let node = Node {
            data,
            prev: self.tail,
            next: None,
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                index
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
    }

    /// Remove and return the head element
    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        Some(self.unlink(head))
    }

    /// Borrow the head element
    pub fn front(&self) -> Option<&T> {
        self.head.map(|index| &self.node(index).data)
    }

    /// Unlink the first element matching `predicate` and return it
    pub fn remove_first<F>(&mut self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        let index = self.position(&predicate)?;
        Some(self.unlink(index))
    }

    /// Unlink every element matching `predicate`, returning how many went
    pub fn remove_all<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let mut removed = 0;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            cursor = self.node(index).next;
            if predicate(&self.node(index).data) {
                self.unlink(index);
                removed += 1;
            }
        }
        removed
    }

    /// Keep only the elements matching `predicate`, preserving order
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: Fn(&T) -> bool,
    {
        self.remove_all(|data| !predicate(data));
    }

    /// Whether any element matches `predicate`
    pub fn contains<F>(&self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        self.position(&predicate).is_some()
    }

    /// The element after the first one matching `predicate`
    pub fn next_of<F>(&self, predicate: F) -> Option<&T>
    where
        F: Fn(&T) -> bool,
    {
        let index = self.position(&predicate)?;
        self.node(index).next.map(|next| &self.node(next).data)
    }

    /// The element before the first one matching `predicate`
    pub fn prev_of<F>(&self, predicate: F) -> Option<&T>
    where
        F: Fn(&T) -> bool,
    {
        let index = self.position(&predicate)?;
        self.node(index).prev.map(|prev| &self.node(prev).data)
    }

    /// Iterate from head to tail
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every element and release the arena
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn position<F>(&self, predicate: &F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let node = self.node(index);
            if predicate(&node.data) {
                return Some(index);
            }
            cursor = node.next;
        }
        None
    }

    /// Detach the node at `index`, fixing both directions, and free its slot
    fn unlink(&mut self, index: usize) -> T {
        let node = self.slots[index]
            .take()
            .unwrap_or_else(|| panic!("unlink of vacant slot {index}"));

        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }

        self.free.push(index);
        self.len -= 1;
        node.data
    }

    // Linked indices always point at occupied slots.
    fn node(&self, index: usize) -> &Node<T> {
        self.slots[index]
            .as_ref()
            .unwrap_or_else(|| panic!("dangling link to slot {index}"))
    }

    fn node_mut(&mut self, index: usize) -> &mut Node<T> {
        self.slots[index]
            .as_mut()
            .unwrap_or_else(|| panic!("dangling link to slot {index}"))
    }
}

impl<T: Clone> DoublyLinkedList<T> {
    /// Snapshot of the list in order
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T> Default for DoublyLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowing iterator over a [`DoublyLinkedList`]
pub struct Iter<'a, T> {
    list: &'a DoublyLinkedList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?);
        self.cursor = node.next;
        Some(&node.data)
    }
}
