//! Binary search tree keyed by lowercased song title
//!
//! The tree does not rebalance; depth degrades to O(n) for sorted insertion
//! order. Equal keys overwrite, so two songs sharing a title occupy a single
//! slot and only the last inserted is reachable by exact search.

use std::cmp::Ordering;

#[derive(Debug)]
struct TreeNode<T> {
    key: String,
    value: T,
    left: Option<Box<TreeNode<T>>>,
    right: Option<Box<TreeNode<T>>>,
}

/// Case-insensitive BST keyed by title
///
/// insert/search average O(log n), worst O(n)
#[derive(Debug)]
pub struct TitleTree<T> {
    root: Option<Box<TreeNode<T>>>,
    len: usize,
}

/// Normalize a title into its tree key
pub fn title_key(title: &str) -> String {
    title.to_lowercase()
}

impl<T> TitleTree<T> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Insert `value` under the normalized `key`, overwriting an equal key
    pub fn insert(&mut self, key: &str, value: T) {
        let key = title_key(key);
        let mut cursor = &mut self.root;
        while let Some(node) = cursor {
            match key.cmp(&node.key) {
                Ordering::Less => cursor = &mut node.left,
                Ordering::Greater => cursor = &mut node.right,
                Ordering::Equal => {
                    node.value = value;
                    return;
                }
            }
        }
        *cursor = Some(Box::new(TreeNode {
            key,
            value,
            left: None,
            right: None,
        }));
        self.len += 1;
    }

    /// Exact lookup of the normalized query
    pub fn search(&self, query: &str) -> Option<&T> {
        let key = title_key(query);
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    /// Every value whose key contains the normalized query
    ///
    /// Visits the whole tree (pre-order); callers try [`search`](Self::search)
    /// first.
    pub fn partial_match(&self, query: &str) -> Vec<&T> {
        let needle = title_key(query);
        let mut matches = Vec::new();
        let mut stack: Vec<&TreeNode<T>> = self.root.as_deref().into_iter().collect();

        while let Some(node) = stack.pop() {
            if node.key.contains(&needle) {
                matches.push(&node.value);
            }
            // Right first so the left subtree is visited first
            stack.extend(node.right.as_deref());
            stack.extend(node.left.as_deref());
        }
        matches
    }

    /// Values in ascending key order
    pub fn values_in_order(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&TreeNode<T>> = Vec::new();
        let mut cursor = self.root.as_deref();

        while cursor.is_some() || !stack.is_empty() {
            while let Some(node) = cursor {
                stack.push(node);
                cursor = node.left.as_deref();
            }
            if let Some(node) = stack.pop() {
                out.push(&node.value);
                cursor = node.right.as_deref();
            }
        }
        out
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        // Tear down with an explicit stack; a degenerate tree is a long chain
        let mut pending: Vec<Box<TreeNode<T>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
        self.len = 0;
    }
}

impl<T> Default for TitleTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for TitleTree<T> {
    fn drop(&mut self) {
        self.clear();
    }
}
