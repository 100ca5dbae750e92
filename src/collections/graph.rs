//! Undirected similarity graph over song ids

use crate::model::SongId;
use std::collections::HashMap;

/// Adjacency-list graph: song id -> similar song ids
///
/// Edges are symmetric, never parallel and never self-loops. Building every
/// edge is quadratic in the song count (see
/// [`build_similarity_edges`](crate::library::similarity::build_similarity_edges));
/// neighbour lookup is O(1) average.
#[derive(Debug, Clone, Default)]
pub struct SongGraph {
    adjacency: HashMap<SongId, Vec<SongId>>,
}

impl SongGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `id` has a (possibly empty) neighbour entry
    pub fn add_node(&mut self, id: SongId) {
        self.adjacency.entry(id).or_default();
    }

    /// Link `a` and `b` in both directions; self-edges are ignored
    pub fn add_edge(&mut self, a: SongId, b: SongId) {
        if a == b {
            return;
        }

        let a_neighbors = self.adjacency.entry(a).or_default();
        if !a_neighbors.contains(&b) {
            a_neighbors.push(b);
        }

        let b_neighbors = self.adjacency.entry(b).or_default();
        if !b_neighbors.contains(&a) {
            b_neighbors.push(a);
        }
    }

    /// Copy of the neighbour list, empty for unknown ids
    pub fn neighbors(&self, id: SongId) -> Vec<SongId> {
        self.adjacency.get(&id).cloned().unwrap_or_default()
    }

    /// Drop `id` and strip it from every neighbour list that mentions it
    pub fn remove_node(&mut self, id: SongId) {
        if self.adjacency.remove(&id).is_none() {
            return;
        }
        for neighbors in self.adjacency.values_mut() {
            neighbors.retain(|&n| n != id);
        }
    }

    pub fn contains(&self, id: SongId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum::<usize>() / 2
    }

    /// Whether any neighbour list mentions `id`
    pub fn is_referenced(&self, id: SongId) -> bool {
        self.adjacency.values().any(|neighbors| neighbors.contains(&id))
    }

    pub fn clear(&mut self) {
        self.adjacency.clear();
    }
}
