use super::SongId;
use crate::collections::DoublyLinkedList;

/// A named playlist backed by a doubly linked list of song ids
///
/// Next/previous lookups scan to the song, then step one link.
#[derive(Debug, Clone)]
pub struct Playlist {
    /// Playlist name, unique within a library
    pub name: String,

    songs: DoublyLinkedList<SongId>,
}

impl Playlist {
    /// Create a new empty playlist
    pub fn new(name: String) -> Self {
        Self {
            name,
            songs: DoublyLinkedList::new(),
        }
    }

    /// Append a song; the same song may appear more than once
    pub fn add(&mut self, id: SongId) {
        self.songs.append(id);
    }

    /// Remove the first occurrence of `id`
    pub fn remove(&mut self, id: SongId) -> bool {
        self.songs.remove_first(|&s| s == id).is_some()
    }

    /// Remove every occurrence of `id`
    pub fn remove_all(&mut self, id: SongId) -> usize {
        self.songs.remove_all(|&s| s == id)
    }

    /// Keep only the songs matching `predicate`
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: Fn(SongId) -> bool,
    {
        self.songs.retain(|&s| predicate(s));
    }

    pub fn contains(&self, id: SongId) -> bool {
        self.songs.contains(|&s| s == id)
    }

    /// Song after the first occurrence of `id`
    pub fn next_of(&self, id: SongId) -> Option<SongId> {
        self.songs.next_of(|&s| s == id).copied()
    }

    /// Song before the first occurrence of `id`
    pub fn prev_of(&self, id: SongId) -> Option<SongId> {
        self.songs.prev_of(|&s| s == id).copied()
    }

    /// Song ids in playlist order
    pub fn song_ids(&self) -> Vec<SongId> {
        self.songs.to_vec()
    }

    /// Number of entries in this playlist
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Check if playlist is empty
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn clear(&mut self) {
        self.songs.clear();
    }
}
