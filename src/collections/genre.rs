//! Two-level genre index
//!
//! Genres form a linked list of entries; each entry owns its own
//! most-recent-first item list. Genre names keep the casing they were first
//! added with and are matched case-insensitively.

use super::singly::SinglyLinkedList;

#[derive(Debug)]
struct GenreEntry<T> {
    /// Display name, as first added
    name: String,
    /// Lowercased match key
    key: String,
    items: SinglyLinkedList<T>,
    next: Option<Box<GenreEntry<T>>>,
}

/// Multi-linked list keyed by genre
///
/// Insert/lookup per genre is O(g + k) for g genres walked and k items in
/// the genre.
#[derive(Debug)]
pub struct GenreIndex<T> {
    head: Option<Box<GenreEntry<T>>>,
}

/// Normalize a genre name into its match key
pub fn genre_key(genre: &str) -> String {
    genre.to_lowercase()
}

impl<T> GenreIndex<T> {
    pub fn new() -> Self {
        Self { head: None }
    }

    /// File `item` under `genre`, creating the genre entry if needed
    pub fn add(&mut self, genre: &str, item: T) {
        let key = genre_key(genre);
        if let Some(entry) = self.find_mut(&key) {
            entry.items.push_front(item);
            return;
        }

        log::debug!("New genre entry: {}", genre);
        let mut items = SinglyLinkedList::new();
        items.push_front(item);
        let next = self.head.take();
        self.head = Some(Box::new(GenreEntry {
            name: genre.to_string(),
            key,
            items,
            next,
        }));
    }

    /// Unlink the first item under `genre` matching `predicate`
    ///
    /// Returns false if the genre is unknown or nothing matched.
    pub fn remove<F>(&mut self, genre: &str, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        match self.find_mut(&genre_key(genre)) {
            Some(entry) => entry.items.remove_first(predicate).is_some(),
            None => false,
        }
    }

    /// All genre names, sorted case-insensitively
    pub fn genres(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries().map(|entry| entry.name.clone()).collect();
        names.sort_by_key(|name| name.to_lowercase());
        names
    }

    /// Whether `genre` has an entry
    pub fn contains_genre(&self, genre: &str) -> bool {
        self.find(&genre_key(genre)).is_some()
    }

    pub fn clear(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut entry) = cursor {
            cursor = entry.next.take();
        }
    }

    fn entries(&self) -> impl Iterator<Item = &GenreEntry<T>> {
        std::iter::successors(self.head.as_deref(), |entry| entry.next.as_deref())
    }

    fn find(&self, key: &str) -> Option<&GenreEntry<T>> {
        self.entries().find(|entry| entry.key == key)
    }

    fn find_mut(&mut self, key: &str) -> Option<&mut GenreEntry<T>> {
        let mut cursor = self.head.as_deref_mut();
        while let Some(entry) = cursor {
            if entry.key == key {
                return Some(entry);
            }
            cursor = entry.next.as_deref_mut();
        }
        None
    }
}

impl<T: Clone> GenreIndex<T> {
    /// Snapshot of the items under `genre`, most recent first
    ///
    /// Unknown genres yield an empty list.
    pub fn items(&self, genre: &str) -> Vec<T> {
        self.find(&genre_key(genre))
            .map(|entry| entry.items.to_vec())
            .unwrap_or_default()
    }
}

impl<T> Default for GenreIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for GenreIndex<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_groups_case_insensitively() {
        let mut index = GenreIndex::new();
        index.add("Rock", 1);
        index.add("rock", 2);
        index.add("ROCK", 3);

        assert_eq!(index.genres(), vec!["Rock".to_string()]);
        assert_eq!(index.items("rOcK"), vec![3, 2, 1]);
    }

    #[test]
    fn test_genres_sorted_case_insensitively() {
        let mut index = GenreIndex::new();
        index.add("jazz", 1);
        index.add("Blues", 2);
        index.add("ambient", 3);

        assert_eq!(index.genres(), vec!["ambient", "Blues", "jazz"]);
    }

    #[test]
    fn test_remove() {
        let mut index = GenreIndex::new();
        index.add("Pop", 1);
        index.add("Pop", 2);

        assert!(index.remove("pop", |&x| x == 1));
        assert!(!index.remove("pop", |&x| x == 1));
        assert!(!index.remove("Metal", |&x| x == 2));
        assert_eq!(index.items("Pop"), vec![2]);
    }

    #[test]
    fn test_empty_genre_entry_survives() {
        let mut index = GenreIndex::new();
        index.add("Pop", 1);
        index.remove("Pop", |&x| x == 1);

        assert!(index.contains_genre("pop"));
        assert!(index.items("Pop").is_empty());
        assert_eq!(index.genres(), vec!["Pop"]);
    }

    #[test]
    fn test_unknown_genre_is_empty() {
        let index: GenreIndex<u32> = GenreIndex::new();
        assert!(index.items("Nope").is_empty());
        assert!(index.genres().is_empty());
    }
}
