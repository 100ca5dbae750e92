//! The library coordinator
//!
//! [`MusicLibrary`] owns every index and all playback state, and is the only
//! thing allowed to mutate them. After each public call returns:
//! - the master list and the id map hold the same ids,
//! - each song sits in exactly one genre bucket, its current genre,
//! - the title tree is keyed by current titles,
//! - the similarity graph has a node per song and nothing for deleted ids,
//! - queue, history and playlists only mention live ids.

use super::config::LibraryConfig;
use super::error::{LibraryError, Result};
use super::similarity::{build_similarity_edges, relink_song};
use super::source::MediaSource;
use crate::collections::{GenreIndex, Queue, SinglyLinkedList, SongGraph, Stack, TitleTree};
use crate::model::{Playlist, Song, SongId, SongUpdate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

/// Coordinates the song indexes and the playback state
pub struct MusicLibrary<S: MediaSource> {
    config: LibraryConfig,
    source: S,

    /// Master list, in scan order
    songs: SinglyLinkedList<SongId>,

    /// id -> song record; the only place song data lives
    index: HashMap<SongId, Song>,

    genres: GenreIndex<SongId>,
    titles: TitleTree<SongId>,
    graph: SongGraph,

    /// "Up next" requests
    queue: Queue<SongId>,

    /// Played songs, most recent on top
    history: Stack<SongId>,

    playlists: HashMap<String, Playlist>,
    next_id: SongId,
    rng: StdRng,
}

impl<S: MediaSource> MusicLibrary<S> {
    /// Create a library over `source` and run the initial scan
    pub fn open(config: LibraryConfig, source: S) -> Result<Self> {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut library = Self {
            config,
            source,
            songs: SinglyLinkedList::new(),
            index: HashMap::new(),
            genres: GenreIndex::new(),
            titles: TitleTree::new(),
            graph: SongGraph::new(),
            queue: Queue::new(),
            history: Stack::new(),
            playlists: HashMap::new(),
            next_id: 1,
            rng,
        };
        library.rescan()?;
        Ok(library)
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the source; changes show up on the next rescan
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    // -----------------------
    // Scanning
    // -----------------------

    /// Rebuild every index from a fresh listing
    ///
    /// Ids restart at 1. Queue, history and playlists survive, minus entries
    /// that no longer resolve (or are cleared entirely when
    /// `reset_playback_on_rescan` is set). Returns the number of songs.
    pub fn rescan(&mut self) -> Result<usize> {
        log::info!("Rescanning media library...");
        // List before tearing anything down so a failed listing changes nothing
        let files = self.source.list_media()?;
        let previous: HashMap<SongId, String> = self
            .index
            .iter()
            .map(|(id, song)| (*id, song.file_path.clone()))
            .collect();

        self.songs.clear();
        self.index.clear();
        self.genres.clear();
        self.titles.clear();
        self.graph.clear();
        self.next_id = 1;

        for file in &files {
            let song = file.to_song(self.next_id, self.config.default_year);
            self.next_id += 1;
            self.insert_song(song);
        }

        let ordered: Vec<&Song> = self.songs.iter().filter_map(|id| self.index.get(id)).collect();
        build_similarity_edges(&mut self.graph, &ordered);

        self.reconcile_playback(&previous);

        log::info!(
            "Library loaded: {} songs, {} genres, {} similarity links",
            self.index.len(),
            self.genres.genres().len(),
            self.graph.edge_count()
        );
        Ok(self.index.len())
    }

    fn insert_song(&mut self, song: Song) {
        let id = song.id;
        log::debug!("Indexing song {}: {}", id, song.title);

        self.songs.append(id);
        self.genres.add(&song.genre, id);
        self.titles.insert(&song.index_title(), id);
        self.graph.add_node(id);
        self.index.insert(id, song);
    }

    /// Bring queue, history and playlists in line with a fresh id space
    fn reconcile_playback(&mut self, previous: &HashMap<SongId, String>) {
        if self.config.reset_playback_on_rescan {
            self.queue.clear();
            self.history.clear();
            for playlist in self.playlists.values_mut() {
                playlist.clear();
            }
            log::info!("Cleared queue, history and playlist contents");
            return;
        }

        let before = self.playback_entry_count();
        let index = &self.index;
        self.queue.retain(|id| index.contains_key(id));
        self.history.retain(|id| index.contains_key(id));
        for playlist in self.playlists.values_mut() {
            playlist.retain(|id| index.contains_key(&id));
        }
        let after = self.playback_entry_count();

        if after < before {
            log::warn!(
                "Dropped {} queue/history/playlist entries that no longer resolve",
                before - after
            );
        }

        let relocated = self.relocated_entries(previous);
        if relocated > 0 {
            log::warn!(
                "{} queue/history/playlist entries now name a different file; ids were reassigned",
                relocated
            );
        } else if after > 0 {
            log::info!("Kept {} queue/history/playlist entries across rescan", after);
        }
    }

    /// Playback entries whose id now points at another file than before
    fn relocated_entries(&self, previous: &HashMap<SongId, String>) -> usize {
        let moved = |id: &SongId| match (previous.get(id), self.index.get(id)) {
            (Some(before), Some(song)) => *before != song.file_path,
            _ => false,
        };

        let playlist_ids = self.playlists.values().flat_map(Playlist::song_ids);
        self.queue
            .iter()
            .chain(self.history.iter())
            .copied()
            .chain(playlist_ids)
            .filter(|id| moved(id))
            .count()
    }

    fn playback_entry_count(&self) -> usize {
        self.queue.len()
            + self.history.len()
            + self.playlists.values().map(Playlist::len).sum::<usize>()
    }

    // -----------------------
    // Library
    // -----------------------

    /// All songs in scan order
    pub fn songs(&self) -> Vec<&Song> {
        self.resolve(self.songs.iter().copied())
    }

    /// Single-song lookup that reports a missing id
    pub fn song(&self, id: SongId) -> Result<&Song> {
        self.index.get(&id).ok_or(LibraryError::SongNotFound(id))
    }

    pub fn get(&self, id: SongId) -> Option<&Song> {
        self.index.get(&id)
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    /// Apply the present fields of `update` to song `id`
    ///
    /// Re-files the genre bucket, rebuilds the title index on a title change
    /// and rescores the song's similarity links when artist, genre or year
    /// moved. Returns false for an unknown id.
    pub fn update(&mut self, id: SongId, update: &SongUpdate) -> bool {
        let Some(song) = self.index.get_mut(&id) else {
            log::debug!("Update of unknown song {} ignored", id);
            return false;
        };

        let old_genre = song.genre.clone();
        let changes = song.apply(update);
        let new_genre = song.genre.clone();

        if changes.genre {
            self.genres.remove(&old_genre, |&s| s == id);
            self.genres.add(&new_genre, id);
        }

        if changes.title {
            self.rebuild_title_index();
        }

        if changes.affects_similarity() {
            let song = &self.index[&id];
            let others = self
                .songs
                .iter()
                .filter(|&&other| other != id)
                .filter_map(|other| self.index.get(other));
            relink_song(&mut self.graph, song, others);
        }

        log::info!("Updated song {}", id);
        true
    }

    /// Remove song `id` from every index, the queue, history and playlists
    ///
    /// Returns false for an unknown id.
    pub fn delete(&mut self, id: SongId) -> bool {
        let Some(song) = self.index.remove(&id) else {
            log::debug!("Delete of unknown song {} ignored", id);
            return false;
        };

        self.songs.remove_first(|&s| s == id);
        self.genres.remove(&song.genre, |&s| s == id);
        self.rebuild_title_index();
        self.queue.retain(|&s| s != id);
        self.history.retain(|&s| s != id);
        for playlist in self.playlists.values_mut() {
            playlist.remove_all(id);
        }
        self.graph.remove_node(id);

        log::info!("Deleted song {}: {}", id, song.title);
        true
    }

    fn rebuild_title_index(&mut self) {
        self.titles.clear();
        for id in self.songs.iter() {
            if let Some(song) = self.index.get(id) {
                self.titles.insert(&song.index_title(), *id);
            }
        }
    }

    fn resolve<I>(&self, ids: I) -> Vec<&Song>
    where
        I: IntoIterator<Item = SongId>,
    {
        ids.into_iter().filter_map(|id| self.index.get(&id)).collect()
    }

    // -----------------------
    // Favorites
    // -----------------------

    /// Flip the favorite flag, returning the new value
    pub fn toggle_favorite(&mut self, id: SongId) -> Option<bool> {
        let song = self.index.get_mut(&id)?;
        song.is_favorite = !song.is_favorite;
        Some(song.is_favorite)
    }

    pub fn favorites(&self) -> Vec<&Song> {
        self.songs().into_iter().filter(|song| song.is_favorite).collect()
    }

    // -----------------------
    // Genres
    // -----------------------

    /// Genre names, sorted case-insensitively
    pub fn genres(&self) -> Vec<String> {
        self.genres.genres()
    }

    /// Songs filed under `genre` (any casing), most recently added first
    pub fn songs_in_genre(&self, genre: &str) -> Vec<&Song> {
        self.resolve(self.genres.items(genre))
    }

    // -----------------------
    // Search
    // -----------------------

    /// Exact title match, or every title containing `query` if none
    pub fn search_by_title(&self, query: &str) -> Vec<&Song> {
        if let Some(&id) = self.titles.search(query) {
            return self.resolve([id]);
        }
        self.resolve(self.titles.partial_match(query).into_iter().copied())
    }

    // -----------------------
    // Playlists
    // -----------------------

    /// Create an empty playlist unless one with this name exists
    pub fn create_playlist(&mut self, name: &str) {
        if !self.playlists.contains_key(name) {
            log::info!("Created playlist {}", name);
            self.playlists
                .insert(name.to_string(), Playlist::new(name.to_string()));
        }
    }

    pub fn delete_playlist(&mut self, name: &str) -> bool {
        self.playlists.remove(name).is_some()
    }

    /// Playlist names, sorted case-insensitively
    pub fn playlist_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.playlists.keys().cloned().collect();
        names.sort_by_key(|name| name.to_lowercase());
        names
    }

    pub fn playlist(&self, name: &str) -> Option<&Playlist> {
        self.playlists.get(name)
    }

    /// Append song `id` to playlist `name`, creating the playlist if needed
    ///
    /// Unknown ids are not added; returns whether the song was.
    pub fn add_to_playlist(&mut self, name: &str, id: SongId) -> bool {
        self.create_playlist(name);
        let known = self.index.contains_key(&id);
        match self.playlists.get_mut(name) {
            Some(playlist) if known => {
                playlist.add(id);
                true
            }
            _ => false,
        }
    }

    /// Remove the first occurrence of `id` from playlist `name`
    pub fn remove_from_playlist(&mut self, name: &str, id: SongId) -> bool {
        self.playlists
            .get_mut(name)
            .is_some_and(|playlist| playlist.remove(id))
    }

    /// Songs of playlist `name` in order, empty if there is no such playlist
    pub fn playlist_songs(&self, name: &str) -> Vec<&Song> {
        match self.playlists.get(name) {
            Some(playlist) => self.resolve(playlist.song_ids()),
            None => Vec::new(),
        }
    }

    // -----------------------
    // Queue
    // -----------------------

    /// Queue song `id` to play next; unknown ids are ignored
    pub fn enqueue(&mut self, id: SongId) -> bool {
        if !self.index.contains_key(&id) {
            log::debug!("Enqueue of unknown song {} ignored", id);
            return false;
        }
        self.queue.enqueue(id);
        true
    }

    pub fn dequeue(&mut self) -> Option<&Song> {
        let id = self.queue.dequeue()?;
        self.index.get(&id)
    }

    /// Queued songs, next to play first
    pub fn queue(&self) -> Vec<&Song> {
        self.resolve(self.queue.iter().copied())
    }

    // -----------------------
    // History
    // -----------------------

    /// Count a play of song `id` and push it onto the history
    pub fn record_play(&mut self, id: SongId) -> Option<&Song> {
        let song = self.index.get_mut(&id)?;
        song.play_count += 1;
        self.history.push(id);
        log::debug!("Recorded play of song {} ({} plays)", id, song.play_count);
        Some(&*song)
    }

    /// Up to `limit` most recently played songs, newest first
    pub fn history(&self, limit: usize) -> Vec<&Song> {
        self.resolve(self.history.iter().take(limit).copied())
    }

    /// History capped at the configured default length
    pub fn recent_history(&self) -> Vec<&Song> {
        self.history(self.config.history_limit)
    }

    // -----------------------
    // Similarity
    // -----------------------

    /// Raw neighbour ids of song `id`
    pub fn similar_ids(&self, id: SongId) -> Vec<SongId> {
        self.graph.neighbors(id)
    }

    /// Neighbours of song `id` that resolve to songs
    pub fn similar_songs(&self, id: SongId) -> Vec<&Song> {
        self.resolve(self.graph.neighbors(id))
    }

    // -----------------------
    // Playback sequencing
    // -----------------------

    /// Decide what plays after `current`
    ///
    /// In order: the next song of `playlist` if it contains `current`, the
    /// head of the queue, a random similar song, a random library song.
    /// Returns None only when the library is empty.
    pub fn next_song(&mut self, current: Option<SongId>, playlist: Option<&str>) -> Option<&Song> {
        let id = self.pick_next(current, playlist)?;
        self.index.get(&id)
    }

    /// Decide what plays before `current`
    ///
    /// The previous song of `playlist` if it contains `current`, otherwise
    /// the history top, skipping over `current` when it is the top entry.
    pub fn previous_song(
        &mut self,
        current: Option<SongId>,
        playlist: Option<&str>,
    ) -> Option<&Song> {
        let id = self.pick_previous(current, playlist)?;
        self.index.get(&id)
    }

    fn pick_next(&mut self, current: Option<SongId>, playlist: Option<&str>) -> Option<SongId> {
        if let (Some(current), Some(name)) = (current, playlist) {
            if let Some(next) = self.playlists.get(name).and_then(|p| p.next_of(current)) {
                log::debug!("Next from playlist {}: {}", name, next);
                return Some(next);
            }
        }

        if let Some(queued) = self.queue.dequeue() {
            log::debug!("Next from queue: {}", queued);
            return Some(queued);
        }

        if let Some(current) = current {
            let mut neighbors = self.graph.neighbors(current);
            neighbors.shuffle(&mut self.rng);
            if let Some(similar) = neighbors.into_iter().find(|id| self.index.contains_key(id)) {
                log::debug!("Next from similar songs: {}", similar);
                return Some(similar);
            }
        }

        let ids: Vec<SongId> = self.songs.iter().copied().collect();
        let random = ids.choose(&mut self.rng).copied();
        log::debug!("Next at random: {:?}", random);
        random
    }

    fn pick_previous(&mut self, current: Option<SongId>, playlist: Option<&str>) -> Option<SongId> {
        if let (Some(current), Some(name)) = (current, playlist) {
            if let Some(prev) = self.playlists.get(name).and_then(|p| p.prev_of(current)) {
                log::debug!("Previous from playlist {}: {}", name, prev);
                return Some(prev);
            }
        }

        let top = self.history.pop()?;
        if Some(top) == current {
            // The top entry is the song now playing
            return self.history.pop();
        }
        Some(top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::genre::genre_key;
    use crate::collections::title_tree::title_key;
    use crate::library::source::{MediaFile, StaticSource, TrackHints};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn hinted(file_name: &str, title: &str, artist: &str, genre: &str, year: i32) -> MediaFile {
        MediaFile::new("static/music", file_name).with_hints(TrackHints {
            title: Some(title.to_string()),
            artist: Some(artist.to_string()),
            genre: Some(genre.to_string()),
            year: Some(year),
            ..TrackHints::default()
        })
    }

    fn open(files: Vec<MediaFile>) -> MusicLibrary<StaticSource> {
        let config = LibraryConfig::default().with_shuffle_seed(7);
        MusicLibrary::open(config, StaticSource::new(files)).unwrap()
    }

    /// A (1, "X", Rock, 2020), B (2, "X", Pop, 2021), C (3, "Y", Jazz, 1990)
    fn abc_library() -> MusicLibrary<StaticSource> {
        open(vec![
            hinted("a.mp3", "Alpha", "X", "Rock", 2020),
            hinted("b.mp3", "Bravo", "X", "Pop", 2021),
            hinted("c.mp3", "Charlie", "Y", "Jazz", 1990),
        ])
    }

    fn mixed_library() -> MusicLibrary<StaticSource> {
        open(vec![
            hinted("01.mp3", "Morning", "Ana", "Rock", 2001),
            hinted("02.mp3", "Evening", "Ana", "Pop", 2003),
            hinted("03.mp3", "Night Drive", "Ben", "Rock", 1995),
            hinted("04.mp3", "Daylight", "Cy", "Jazz", 1980),
            hinted("05.mp3", "Morning Glory", "Cy", "jazz", 1982),
            hinted("06.mp3", "Outro", "Dee", "Ambient", 2020),
            hinted("07.mp3", "Intro", "Dee", "Ambient", 2021),
            hinted("08.mp3", "Interlude", "Eve", "Pop", 2010),
        ])
    }

    fn ids(songs: Vec<&Song>) -> Vec<SongId> {
        songs.into_iter().map(|song| song.id).collect()
    }

    /// Check every cross-structure invariant
    fn assert_consistent<S: MediaSource>(library: &MusicLibrary<S>) -> std::result::Result<(), String> {
        let listed: Vec<SongId> = library.songs.iter().copied().collect();
        let unique: HashSet<SongId> = listed.iter().copied().collect();
        if listed.len() != library.index.len() || unique.len() != listed.len() {
            return Err(format!(
                "master list has {} ids ({} unique), index has {}",
                listed.len(),
                unique.len(),
                library.index.len()
            ));
        }

        let genre_names = library.genres.genres();
        let mut titles = HashSet::new();
        for (&id, song) in &library.index {
            if !unique.contains(&id) {
                return Err(format!("song {id} missing from master list"));
            }
            for genre in &genre_names {
                let filed = library.genres.items(genre).contains(&id);
                let expected = genre_key(genre) == genre_key(&song.genre);
                if filed != expected {
                    return Err(format!("song {id} filed={filed} under genre {genre}"));
                }
            }
            let key = title_key(&song.index_title());
            let hit = library.titles.search(&key).and_then(|hit| library.index.get(hit));
            if hit.map(|s| title_key(&s.index_title())) != Some(key.clone()) {
                return Err(format!("title index has no usable entry for song {id}"));
            }
            titles.insert(key);
            if !library.graph.contains(id) {
                return Err(format!("song {id} missing from similarity graph"));
            }
        }
        if titles.len() != library.titles.len() {
            return Err(format!("title index has {} keys, expected {}", library.titles.len(), titles.len()));
        }
        if library.graph.len() != library.index.len() {
            return Err(format!("graph has {} nodes for {} songs", library.graph.len(), library.index.len()));
        }
        for &id in &listed {
            if library.similar_ids(id).iter().any(|n| !library.index.contains_key(n)) {
                return Err(format!("song {id} links to a missing song"));
            }
        }

        let playback: Vec<SongId> = library
            .queue
            .iter()
            .chain(library.history.iter())
            .copied()
            .chain(library.playlists.values().flat_map(Playlist::song_ids))
            .collect();
        if let Some(stale) = playback.iter().find(|id| !library.index.contains_key(id)) {
            return Err(format!("playback state mentions missing song {stale}"));
        }
        Ok(())
    }

    #[test]
    fn test_open_indexes_every_file() {
        let source = StaticSource::from_file_names("static/music", ["b_side.mp3", "a_side.wav"]);
        let library = MusicLibrary::open(LibraryConfig::default(), source).unwrap();

        let songs = library.songs();
        assert_eq!(library.song_count(), 2);
        assert_eq!(songs[0].id, 1);
        assert_eq!(songs[0].title, "a side");
        assert_eq!(songs[0].file_path, "static/music/a_side.wav");
        assert_eq!(songs[1].title, "b side");
        assert_eq!(library.genres(), vec!["Unknown"]);
        // Same placeholder artist and genre link everything
        assert_eq!(library.similar_ids(1), vec![2]);
        assert_consistent(&library).unwrap();
    }

    #[test]
    fn test_similarity_scenario() {
        let library = abc_library();

        assert_eq!(library.similar_ids(1), vec![2]);
        assert!(library.similar_ids(3).is_empty());
        assert_eq!(ids(library.similar_songs(2)), vec![1]);
    }

    #[test]
    fn test_song_lookup_signals_not_found() {
        let library = abc_library();

        assert_eq!(library.song(2).unwrap().title, "Bravo");
        assert!(matches!(library.song(99), Err(LibraryError::SongNotFound(99))));
        assert!(library.get(99).is_none());
    }

    #[test]
    fn test_search_exact_then_partial() {
        let library = mixed_library();

        assert_eq!(ids(library.search_by_title("morning")), vec![1]);
        assert_eq!(ids(library.search_by_title("NIGHT DRIVE")), vec![3]);

        let mut partial = ids(library.search_by_title("in"));
        partial.sort();
        assert_eq!(partial, vec![1, 2, 5, 7, 8]);
        assert!(library.search_by_title("zzz").is_empty());
    }

    #[test]
    fn test_unique_titles_round_trip() {
        let library = mixed_library();
        for song in library.songs() {
            assert_eq!(ids(library.search_by_title(&song.title)), vec![song.id]);
        }
    }

    #[test]
    fn test_genre_listing_is_case_insensitive() {
        let library = mixed_library();

        assert_eq!(library.genres(), vec!["Ambient", "Jazz", "Pop", "Rock"]);
        assert_eq!(ids(library.songs_in_genre("JAZZ")), vec![5, 4]);
        assert!(library.songs_in_genre("Metal").is_empty());
    }

    #[test]
    fn test_update_genre_moves_bucket() {
        let mut library = mixed_library();
        let genres_before = library.genres();

        assert!(library.update(1, &SongUpdate::new().with_genre("Pop")));

        assert!(ids(library.songs_in_genre("Pop")).contains(&1));
        assert!(!ids(library.songs_in_genre("Rock")).contains(&1));
        assert_eq!(library.genres(), genres_before);
        assert_consistent(&library).unwrap();
    }

    #[test]
    fn test_update_title_rebuilds_title_index() {
        let mut library = mixed_library();

        library.update(6, &SongUpdate::new().with_title("Finale"));

        assert_eq!(ids(library.search_by_title("finale")), vec![6]);
        assert!(library.search_by_title("Outro").is_empty());
        assert_consistent(&library).unwrap();
    }

    #[test]
    fn test_update_relinks_similarity() {
        let mut library = abc_library();

        library.update(3, &SongUpdate::new().with_artist("X"));

        let mut neighbors = library.similar_ids(3);
        neighbors.sort();
        assert_eq!(neighbors, vec![1, 2]);
        assert!(library.similar_ids(1).contains(&3));

        library.update(3, &SongUpdate::new().with_artist("Z"));
        assert!(library.similar_ids(3).is_empty());
        assert_eq!(library.similar_ids(1), vec![2]);
        assert_consistent(&library).unwrap();
    }

    #[test]
    fn test_update_unknown_and_invalid_fields() {
        let mut library = abc_library();

        assert!(!library.update(42, &SongUpdate::new().with_title("x")));

        let update = SongUpdate::from_pairs([("year", "abc"), ("title", ""), ("album", "Live")]);
        assert!(library.update(1, &update));
        let song = library.song(1).unwrap();
        assert_eq!(song.year, 2020);
        assert_eq!(song.title, "Alpha");
        assert_eq!(song.album, "Live");
    }

    #[test]
    fn test_delete_removes_song_everywhere() {
        let mut library = mixed_library();
        library.enqueue(2);
        library.enqueue(3);
        library.enqueue(2);
        library.record_play(2);
        library.record_play(1);
        library.add_to_playlist("Mix", 2);
        library.add_to_playlist("Mix", 4);
        library.add_to_playlist("Mix", 2);

        assert!(library.delete(2));

        assert!(library.get(2).is_none());
        assert!(!ids(library.songs()).contains(&2));
        assert!(library.search_by_title("Evening").is_empty());
        assert!(library.search_by_title("even").is_empty());
        assert!(!ids(library.songs_in_genre("Pop")).contains(&2));
        assert_eq!(ids(library.queue()), vec![3]);
        assert_eq!(ids(library.history(10)), vec![1]);
        assert_eq!(ids(library.playlist_songs("Mix")), vec![4]);
        assert!(!library.graph.contains(2));
        assert!(!library.graph.is_referenced(2));
        assert_eq!(library.song_count(), 7);
        assert_consistent(&library).unwrap();

        assert!(!library.delete(2));
    }

    #[test]
    fn test_rescan_restarts_id_sequence() {
        let mut library = abc_library();
        library.delete(3);
        library.source_mut().push(hinted("d.mp3", "Delta", "Q", "Pop", 2000));

        // Only a rescan hands out ids again, and it restarts the sequence
        library.rescan().unwrap();
        assert_eq!(ids(library.songs()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_record_play_and_history_limit() {
        let mut library = mixed_library();
        for id in [1, 2, 3, 1] {
            library.record_play(id);
        }

        assert_eq!(library.song(1).unwrap().play_count, 2);
        assert_eq!(ids(library.history(3)), vec![1, 3, 2]);
        assert_eq!(library.recent_history().len(), 4);
        assert!(library.record_play(99).is_none());
    }

    #[test]
    fn test_enqueue_and_dequeue() {
        let mut library = abc_library();

        assert!(library.enqueue(3));
        assert!(!library.enqueue(99));
        assert!(library.enqueue(1));

        assert_eq!(ids(library.queue()), vec![3, 1]);
        assert_eq!(library.dequeue().map(|s| s.id), Some(3));
        assert_eq!(library.dequeue().map(|s| s.id), Some(1));
        assert!(library.dequeue().is_none());
    }

    #[test]
    fn test_previous_skips_current_song() {
        let mut library = abc_library();
        for id in [1, 2, 3] {
            library.record_play(id);
        }

        let previous = library.previous_song(Some(3), None).map(|s| s.id);
        assert_eq!(previous, Some(2));
        assert_eq!(ids(library.history(10)), vec![1]);
    }

    #[test]
    fn test_previous_returns_top_when_not_current() {
        let mut library = abc_library();
        library.record_play(1);
        library.record_play(2);

        assert_eq!(library.previous_song(Some(3), None).map(|s| s.id), Some(2));
        assert_eq!(library.previous_song(None, None).map(|s| s.id), Some(1));
        assert!(library.previous_song(None, None).is_none());
    }

    #[test]
    fn test_previous_prefers_playlist() {
        let mut library = abc_library();
        for id in [1, 2, 3] {
            library.add_to_playlist("Road Trip", id);
        }
        library.record_play(3);

        assert_eq!(library.previous_song(Some(2), Some("Road Trip")).map(|s| s.id), Some(1));
        // First entry has no previous: fall back to history
        assert_eq!(library.previous_song(Some(1), Some("Road Trip")).map(|s| s.id), Some(3));
    }

    #[test]
    fn test_next_prefers_playlist_over_queue() {
        let mut library = abc_library();
        for id in [1, 2, 3] {
            library.add_to_playlist("Road Trip", id);
        }
        library.enqueue(1);
        library.record_play(1);

        assert_eq!(library.next_song(Some(2), Some("Road Trip")).map(|s| s.id), Some(3));
        assert_eq!(ids(library.queue()), vec![1]);
    }

    #[test]
    fn test_next_falls_back_to_queue_at_playlist_end() {
        let mut library = abc_library();
        library.add_to_playlist("Road Trip", 1);
        library.add_to_playlist("Road Trip", 2);
        library.enqueue(3);

        assert_eq!(library.next_song(Some(2), Some("Road Trip")).map(|s| s.id), Some(3));
        assert!(library.queue().is_empty());
    }

    #[test]
    fn test_next_uses_similar_songs() {
        let mut library = abc_library();

        for _ in 0..10 {
            assert_eq!(library.next_song(Some(1), None).map(|s| s.id), Some(2));
        }
    }

    #[test]
    fn test_next_random_when_nothing_else() {
        let mut library = abc_library();

        // Song 3 has no similar songs, so this is a library-wide pick
        for _ in 0..10 {
            let next = library.next_song(Some(3), None).map(|s| s.id);
            assert!(matches!(next, Some(1..=3)));
        }
        let next = library.next_song(None, None).map(|s| s.id);
        assert!(matches!(next, Some(1..=3)));
    }

    #[test]
    fn test_next_on_empty_library() {
        let mut library = open(Vec::new());

        assert!(library.next_song(None, None).is_none());
        assert!(library.next_song(Some(1), Some("nope")).is_none());
        assert!(library.previous_song(None, None).is_none());
    }

    #[test]
    fn test_favorites() {
        let mut library = abc_library();

        assert_eq!(library.toggle_favorite(2), Some(true));
        assert_eq!(library.toggle_favorite(3), Some(true));
        assert_eq!(library.toggle_favorite(3), Some(false));
        assert_eq!(library.toggle_favorite(9), None);
        assert_eq!(ids(library.favorites()), vec![2]);
    }

    #[test]
    fn test_playlist_management() {
        let mut library = abc_library();

        library.create_playlist("zeta");
        library.create_playlist("Alpha");
        library.create_playlist("zeta");
        assert!(library.add_to_playlist("beta", 1));
        assert!(!library.add_to_playlist("beta", 77));

        assert_eq!(library.playlist_names(), vec!["Alpha", "beta", "zeta"]);
        assert_eq!(ids(library.playlist_songs("beta")), vec![1]);
        assert!(library.playlist_songs("missing").is_empty());

        assert!(library.remove_from_playlist("beta", 1));
        assert!(!library.remove_from_playlist("beta", 1));
        assert!(!library.remove_from_playlist("missing", 1));

        assert!(library.delete_playlist("zeta"));
        assert!(!library.delete_playlist("zeta"));
        assert_eq!(library.playlist_names(), vec!["Alpha", "beta"]);
    }

    #[test]
    fn test_rescan_prunes_unresolvable_playback_entries() {
        let mut library = abc_library();
        library.enqueue(3);
        library.record_play(3);
        library.record_play(1);
        library.add_to_playlist("p", 3);
        library.add_to_playlist("p", 2);

        library.source_mut().remove("c.mp3");
        assert_eq!(library.rescan().unwrap(), 2);

        assert!(library.queue().is_empty());
        assert_eq!(ids(library.history(10)), vec![1]);
        assert_eq!(ids(library.playlist_songs("p")), vec![2]);
        assert_consistent(&library).unwrap();
    }

    #[test]
    fn test_relocated_entries_after_rescan() {
        let mut library = abc_library();
        library.enqueue(2);
        library.record_play(3);
        library.add_to_playlist("p", 1);

        let snapshot = |library: &MusicLibrary<StaticSource>| -> HashMap<SongId, String> {
            library
                .songs()
                .into_iter()
                .map(|song| (song.id, song.file_path.clone()))
                .collect()
        };

        // Same files, same ids: nothing moved
        let before = snapshot(&library);
        library.rescan().unwrap();
        assert_eq!(library.relocated_entries(&before), 0);

        // Removing a.mp3 shifts b.mp3 to id 1 and c.mp3 to id 2
        let before = snapshot(&library);
        library.source_mut().remove("a.mp3");
        library.rescan().unwrap();
        assert_eq!(ids(library.queue()), vec![2]);
        assert_eq!(ids(library.playlist_songs("p")), vec![1]);
        assert!(library.history(10).is_empty());
        assert_eq!(library.relocated_entries(&before), 2);
    }

    #[test]
    fn test_delete_with_long_history() {
        let mut library = abc_library();
        for _ in 0..20_000 {
            library.record_play(1);
            library.record_play(2);
        }

        assert!(library.delete(3));
        assert_eq!(library.history(usize::MAX).len(), 40_000);

        assert!(library.delete(2));
        let remaining = library.history(usize::MAX);
        assert_eq!(remaining.len(), 20_000);
        assert!(remaining.iter().all(|song| song.id == 1));
        assert_consistent(&library).unwrap();
    }

    #[test]
    fn test_rescan_can_reset_playback_state() {
        let config = LibraryConfig::default().with_reset_playback_on_rescan(true);
        let source = StaticSource::from_file_names("m", ["a.mp3", "b.mp3"]);
        let mut library = MusicLibrary::open(config, source).unwrap();
        library.enqueue(1);
        library.record_play(2);
        library.add_to_playlist("p", 1);

        library.rescan().unwrap();

        assert!(library.queue().is_empty());
        assert!(library.history(10).is_empty());
        assert_eq!(library.playlist_names(), vec!["p"]);
        assert!(library.playlist_songs("p").is_empty());
    }

    proptest! {
        #[test]
        fn invariants_hold_after_random_operations(
            ops in proptest::collection::vec((0u8..11, 1u32..11), 1..60)
        ) {
            let mut library = mixed_library();
            let genres = ["Rock", "pop", "Jazz", "Metal"];
            let mut current: Option<SongId> = None;

            for (op, id) in ops {
                let genre = genres[id as usize % genres.len()];
                match op {
                    0 => {
                        library.update(id, &SongUpdate::new().with_genre(genre));
                    }
                    1 => {
                        library.update(id, &SongUpdate::new().with_title(format!("Title {}", id % 3)));
                    }
                    2 => {
                        library.delete(id);
                    }
                    3 => {
                        library.enqueue(id);
                    }
                    4 => {
                        library.record_play(id);
                    }
                    5 => {
                        library.add_to_playlist("p", id);
                    }
                    6 => {
                        current = library.next_song(current, Some("p")).map(|s| s.id);
                    }
                    7 => {
                        current = library.previous_song(current, Some("p")).map(|s| s.id);
                    }
                    8 => {
                        library.update(id, &SongUpdate::new().with_artist(genre).with_year(1990 + id as i32));
                    }
                    9 => {
                        library.toggle_favorite(id);
                    }
                    _ => {
                        library.rescan().unwrap();
                    }
                }

                prop_assert_eq!(library.song_count(), library.index.len());
                if let Err(problem) = assert_consistent(&library) {
                    prop_assert!(false, "after op {} on {}: {}", op, id, problem);
                }
            }
        }
    }
}
