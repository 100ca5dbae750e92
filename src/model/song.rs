use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Library-assigned song identifier (sequential from 1 per rescan)
pub type SongId = u32;

/// Placeholder for artist, album and genre when nothing better is known
pub const UNKNOWN: &str = "Unknown";

/// Years accepted by [`SongUpdate`]; anything else is ignored
const VALID_YEARS: RangeInclusive<i32> = 1..=9999;

/// A single song and its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Unique identifier within the current scan
    pub id: SongId,

    /// Song title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name
    pub album: String,

    /// Genre, free text, never empty
    pub genre: String,

    /// Release year
    pub year: i32,

    /// Track duration in seconds
    pub duration_seconds: u32,

    /// Location relative to the media root, `/`-separated
    pub file_path: String,

    /// Number of recorded plays
    pub play_count: u32,

    /// Favorite flag
    pub is_favorite: bool,
}

impl Song {
    /// Create a song with placeholder metadata
    pub fn new(id: SongId, title: impl Into<String>, file_path: impl Into<String>, year: i32) -> Self {
        Self {
            id,
            title: title.into(),
            artist: UNKNOWN.to_string(),
            album: UNKNOWN.to_string(),
            genre: UNKNOWN.to_string(),
            year,
            duration_seconds: 0,
            file_path: file_path.into(),
            play_count: 0,
            is_favorite: false,
        }
    }

    /// Key used by the title index; untitled songs fall back to their id
    pub fn index_title(&self) -> String {
        if self.title.is_empty() {
            self.id.to_string()
        } else {
            self.title.clone()
        }
    }

    /// Apply every present, valid field of `update`
    ///
    /// Blank strings and out-of-range years are skipped field by field.
    pub fn apply(&mut self, update: &SongUpdate) -> SongChanges {
        let mut changes = SongChanges::default();

        if let Some(title) = non_blank(&update.title) {
            changes.title = self.title != title;
            self.title = title.to_string();
        }
        if let Some(artist) = non_blank(&update.artist) {
            changes.artist = self.artist != artist;
            self.artist = artist.to_string();
        }
        if let Some(album) = non_blank(&update.album) {
            self.album = album.to_string();
        }
        if let Some(genre) = non_blank(&update.genre) {
            changes.genre = self.genre != genre;
            self.genre = genre.to_string();
        }
        if let Some(year) = update.year.filter(|year| VALID_YEARS.contains(year)) {
            changes.year = self.year != year;
            self.year = year;
        }
        if let Some(duration) = update.duration_seconds {
            self.duration_seconds = duration;
        }
        if let Some(favorite) = update.is_favorite {
            self.is_favorite = favorite;
        }

        changes
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>4}  {} - {} [{}, {}]",
            self.id, self.title, self.artist, self.genre, self.year
        )?;
        if self.is_favorite {
            write!(f, " *")?;
        }
        Ok(())
    }
}

/// Which index-relevant fields an update actually changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SongChanges {
    pub title: bool,
    pub artist: bool,
    pub genre: bool,
    pub year: bool,
}

impl SongChanges {
    /// Whether the similarity score inputs moved
    pub fn affects_similarity(&self) -> bool {
        self.artist || self.genre || self.year
    }
}

/// Partial update of a song; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub duration_seconds: Option<u32>,
    pub is_favorite: Option<bool>,
}

impl SongUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Build an update from loose `key=value` style pairs
    ///
    /// Unknown keys and values that fail to parse are dropped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut update = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref().trim().to_lowercase().as_str() {
                "title" => update.title = Some(value.to_string()),
                "artist" => update.artist = Some(value.to_string()),
                "album" => update.album = Some(value.to_string()),
                "genre" => update.genre = Some(value.to_string()),
                "year" => update.year = value.parse().ok(),
                "duration" | "duration_seconds" => update.duration_seconds = value.parse().ok(),
                "favorite" | "is_favorite" => update.is_favorite = parse_flag(value),
                other => log::debug!("Ignoring unknown song field: {}", other),
            }
        }
        update
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}
