//! Media sources feeding a rescan
//!
//! The library never walks the filesystem itself; it asks a [`MediaSource`]
//! for a listing and derives songs from it. Tag extraction is out of scope,
//! so a directory listing only yields what the file name tells us.

use super::config::LibraryConfig;
use super::error::{LibraryError, Result};
use crate::model::{Song, SongId, UNKNOWN};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supplies the media files a rescan indexes
pub trait MediaSource {
    /// List media files, sorted by file name
    fn list_media(&self) -> Result<Vec<MediaFile>>;
}

/// One discovered media file
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    /// Bare file name (e.g. "Blue_Monday.mp3")
    pub file_name: String,

    /// Normalized relative location, `/`-separated
    pub location: String,

    /// Metadata the source already knows, if any
    pub hints: TrackHints,
}

/// Optional metadata supplied alongside a file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackHints {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub duration_seconds: Option<u32>,
}

impl MediaFile {
    /// A file located at `<prefix>/<file_name>`
    pub fn new(prefix: &str, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            location: join_location(prefix, &file_name),
            file_name,
            hints: TrackHints::default(),
        }
    }

    pub fn with_hints(mut self, hints: TrackHints) -> Self {
        self.hints = hints;
        self
    }

    /// Build the song record for this file
    ///
    /// Missing hints fall back to the file name for the title, "Unknown"
    /// for artist/album/genre, `default_year` and a zero duration.
    pub fn to_song(&self, id: SongId, default_year: i32) -> Song {
        let title = hint(&self.hints.title).unwrap_or_else(|| title_from_file_name(&self.file_name));
        let mut song = Song::new(id, title, self.location.clone(), self.hints.year.unwrap_or(default_year));

        song.artist = hint(&self.hints.artist).unwrap_or_else(|| UNKNOWN.to_string());
        song.album = hint(&self.hints.album).unwrap_or_else(|| UNKNOWN.to_string());
        song.genre = hint(&self.hints.genre).unwrap_or_else(|| UNKNOWN.to_string());
        song.duration_seconds = self.hints.duration_seconds.unwrap_or(0);
        song
    }
}

fn hint(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Derive a title from a file name: drop the extension, underscores to spaces
pub fn title_from_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
        .replace('_', " ")
}

/// Join a location prefix and file name with `/`, whatever the host separator
pub fn join_location(prefix: &str, file_name: &str) -> String {
    let prefix = prefix.replace('\\', "/");
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", prefix, file_name)
    }
}

/// Lists one directory level, keeping files with an accepted extension
#[derive(Debug, Clone)]
pub struct DirectorySource {
    config: LibraryConfig,
    location_prefix: String,
}

impl DirectorySource {
    /// Source for `config.music_dir`
    ///
    /// Locations are prefixed with the directory as given when it is
    /// relative, or with just its name when it is absolute.
    pub fn from_config(config: &LibraryConfig) -> Self {
        Self {
            location_prefix: default_location_prefix(&config.music_dir),
            config: config.clone(),
        }
    }

    /// Report locations under `prefix` instead
    pub fn with_location_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.location_prefix = prefix.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.config.music_dir
    }

    pub fn location_prefix(&self) -> &str {
        &self.location_prefix
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.config.accepts_extension(ext))
    }
}

/// Relative prefix for a music directory
pub fn default_location_prefix(music_dir: &Path) -> String {
    if music_dir.is_absolute() {
        music_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        music_dir.to_string_lossy().into_owned()
    }
}

impl MediaSource for DirectorySource {
    fn list_media(&self) -> Result<Vec<MediaFile>> {
        let root = self.root();
        log::debug!("Listing media in {:?}", root);
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|source| LibraryError::Scan {
                path: root.to_path_buf(),
                source,
            })?;

            if !entry.file_type().is_file() || !self.accepts(entry.path()) {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            files.push(MediaFile::new(&self.location_prefix, file_name));
        }

        log::debug!("Found {} media files", files.len());
        Ok(files)
    }
}

/// In-memory listing, for embedding hosts and tests
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    files: Vec<MediaFile>,
}

impl StaticSource {
    pub fn new(files: Vec<MediaFile>) -> Self {
        Self { files }
    }

    /// Files named `names`, located under `prefix`, without hints
    pub fn from_file_names<I, S>(prefix: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(|name| MediaFile::new(prefix, name)).collect())
    }

    /// Add a file to the listing
    pub fn push(&mut self, file: MediaFile) {
        self.files.push(file);
    }

    /// Drop every file with this name, returning whether any existed
    pub fn remove(&mut self, file_name: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|file| file.file_name != file_name);
        self.files.len() != before
    }
}

impl MediaSource for StaticSource {
    fn list_media(&self) -> Result<Vec<MediaFile>> {
        let mut files = self.files.clone();
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }
}
