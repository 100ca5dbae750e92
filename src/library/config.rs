//! Library configuration

use std::path::PathBuf;

/// Release year given to songs whose source supplies none
pub const DEFAULT_YEAR: i32 = 2024;

/// Configuration for a [`MusicLibrary`](super::MusicLibrary)
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Directory scanned for media files
    pub music_dir: PathBuf,

    /// File extensions (lowercase, no dot) picked up by a directory scan
    pub extensions: Vec<String>,

    /// Year assigned when the file metadata has none
    pub default_year: i32,

    /// Default number of history entries shown
    pub history_limit: usize,

    /// Seed for shuffle/random picks (None = seeded from entropy)
    pub shuffle_seed: Option<u64>,

    /// Clear playlists, queue and history on rescan instead of pruning
    /// entries that no longer resolve
    pub reset_playback_on_rescan: bool,
}

impl LibraryConfig {
    /// Create a configuration for the given media directory
    pub fn new(music_dir: PathBuf) -> Self {
        Self {
            music_dir,
            extensions: vec!["mp3".to_string(), "wav".to_string()],
            default_year: DEFAULT_YEAR,
            history_limit: 20,
            shuffle_seed: None,
            reset_playback_on_rescan: false,
        }
    }

    /// Set the accepted media extensions
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Set the fallback release year
    pub fn with_default_year(mut self, year: i32) -> Self {
        self.default_year = year;
        self
    }

    /// Set the default history length
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Make random picks reproducible
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Choose between clearing and pruning playback state on rescan
    pub fn with_reset_playback_on_rescan(mut self, reset: bool) -> Self {
        self.reset_playback_on_rescan = reset;
        self
    }

    /// Whether a file extension is one we index
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let extension = extension.to_lowercase();
        self.extensions.iter().any(|ext| *ext == extension)
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("static/music"))
    }
}
