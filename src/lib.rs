//! SonicWave - in-memory music library core
//!
//! Indexes a folder of songs by id, title, genre and similarity, and tracks
//! the playback state (up-next queue, history, playlists, favorites) that
//! decides what plays next or previous.

pub mod collections;
pub mod library;
pub mod model;
pub mod session;

pub use library::{LibraryConfig, LibraryError, MusicLibrary};
pub use model::{Playlist, Song, SongId, SongUpdate};
pub use session::PlaybackSession;
