//! Song and playlist records
//!
//! These types carry data only. The indexes that organise them live in
//! [`collections`](crate::collections) and are kept in step by
//! [`MusicLibrary`](crate::library::MusicLibrary).

mod playlist;
mod song;

pub use playlist::Playlist;
pub use song::{Song, SongChanges, SongId, SongUpdate, UNKNOWN};
