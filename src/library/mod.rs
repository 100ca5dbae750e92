//! Library coordination
//!
//! Scans a [`MediaSource`] into the indexes of [`MusicLibrary`] and exposes
//! the single API for lookups, edits and playback sequencing.

pub mod config;
pub mod error;
pub mod manager;
pub mod similarity;
pub mod source;

pub use config::LibraryConfig;
pub use error::{LibraryError, Result};
pub use manager::MusicLibrary;
pub use source::{DirectorySource, MediaFile, MediaSource, StaticSource, TrackHints};
