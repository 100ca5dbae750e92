//! Library error types

use crate::model::SongId;
use std::path::PathBuf;

/// Errors surfaced by the library core
///
/// Business conditions (empty queue, unknown genre, ...) are not errors and
/// come back as empty results instead.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Song not found: {0}")]
    SongNotFound(SongId),

    #[error("Failed to list media directory {path:?}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T> = std::result::Result<T, LibraryError>;
