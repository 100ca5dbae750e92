//! Similarity scoring between songs
//!
//! Two songs are linked in the [`SongGraph`] when their score reaches
//! [`SIMILARITY_THRESHOLD`]:
//! - same artist: +3
//! - same genre: +2
//! - release years at most two apart: +1
//!
//! Artist and genre only count when both sides are non-empty; comparison is
//! exact.

use crate::collections::SongGraph;
use crate::model::Song;

/// Minimum score for an edge
pub const SIMILARITY_THRESHOLD: u32 = 2;

const SAME_ARTIST: u32 = 3;
const SAME_GENRE: u32 = 2;
const CLOSE_YEAR: u32 = 1;
const CLOSE_YEAR_SPAN: i32 = 2;

/// Heuristic similarity between two songs
pub fn similarity_score(a: &Song, b: &Song) -> u32 {
    let mut score = 0;
    if !a.artist.is_empty() && a.artist == b.artist {
        score += SAME_ARTIST;
    }
    if !a.genre.is_empty() && a.genre == b.genre {
        score += SAME_GENRE;
    }
    if (a.year - b.year).abs() <= CLOSE_YEAR_SPAN {
        score += CLOSE_YEAR;
    }
    score
}

/// Whether two distinct songs deserve an edge
pub fn are_similar(a: &Song, b: &Song) -> bool {
    a.id != b.id && similarity_score(a, b) >= SIMILARITY_THRESHOLD
}

/// Score every unordered pair and add edges for the similar ones
///
/// Quadratic in the number of songs; only run on rescan.
pub fn build_similarity_edges(graph: &mut SongGraph, songs: &[&Song]) {
    for (i, a) in songs.iter().enumerate() {
        for b in &songs[i + 1..] {
            if are_similar(a, b) {
                graph.add_edge(a.id, b.id);
            }
        }
    }
    log::debug!(
        "Similarity graph: {} nodes, {} edges",
        graph.len(),
        graph.edge_count()
    );
}

/// Recompute the edges of a single song against the rest of the library
pub fn relink_song<'a, I>(graph: &mut SongGraph, song: &Song, others: I)
where
    I: IntoIterator<Item = &'a Song>,
{
    graph.remove_node(song.id);
    graph.add_node(song.id);
    for other in others {
        if are_similar(song, other) {
            graph.add_edge(song.id, other.id);
        }
    }
}
