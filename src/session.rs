//! Interactive playback session
//!
//! A [`PlaybackSession`] remembers what is playing and which playlist it came
//! from, and turns shell [`Command`]s into [`MusicLibrary`] calls. Starting,
//! skipping forward and skipping back all count as plays.

use crate::library::{LibraryError, MediaSource, MusicLibrary};
use crate::model::{Song, SongId, SongUpdate};

/// Errors from parsing a shell line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error("Not a song id: {0}")]
    InvalidId(String),

    #[error("Unclosed quote")]
    UnclosedQuote,
}

/// One shell command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play(SongId),
    Next,
    Prev,
    Enqueue(SongId),
    Dequeue,
    Queue,
    History(Option<usize>),
    /// Select a playlist as playback context, or leave it with no name
    Playlist(Option<String>),
    Playlists,
    Create(String),
    Add(String, SongId),
    Remove(String, SongId),
    Drop(String),
    Favorite(SongId),
    Favorites,
    Edit(SongId, SongUpdate),
    Delete(SongId),
    Rescan,
    Search(String),
    Songs,
    Similar(SongId),
    Genres,
    Genre(String),
    Status,
    Help,
    Quit,
}

const HELP: &str = "\
play <id> | next | prev | enqueue <id> | dequeue | queue | history [n]
playlist [name] | playlists | create <name> | add <name> <id> | remove <name> <id> | drop <name>
favorite <id> | favorites | edit <id> key=value... | delete <id> | rescan
search <query> | songs | similar <id> | genres | genre <name> | status | quit";

impl Command {
    /// Parse a shell line; blank lines yield `Ok(None)`
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let tokens = tokenize(line)?;
        let Some((name, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let command = match name.to_lowercase().as_str() {
            "play" => Command::Play(id_arg(args, 0)?),
            "next" => Command::Next,
            "prev" | "previous" => Command::Prev,
            "enqueue" => Command::Enqueue(id_arg(args, 0)?),
            "dequeue" => Command::Dequeue,
            "queue" => Command::Queue,
            "history" => Command::History(args.first().and_then(|n| n.parse().ok())),
            "playlist" => Command::Playlist(args.first().cloned()),
            "playlists" => Command::Playlists,
            "create" => Command::Create(text_arg(args, 0, "playlist name")?),
            "add" => Command::Add(text_arg(args, 0, "playlist name")?, id_arg(args, 1)?),
            "remove" => Command::Remove(text_arg(args, 0, "playlist name")?, id_arg(args, 1)?),
            "drop" => Command::Drop(text_arg(args, 0, "playlist name")?),
            "favorite" | "fav" => Command::Favorite(id_arg(args, 0)?),
            "favorites" => Command::Favorites,
            "edit" => {
                let id = id_arg(args, 0)?;
                let pairs = args[1..].iter().filter_map(|pair| pair.split_once('='));
                Command::Edit(id, SongUpdate::from_pairs(pairs))
            }
            "delete" => Command::Delete(id_arg(args, 0)?),
            "rescan" => Command::Rescan,
            "search" => {
                if args.is_empty() {
                    return Err(CommandError::MissingArgument("search query"));
                }
                Command::Search(args.join(" "))
            }
            "songs" | "list" => Command::Songs,
            "similar" => Command::Similar(id_arg(args, 0)?),
            "genres" => Command::Genres,
            "genre" => Command::Genre(text_arg(args, 0, "genre")?),
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Split on whitespace, keeping "double quoted" runs together
fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }

    if quoted {
        return Err(CommandError::UnclosedQuote);
    }
    if pending {
        tokens.push(current);
    }
    Ok(tokens)
}

fn id_arg(args: &[String], position: usize) -> Result<SongId, CommandError> {
    let raw = args.get(position).ok_or(CommandError::MissingArgument("song id"))?;
    raw.parse().map_err(|_| CommandError::InvalidId(raw.clone()))
}

fn text_arg(args: &[String], position: usize, what: &'static str) -> Result<String, CommandError> {
    args.get(position)
        .cloned()
        .ok_or(CommandError::MissingArgument(what))
}

/// What is playing, and from which playlist
#[derive(Debug, Clone, Default)]
pub struct PlaybackSession {
    current: Option<SongId>,
    playlist: Option<String>,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Song currently playing
    pub fn current(&self) -> Option<SongId> {
        self.current
    }

    /// Playlist used as next/previous context
    pub fn playlist(&self) -> Option<&str> {
        self.playlist.as_deref()
    }

    pub fn select_playlist(&mut self, name: Option<String>) {
        self.playlist = name;
    }

    /// Start song `id`, recording the play
    pub fn play<'a, S: MediaSource>(
        &mut self,
        library: &'a mut MusicLibrary<S>,
        id: SongId,
    ) -> Result<&'a Song, LibraryError> {
        let song = library.record_play(id).ok_or(LibraryError::SongNotFound(id))?;
        self.current = Some(id);
        Ok(song)
    }

    /// Skip forward and record the play of whatever comes next
    pub fn next<'a, S: MediaSource>(&mut self, library: &'a mut MusicLibrary<S>) -> Option<&'a Song> {
        let id = library.next_song(self.current, self.playlist.as_deref())?.id;
        self.current = Some(id);
        library.record_play(id)
    }

    /// Skip back and record the play of whatever came before
    pub fn previous<'a, S: MediaSource>(
        &mut self,
        library: &'a mut MusicLibrary<S>,
    ) -> Option<&'a Song> {
        let id = library.previous_song(self.current, self.playlist.as_deref())?.id;
        self.current = Some(id);
        library.record_play(id)
    }

    /// Run one command, returning the lines to show
    ///
    /// `Quit` is the caller's business and produces no output here.
    pub fn execute<S: MediaSource>(
        &mut self,
        library: &mut MusicLibrary<S>,
        command: Command,
    ) -> Result<Vec<String>, LibraryError> {
        let lines = match command {
            Command::Play(id) => vec![format!("Playing {}", self.play(library, id)?)],
            Command::Next => match self.next(library) {
                Some(song) => vec![format!("Playing {}", song)],
                None => vec!["No next song available".to_string()],
            },
            Command::Prev => match self.previous(library) {
                Some(song) => vec![format!("Playing {}", song)],
                None => vec!["No previous song available".to_string()],
            },
            Command::Enqueue(id) => {
                if !library.enqueue(id) {
                    return Err(LibraryError::SongNotFound(id));
                }
                song_lines(library.queue())
            }
            Command::Dequeue => match library.dequeue() {
                Some(song) => vec![format!("Removed {}", song)],
                None => vec!["Queue is empty".to_string()],
            },
            Command::Queue => song_lines(library.queue()),
            Command::History(limit) => {
                let limit = limit.unwrap_or(library.config().history_limit);
                song_lines(library.history(limit))
            }
            Command::Playlist(name) => {
                let line = match &name {
                    Some(name) => format!("Playing from playlist {}", name),
                    None => "Playing from the whole library".to_string(),
                };
                self.select_playlist(name);
                vec![line]
            }
            Command::Playlists => library
                .playlist_names()
                .into_iter()
                .map(|name| {
                    let count = library.playlist(&name).map_or(0, |p| p.len());
                    format!("{} ({} songs)", name, count)
                })
                .collect(),
            Command::Create(name) => {
                library.create_playlist(&name);
                vec![format!("Playlist {} ready", name)]
            }
            Command::Add(name, id) => {
                if !library.add_to_playlist(&name, id) {
                    return Err(LibraryError::SongNotFound(id));
                }
                song_lines(library.playlist_songs(&name))
            }
            Command::Remove(name, id) => {
                library.remove_from_playlist(&name, id);
                song_lines(library.playlist_songs(&name))
            }
            Command::Drop(name) => {
                if library.delete_playlist(&name) && self.playlist() == Some(name.as_str()) {
                    self.playlist = None;
                }
                vec![format!("Playlist {} removed", name)]
            }
            Command::Favorite(id) => match library.toggle_favorite(id) {
                Some(true) => vec![format!("Song {} is now a favorite", id)],
                Some(false) => vec![format!("Song {} is no longer a favorite", id)],
                None => return Err(LibraryError::SongNotFound(id)),
            },
            Command::Favorites => song_lines(library.favorites()),
            Command::Edit(id, update) => {
                if !library.update(id, &update) {
                    return Err(LibraryError::SongNotFound(id));
                }
                vec![library.song(id)?.to_string()]
            }
            Command::Delete(id) => {
                if !library.delete(id) {
                    return Err(LibraryError::SongNotFound(id));
                }
                if self.current == Some(id) {
                    self.current = None;
                }
                vec![format!("Deleted song {}", id)]
            }
            Command::Rescan => {
                let count = library.rescan()?;
                // Ids were reassigned; the old current id means nothing now
                self.current = None;
                vec![format!("Rescanned: {} songs", count)]
            }
            Command::Search(query) => song_lines(library.search_by_title(&query)),
            Command::Songs => song_lines(library.songs()),
            Command::Similar(id) => song_lines(library.similar_songs(id)),
            Command::Genres => library.genres(),
            Command::Genre(name) => song_lines(library.songs_in_genre(&name)),
            Command::Status => vec![format!(
                "{} songs, {} queued, playing {}",
                library.song_count(),
                library.queue().len(),
                self.current.map_or_else(|| "nothing".to_string(), |id| id.to_string())
            )],
            Command::Help => HELP.lines().map(str::to_string).collect(),
            Command::Quit => Vec::new(),
        };
        Ok(lines)
    }
}

fn song_lines(songs: Vec<&Song>) -> Vec<String> {
    if songs.is_empty() {
        return vec!["(none)".to_string()];
    }
    songs.into_iter().map(|song| song.to_string()).collect()
}
