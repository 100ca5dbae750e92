use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sonicwave::library::{DirectorySource, MediaSource};
use sonicwave::session::{Command, PlaybackSession};
use sonicwave::{LibraryConfig, LibraryError, MusicLibrary, Song, SongId};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "sonicwave")]
#[command(about = "Browse and play a folder of songs", long_about = None)]
struct Args {
    /// Folder holding the audio files
    #[arg(short = 'm', long, default_value = "static/music")]
    music_dir: String,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Seed for shuffling, for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Action>,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// List every song
    Songs,
    /// Show a single song
    Song { id: u32 },
    /// Search titles (exact match first, then partial)
    Search { query: String },
    /// List genres
    Genres,
    /// List the songs of one genre
    Genre { name: String },
    /// List songs similar to one song
    Similar { id: u32 },
    /// Library summary
    Status,
    /// Interactive session reading commands from stdin
    Shell,
}

#[derive(Serialize)]
struct Status {
    songs: usize,
    genres: usize,
    music_dir: String,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Expand ~ in paths
    let music_dir = PathBuf::from(shellexpand::tilde(&args.music_dir).as_ref());
    fs::create_dir_all(&music_dir)
        .with_context(|| format!("Failed to create music directory {:?}", music_dir))?;

    let mut config = LibraryConfig::new(music_dir);
    if let Some(seed) = args.seed {
        config = config.with_shuffle_seed(seed);
    }

    let source = DirectorySource::from_config(&config);
    let mut library = MusicLibrary::open(config, source).context("Failed to scan music directory")?;
    log::info!("Library loaded: {} songs", library.song_count());

    match args.command.unwrap_or(Action::Status) {
        Action::Songs => print_songs(&library.songs(), args.json)?,
        Action::Song { id } => match find_song(&library, id)? {
            Some(song) => print_songs(&[song], args.json)?,
            None => return Ok(not_found(id)),
        },
        Action::Search { query } => print_songs(&library.search_by_title(&query), args.json)?,
        Action::Genres => {
            let genres = library.genres();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&genres)?);
            } else {
                genres.iter().for_each(|genre| println!("{}", genre));
            }
        }
        Action::Genre { name } => print_songs(&library.songs_in_genre(&name), args.json)?,
        Action::Similar { id } => {
            if find_song(&library, id)?.is_none() {
                return Ok(not_found(id));
            }
            print_songs(&library.similar_songs(id), args.json)?;
        }
        Action::Status => {
            let status = Status {
                songs: library.song_count(),
                genres: library.genres().len(),
                music_dir: library.config().music_dir.display().to_string(),
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!(
                    "{} songs in {} genres ({})",
                    status.songs, status.genres, status.music_dir
                );
            }
        }
        Action::Shell => run_shell(&mut library)?,
    }

    Ok(ExitCode::SUCCESS)
}

/// Look up a song, treating an unknown id as a normal outcome
fn find_song<S: MediaSource>(library: &MusicLibrary<S>, id: SongId) -> Result<Option<&Song>> {
    match library.song(id) {
        Ok(song) => Ok(Some(song)),
        Err(LibraryError::SongNotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn not_found(id: SongId) -> ExitCode {
    eprintln!("Song {} not found", id);
    ExitCode::FAILURE
}

fn print_songs(songs: &[&Song], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(songs)?);
    } else if songs.is_empty() {
        println!("(none)");
    } else {
        songs.iter().for_each(|song| println!("{}", song));
    }
    Ok(())
}

fn run_shell(library: &mut MusicLibrary<DirectorySource>) -> Result<()> {
    let mut session = PlaybackSession::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    print!("> ");
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command")?;

        match Command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => match session.execute(library, command) {
                Ok(lines) => lines.iter().for_each(|l| println!("{}", l)),
                Err(LibraryError::SongNotFound(id)) => println!("Song {} not found", id),
                Err(e) => log::warn!("{}", e),
            },
            Ok(None) => {}
            Err(e) => println!("{}", e),
        }

        print!("> ");
        stdout.flush()?;
    }

    Ok(())
}
