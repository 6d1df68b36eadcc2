//! Line-oriented terminal front end
//!
//! `Command` parses one input line; `TerminalRenderer` prints what the core
//! reports. Output goes to stdout, logs to stderr.

use parking_lot::Mutex;
use thiserror::Error;

use tartil::ErrorKind;
use tartil::features::{Bookmark, LoopMode};
use tartil::model::{Chapter, Verse, VerseKey};
use tartil::playback::{PlaybackPhase, PlaybackSnapshot};
use tartil::renderer::Renderer;
use tartil::utils::{format_progress, format_relative_time};

pub const HELP: &str = "\
Commands:
  chapters              list all chapters
  find <query>          filter chapters by name or number
  open <c>              open a chapter
  play <c:v>            play one verse
  from <c:v>            play from a verse onwards
  chapter               play the open chapter from the start
  pause                 pause / resume
  next | prev           move one verse
  loop [none|verse|chapter]
                        cycle or set the loop mode
  seek <0..1>           jump within the current verse
  status                show playback position
  close                 stop playback
  mark <c:v>            toggle a bookmark on the open chapter
  unmark <c:v>          remove a bookmark
  marks                 list bookmarks
  goto <c:v>            open a bookmarked verse
  tafsir <c:v>          show commentary
  reciter <id>          change reciter
  translation <id>      change translation (\"none\" to hide)
  prefs                 show preferences
  quit";

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command {0:?}, type `help`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid argument {0:?}")]
    InvalidArgument(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Chapters,
    Find(String),
    Open(u16),
    Play(VerseKey),
    PlayFrom(VerseKey),
    PlayChapter,
    TogglePause,
    Next,
    Previous,
    Loop(Option<LoopMode>),
    Seek(f64),
    Status,
    Close,
    Mark(VerseKey),
    Unmark(VerseKey),
    Marks,
    Goto(VerseKey),
    Tafsir(VerseKey),
    Reciter(String),
    Translation(String),
    Prefs,
    Help,
    Quit,
}

impl Command {
    /// `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim())),
            None => (line, None),
        };

        let command = match name.to_lowercase().as_str() {
            "chapters" | "ls" => Command::Chapters,
            "find" => Command::Find(require(arg, "find")?.to_string()),
            "open" => Command::Open(
                require(arg, "open")?
                    .parse()
                    .map_err(|_| CommandError::InvalidArgument(arg.unwrap_or_default().into()))?,
            ),
            "play" => Command::Play(verse_key(arg, "play")?),
            "from" => Command::PlayFrom(verse_key(arg, "from")?),
            "chapter" => Command::PlayChapter,
            "pause" | "p" => Command::TogglePause,
            "next" | "n" => Command::Next,
            "prev" => Command::Previous,
            "loop" => match arg {
                Some(mode) => Command::Loop(Some(
                    mode.parse()
                        .map_err(|_| CommandError::InvalidArgument(mode.to_string()))?,
                )),
                None => Command::Loop(None),
            },
            "seek" => {
                let raw = require(arg, "seek")?;
                let fraction: f64 = raw
                    .parse()
                    .map_err(|_| CommandError::InvalidArgument(raw.to_string()))?;
                Command::Seek(fraction)
            }
            "status" => Command::Status,
            "close" | "stop" => Command::Close,
            "mark" => Command::Mark(verse_key(arg, "mark")?),
            "unmark" => Command::Unmark(verse_key(arg, "unmark")?),
            "marks" => Command::Marks,
            "goto" => Command::Goto(verse_key(arg, "goto")?),
            "tafsir" => Command::Tafsir(verse_key(arg, "tafsir")?),
            "reciter" => Command::Reciter(require(arg, "reciter")?.to_string()),
            "translation" => Command::Translation(require(arg, "translation")?.to_string()),
            "prefs" => Command::Prefs,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }

    /// Commands that fetch text or audio before they finish
    pub fn waits_on_network(&self) -> bool {
        matches!(
            self,
            Command::Open(_)
                | Command::Play(_)
                | Command::PlayFrom(_)
                | Command::PlayChapter
                | Command::Next
                | Command::Previous
                | Command::Goto(_)
                | Command::Tafsir(_)
                | Command::Translation(_)
        )
    }
}

fn require<'a>(arg: Option<&'a str>, command: &'static str) -> Result<&'a str, CommandError> {
    arg.filter(|a| !a.is_empty())
        .ok_or(CommandError::MissingArgument(command))
}

fn verse_key(arg: Option<&str>, command: &'static str) -> Result<VerseKey, CommandError> {
    let raw = require(arg, command)?;
    VerseKey::parse(raw).map_err(|_| CommandError::InvalidArgument(raw.to_string()))
}

/// Prints to stdout
///
/// Playback updates are printed only when the phase or verse changes, so
/// seeks and loop toggles do not flood the screen.
#[derive(Default)]
pub struct TerminalRenderer {
    last_shown: Mutex<Option<(PlaybackPhase, Option<String>)>>,
}

impl TerminalRenderer {
    pub fn print_chapters(chapters: &[Chapter]) {
        for chapter in chapters {
            println!(
                "{:>3}. {} ({}) - {} verses, {}",
                chapter.id,
                chapter.name_transliterated,
                chapter.name_original,
                chapter.verse_count,
                chapter.revelation_place
            );
        }
    }

    pub fn print_bookmarks(bookmarks: &[Bookmark]) {
        if bookmarks.is_empty() {
            println!("No bookmarks yet.");
            return;
        }
        for bookmark in bookmarks {
            println!(
                "[{}] {} {} - {}",
                bookmark.verse_key,
                bookmark.chapter_name_transliterated,
                bookmark.verse_number,
                format_relative_time(bookmark.created_at)
            );
        }
    }

    pub fn print_status(state: &PlaybackSnapshot) {
        let verse = state
            .current_verse
            .as_ref()
            .map(Verse::verse_key)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {} {} (loop: {}{})",
            state.phase.display_name(),
            verse,
            format_progress(state.elapsed, state.duration),
            state.loop_mode,
            if state.continuous_play { ", continuous" } else { "" }
        );
    }
}

impl Renderer for TerminalRenderer {
    fn on_chapters_loaded(&self, chapters: &[Chapter]) {
        println!("{} chapters available.", chapters.len());
    }

    fn on_verses_loaded(&self, verses: &[Verse]) {
        for verse in verses {
            println!("[{}] {}", verse.verse_key(), verse.text_original);
            if let Some(translation) = &verse.translation {
                println!("      {}", translation);
            }
        }
    }

    fn on_playback_state_changed(&self, state: &PlaybackSnapshot) {
        let shown = (
            state.phase,
            state.current_verse.as_ref().map(Verse::verse_key),
        );
        {
            let mut last = self.last_shown.lock();
            if last.as_ref() == Some(&shown) {
                return;
            }
            *last = Some(shown);
        }
        Self::print_status(state);
    }

    fn on_error(&self, kind: ErrorKind, message: &str) {
        tracing::debug!("Reported {:?}", kind);
        println!("! {}", message);
    }

    fn on_bookmarks_changed(&self, bookmarks: &[Bookmark]) {
        println!("{} bookmarks.", bookmarks.len());
    }
}
