//! Tartil - terminal Quran reader and recitation player

mod cli;
mod terminal;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use tartil::AppContext;
use tartil::api::HttpTransport;
use tartil::audio::{
    AudioEventReceiver, AudioOutput, AudioThreadHandle, DEFAULT_CLIP_LENGTH, SilentOutput,
    spawn_audio_thread,
};
use tartil::features::{FileStore, KeyValueStore, MemoryStore};

use crate::cli::Cli;
use crate::terminal::{Command, HELP, TerminalRenderer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = cli.config();
    let transport =
        Arc::new(HttpTransport::new(&config).context("Failed to build the HTTP client")?);

    let store: Arc<dyn KeyValueStore> = match FileStore::from_config(&config) {
        Ok(store) => {
            tracing::info!("Saving to {}", store.dir().display());
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("No data directory ({}), changes will not be saved", e);
            Arc::new(MemoryStore::default())
        }
    };

    let (output, events, audio_thread) = open_output(&cli, transport.client().clone());

    let renderer = Arc::new(TerminalRenderer::default());
    let app = Arc::new(AppContext::new(
        config,
        transport,
        output,
        store,
        renderer,
    ));

    let pump = tokio::spawn(pump_audio_events(app.clone(), events));

    println!("Type `help` for commands.");
    if let Err(e) = app.load_chapters().await {
        tracing::warn!("Chapter list unavailable at startup: {}", e);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }
        // Loads run detached so a newer request or `close` can overtake them
        if command.waits_on_network() {
            tokio::spawn(run_command(app.clone(), command));
        } else {
            run_command(app.clone(), command).await;
        }
    }

    app.sequencer().close();
    pump.abort();
    if let Some(thread) = audio_thread {
        if let Err(e) = thread.join(Duration::from_secs(2)) {
            tracing::warn!("{}", e);
        }
    }
    Ok(())
}

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The rodio backend, or a silent one when asked for or when no device opens
fn open_output(
    cli: &Cli,
    client: reqwest::Client,
) -> (
    Arc<dyn AudioOutput>,
    AudioEventReceiver,
    Option<AudioThreadHandle>,
) {
    if !cli.no_audio {
        match spawn_audio_thread(client) {
            Ok(mut thread) => {
                if let Some(events) = thread.take_event_rx() {
                    return (Arc::new(thread.handle.clone()), events, Some(thread));
                }
            }
            Err(e) => tracing::warn!("No audio device ({}), playing silently", e),
        }
    }

    let (silent, events) = SilentOutput::new(DEFAULT_CLIP_LENGTH);
    (Arc::new(silent), events, None)
}

async fn pump_audio_events(app: Arc<AppContext>, mut events: AudioEventReceiver) {
    while let Some(event) = events.recv().await {
        app.handle_audio_event(&event);
    }
    tracing::debug!("Audio event channel closed");
}

/// Errors are already reported through the renderer; they are only logged here
async fn run_command(app: Arc<AppContext>, command: Command) {
    let sequencer = app.sequencer();
    let result = match command {
        Command::Chapters => app.load_chapters().await.map(|chapters| {
            TerminalRenderer::print_chapters(&chapters);
        }),
        Command::Find(query) => {
            let found = app.find_chapters(&query);
            if found.is_empty() {
                println!("No chapter matches {:?}.", query);
            }
            TerminalRenderer::print_chapters(&found);
            Ok(())
        }
        Command::Open(id) => app.open_chapter(id).await,
        Command::Play(key) => match app.ensure_open(key.chapter).await {
            Ok(()) => sequencer.play_verse(key.chapter, key.verse).await,
            Err(e) => Err(e),
        },
        Command::PlayFrom(key) => match app.ensure_open(key.chapter).await {
            Ok(()) => sequencer.play_from_verse(key.chapter, key.verse).await,
            Err(e) => Err(e),
        },
        Command::PlayChapter => match app.open_chapter_info() {
            Some(chapter) => sequencer.play_chapter(chapter.id).await,
            None => {
                println!("Open a chapter first.");
                Ok(())
            }
        },
        Command::TogglePause => {
            sequencer.toggle_play_pause();
            Ok(())
        }
        Command::Next => sequencer.next().await,
        Command::Previous => sequencer.previous().await,
        Command::Loop(mode) => {
            match mode {
                Some(mode) => app.set_loop_mode(mode),
                None => {
                    app.cycle_loop_mode();
                }
            }
            println!("{}", sequencer.state().loop_mode.display_name());
            Ok(())
        }
        Command::Seek(fraction) => {
            sequencer.seek(fraction);
            Ok(())
        }
        Command::Status => {
            TerminalRenderer::print_status(&sequencer.snapshot());
            Ok(())
        }
        Command::Close => {
            sequencer.close();
            Ok(())
        }
        Command::Mark(key) => app.toggle_bookmark(&key.to_string()).map(|marked| {
            println!("{} {}", key, if marked { "bookmarked" } else { "unbookmarked" });
        }),
        Command::Unmark(key) => {
            if !app.remove_bookmark(&key.to_string()) {
                println!("{} is not bookmarked.", key);
            }
            Ok(())
        }
        Command::Marks => {
            TerminalRenderer::print_bookmarks(&app.bookmarks());
            Ok(())
        }
        Command::Goto(key) => app.go_to_bookmark(&key.to_string()).await.map(|verse| {
            println!("-> [{}] {}", verse.verse_key(), verse.text_original);
        }),
        Command::Tafsir(key) => {
            println!("{}", app.show_tafsir(&key.to_string()).await);
            Ok(())
        }
        Command::Reciter(id) => {
            app.change_reciter(&id);
            Ok(())
        }
        Command::Translation(id) => app.change_translation(&id).await,
        Command::Prefs => {
            println!("{:#?}", app.preferences());
            Ok(())
        }
        Command::Help => {
            println!("{}", HELP);
            Ok(())
        }
        Command::Quit => Ok(()),
    };

    if let Err(e) = result {
        tracing::debug!("Command failed: {}", e);
        if matches!(e.kind(), tartil::ErrorKind::VerseNotFound | tartil::ErrorKind::InvalidKey) {
            println!("{}", e.user_message());
        }
    }
}
