//! Application context
//!
//! `AppContext` is built once at startup and owns every component: the
//! content gateway, the preference and bookmark stores and the playback
//! sequencer. Front ends hold it behind an `Arc` and call its actions; what
//! changes is reported back through the [`Renderer`].
//!
//! The actions are split by concern:
//! - `reader`: chapter list, open chapter, verses, commentary
//! - `preferences`: settings actions
//! - `bookmarks`: bookmark toggling and navigation

mod bookmarks;
mod preferences;
mod reader;

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use parking_lot::Mutex;

use crate::api::{ContentGateway, Transport};
use crate::audio::AudioOutput;
use crate::config::Config;
use crate::features::{BookmarkManager, KeyValueStore, PreferenceStore, Preferences};
use crate::model::{Chapter, Verse};
use crate::playback::Sequencer;
use crate::renderer::Renderer;

/// The chapter shown in the reader
#[derive(Default)]
struct ReaderState {
    chapter: Option<Chapter>,
    verses: Arc<[Verse]>,
}

pub struct AppContext {
    config: Config,
    gateway: ContentGateway,
    preferences: Arc<PreferenceStore>,
    bookmarks: BookmarkManager,
    sequencer: Sequencer,
    renderer: Arc<dyn Renderer>,
    reader: Mutex<ReaderState>,
    /// Fences concurrent `open_chapter` calls
    open_generation: AtomicU64,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("open_chapter", &self.reader.lock().chapter.as_ref().map(|c| c.id))
            .field("sequencer", &self.sequencer)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn new(
        config: Config,
        transport: Arc<dyn Transport>,
        output: Arc<dyn AudioOutput>,
        store: Arc<dyn KeyValueStore>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let gateway = ContentGateway::new(transport, &config);
        let preferences = Arc::new(PreferenceStore::new(store.clone()));
        let bookmarks = BookmarkManager::new(store);
        let sequencer = Sequencer::new(
            output,
            gateway.audio_address().clone(),
            preferences.clone(),
            renderer.clone(),
        );

        tracing::info!(
            "Context ready: {} bookmarks, loop mode {}",
            bookmarks.len(),
            sequencer.state().loop_mode.display_name()
        );

        Self {
            config,
            gateway,
            preferences,
            bookmarks,
            sequencer,
            renderer,
            reader: Mutex::new(ReaderState::default()),
            open_generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gateway(&self) -> &ContentGateway {
        &self.gateway
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn bookmark_manager(&self) -> &BookmarkManager {
        &self.bookmarks
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences.get()
    }

    /// Chapter currently open in the reader
    pub fn open_chapter_info(&self) -> Option<Chapter> {
        self.reader.lock().chapter.clone()
    }

    /// Verses of the open chapter
    pub fn verses(&self) -> Arc<[Verse]> {
        self.reader.lock().verses.clone()
    }
}
