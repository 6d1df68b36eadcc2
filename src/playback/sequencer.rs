//! Playback sequencer
//!
//! Owns the single [`PlaybackState`] and every transition of it: explicit
//! play/navigation requests, completion of a clip, loop and continuous play.
//!
//! Each transition that loads audio takes a new generation number before it
//! suspends on the fetch. When the fetch resolves, its result is applied
//! only if that generation is still the latest, so the last request wins no
//! matter which load finishes first. The state lock is never held across an
//! await.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::navigator::VerseNavigator;
use super::state::{AudioRef, PlaybackPhase, PlaybackSnapshot, PlaybackState};
use crate::api::AudioAddress;
use crate::audio::{AudioEvent, AudioOutput};
use crate::error::{Error, ErrorKind, Result};
use crate::features::{LoopMode, PreferenceStore};
use crate::model::Verse;
use crate::renderer::Renderer;

/// Pause between a finished verse and the next one in continuous play
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_secs(1);

const PLAYBACK_FAILED: &str = "Failed to play the recitation audio.";

struct SequencerState {
    playback: PlaybackState,
    /// Verses of the chapter open in the reader
    loaded: Option<(u16, Arc<[Verse]>)>,
    /// Verses playback walks through; a copy of `loaded` taken at play time
    sequence: Arc<[Verse]>,
    auto_advance: Option<JoinHandle<()>>,
}

impl SequencerState {
    fn cancel_auto_advance(&mut self) {
        if let Some(timer) = self.auto_advance.take() {
            timer.abort();
            tracing::debug!("Cancelled pending auto-advance");
        }
    }

    fn current_verse(&self) -> Option<&Verse> {
        self.playback
            .chapter_id
            .and_then(|_| self.sequence.get(self.playback.verse_index))
    }
}

struct Inner {
    state: Mutex<SequencerState>,
    generation: AtomicU64,
    output: Arc<dyn AudioOutput>,
    address: AudioAddress,
    preferences: Arc<PreferenceStore>,
    renderer: Arc<dyn Renderer>,
}

/// A load that has been started but not yet applied
struct LoadRequest {
    generation: u64,
    url: String,
    verse_key: String,
}

/// Cheap to clone; clones share one state machine
#[derive(Clone)]
pub struct Sequencer {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("playback", &self.inner.state.lock().playback)
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Sequencer {
    /// Create a sequencer with the persisted loop mode applied
    pub fn new(
        output: Arc<dyn AudioOutput>,
        address: AudioAddress,
        preferences: Arc<PreferenceStore>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let playback = PlaybackState {
            loop_mode: preferences.get().loop_mode,
            ..PlaybackState::default()
        };

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SequencerState {
                    playback,
                    loaded: None,
                    sequence: Arc::from(Vec::new()),
                    auto_advance: None,
                }),
                generation: AtomicU64::new(0),
                output,
                address,
                preferences,
                renderer,
            }),
        }
    }

    // ============ Queries ============

    pub fn state(&self) -> PlaybackState {
        self.inner.state.lock().playback.clone()
    }

    pub fn current_verse(&self) -> Option<Verse> {
        self.inner.state.lock().current_verse().cloned()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let state = self.inner.state.lock();
        let has_audio = state.playback.current_audio.is_some();
        PlaybackSnapshot {
            phase: state.playback.phase,
            chapter_id: state.playback.chapter_id,
            verse_index: state.playback.verse_index,
            current_verse: state.current_verse().cloned(),
            loop_mode: state.playback.loop_mode,
            continuous_play: state.playback.continuous_play,
            elapsed: if has_audio {
                self.inner.output.position()
            } else {
                Duration::ZERO
            },
            duration: if has_audio {
                self.inner.output.duration()
            } else {
                None
            },
        }
    }

    // ============ Verse sequence ============

    /// Hand the sequencer the verses of the chapter open in the reader
    ///
    /// When they replace the chapter that is playing (a translation change),
    /// playback keeps its position in the new copy.
    pub fn set_verses(&self, chapter_id: u16, verses: Arc<[Verse]>) {
        let mut state = self.inner.state.lock();
        if state.playback.chapter_id == Some(chapter_id) && state.sequence.len() == verses.len() {
            state.sequence = verses.clone();
        }
        state.loaded = Some((chapter_id, verses));
    }

    // ============ Transitions ============

    /// Play one verse and stop after it
    pub async fn play_verse(&self, chapter_id: u16, verse_number: u16) -> Result<()> {
        self.play_at(chapter_id, Some(verse_number), false).await
    }

    /// Play from a verse onwards
    pub async fn play_from_verse(&self, chapter_id: u16, verse_number: u16) -> Result<()> {
        self.play_at(chapter_id, Some(verse_number), true).await
    }

    /// Play the whole chapter from its first verse
    pub async fn play_chapter(&self, chapter_id: u16) -> Result<()> {
        self.play_at(chapter_id, None, true).await
    }

    async fn play_at(
        &self,
        chapter_id: u16,
        verse_number: Option<u16>,
        continuous: bool,
    ) -> Result<()> {
        let request = {
            let mut state = self.inner.state.lock();
            let not_found = || Error::VerseNotFound {
                chapter_id,
                verse_number: verse_number.unwrap_or(1),
            };

            let verses = match &state.loaded {
                Some((id, verses)) if *id == chapter_id => verses.clone(),
                _ => return Err(not_found()),
            };
            let index = match verse_number {
                Some(number) => verses.iter().position(|v| v.verse_number == number),
                None => (!verses.is_empty()).then_some(0),
            }
            .ok_or_else(not_found)?;

            state.sequence = verses;
            state.playback.chapter_id = Some(chapter_id);
            state.playback.continuous_play = continuous;
            self.begin_load(&mut state, index)
        };

        self.notify();
        self.complete_load(request).await
    }

    /// Pause when playing, resume when paused, replay a finished verse
    pub fn toggle_play_pause(&self) {
        let changed = {
            let mut state = self.inner.state.lock();
            match state.playback.phase {
                PlaybackPhase::Playing => {
                    self.inner.output.pause();
                    state.playback.phase = PlaybackPhase::Paused;
                    true
                }
                PlaybackPhase::Paused => {
                    self.inner.output.resume();
                    state.playback.phase = PlaybackPhase::Playing;
                    true
                }
                PlaybackPhase::Ended if state.playback.current_audio.is_some() => {
                    state.cancel_auto_advance();
                    self.inner.output.restart();
                    state.playback.phase = PlaybackPhase::Playing;
                    true
                }
                _ => false,
            }
        };

        if changed {
            self.notify();
        }
    }

    /// Advance to the next verse, wrapping only in chapter loop mode
    pub async fn next(&self) -> Result<()> {
        self.advance(None).await
    }

    /// Step back one verse; nothing happens on the first verse
    pub async fn previous(&self) -> Result<()> {
        let request = {
            let mut state = self.inner.state.lock();
            let navigator = VerseNavigator::new(
                state.sequence.len(),
                state.playback.verse_index,
                state.playback.loop_mode,
            );
            match navigator.prev_index() {
                Some(index) => self.begin_load(&mut state, index),
                None => return Ok(()),
            }
        };

        self.notify();
        self.complete_load(request).await
    }

    /// `expected` fences a scheduled advance against transitions made since
    async fn advance(&self, expected: Option<u64>) -> Result<()> {
        let request = {
            let mut state = self.inner.state.lock();
            if expected.is_some_and(|generation| !self.is_current(generation)) {
                return Ok(());
            }

            let navigator = VerseNavigator::new(
                state.sequence.len(),
                state.playback.verse_index,
                state.playback.loop_mode,
            );
            match navigator.next_index() {
                Some(index) => self.begin_load(&mut state, index),
                None => {
                    let changed = self.end_sequence(&mut state);
                    drop(state);
                    if changed {
                        self.notify();
                    }
                    return Ok(());
                }
            }
        };

        self.notify();
        self.complete_load(request).await
    }

    /// Settle on the last verse; returns whether anything changed
    fn end_sequence(&self, state: &mut SequencerState) -> bool {
        if state.sequence.is_empty() || state.playback.phase == PlaybackPhase::Ended {
            return false;
        }

        state.cancel_auto_advance();
        match state.playback.phase {
            PlaybackPhase::Playing => self.inner.output.pause(),
            PlaybackPhase::Loading => {
                self.inner.generation.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }
        state.playback.phase = PlaybackPhase::Ended;
        tracing::debug!("End of sequence reached");
        true
    }

    /// React to the output finishing the current clip
    pub fn on_playback_completed(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.playback.phase != PlaybackPhase::Playing {
                tracing::debug!(
                    "Ignoring completion while {}",
                    state.playback.phase.display_name()
                );
                return;
            }

            if state.playback.loop_mode == LoopMode::Verse {
                self.inner.output.restart();
            } else {
                state.playback.phase = PlaybackPhase::Ended;
                if state.playback.continuous_play {
                    self.schedule_auto_advance(&mut state);
                }
            }
        }

        self.notify();
    }

    /// Step the loop mode and persist it
    pub fn cycle_loop_mode(&self) -> LoopMode {
        let mode = self.inner.state.lock().playback.loop_mode.next();
        self.set_loop_mode(mode);
        mode
    }

    pub fn set_loop_mode(&self, mode: LoopMode) {
        self.inner.state.lock().playback.loop_mode = mode;
        self.inner.preferences.update(|prefs| prefs.loop_mode = mode);
        tracing::info!("Loop mode: {}", mode.display_name());
        self.notify();
    }

    /// Seek to a fraction of the current clip
    ///
    /// Does nothing until the clip's duration is known.
    pub fn seek(&self, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }

        {
            let state = self.inner.state.lock();
            if state.playback.current_audio.is_none() {
                return;
            }
            let duration = match self.inner.output.duration() {
                Some(duration) if !duration.is_zero() => duration,
                _ => return,
            };
            self.inner
                .output
                .seek(duration.mul_f64(fraction.clamp(0.0, 1.0)));
        }

        self.notify();
    }

    /// Stop, release the audio and forget the current verse
    pub fn close(&self) {
        {
            let mut state = self.inner.state.lock();
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            state.cancel_auto_advance();
            self.inner.output.stop();

            let loop_mode = state.playback.loop_mode;
            state.sequence = Arc::from(Vec::new());
            state.playback = PlaybackState {
                loop_mode,
                ..PlaybackState::default()
            };
        }

        tracing::info!("Playback closed");
        self.notify();
    }

    /// Route an event from the audio backend
    pub fn on_audio_event(&self, event: &AudioEvent) {
        match event {
            AudioEvent::Finished { url } => {
                let current = self.inner.state.lock().playback.current_audio.clone();
                match current {
                    Some(audio) if audio.url == *url => self.on_playback_completed(),
                    _ => tracing::debug!("Ignoring completion of {}", url),
                }
            }
            AudioEvent::Error { message } => {
                tracing::warn!("Audio backend error: {}", message);
                self.inner
                    .renderer
                    .on_error(ErrorKind::ServiceUnavailable, PLAYBACK_FAILED);
            }
            other => tracing::trace!("Audio event: {:?}", other),
        }
    }

    // ============ Loading ============

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == generation
    }

    /// Enter `Loading` for `index` and stamp the load with a new generation
    fn begin_load(&self, state: &mut SequencerState, index: usize) -> LoadRequest {
        state.cancel_auto_advance();
        self.inner.output.stop();

        let verse = &state.sequence[index];
        let reciter = self.inner.preferences.get().reciter_id;
        let url = self.inner.address.resolve(verse.key, &reciter);
        let verse_key = verse.verse_key();

        state.playback.verse_index = index;
        state.playback.phase = PlaybackPhase::Loading;
        state.playback.current_audio = None;
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::debug!("Loading {} (generation {})", verse_key, generation);
        LoadRequest {
            generation,
            url,
            verse_key,
        }
    }

    async fn complete_load(&self, request: LoadRequest) -> Result<()> {
        let fetched = self.inner.output.fetch(request.url.clone()).await;

        let result = {
            let mut state = self.inner.state.lock();
            if !self.is_current(request.generation) {
                tracing::debug!(
                    "Discarding stale load of {} (generation {})",
                    request.verse_key,
                    request.generation
                );
                return Ok(());
            }

            match fetched {
                Ok(audio) => {
                    self.inner.output.start(audio);
                    state.playback.phase = PlaybackPhase::Playing;
                    tracing::info!("Playing {}", request.verse_key);
                    state.playback.current_audio = Some(AudioRef {
                        url: request.url,
                        verse_key: request.verse_key,
                    });
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("Failed to load audio for {}: {}", request.verse_key, e);
                    state.playback.phase = PlaybackPhase::Idle;
                    state.playback.current_audio = None;
                    Err(e)
                }
            }
        };

        if let Err(e) = &result {
            self.inner.renderer.on_error(e.kind(), e.user_message());
        }
        self.notify();
        result
    }

    fn schedule_auto_advance(&self, state: &mut SequencerState) {
        state.cancel_auto_advance();

        let generation = self.inner.generation.load(Ordering::SeqCst);
        let sequencer = self.clone();
        state.auto_advance = Some(tokio::spawn(async move {
            tokio::time::sleep(AUTO_ADVANCE_DELAY).await;
            {
                let mut state = sequencer.inner.state.lock();
                if !sequencer.is_current(generation) {
                    return;
                }
                // Detach our own handle; aborting it here would cancel this task
                drop(state.auto_advance.take());
            }
            if let Err(e) = sequencer.advance(Some(generation)).await {
                tracing::warn!("Auto-advance failed: {}", e);
            }
        }));
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        self.inner.renderer.on_playback_state_changed(&snapshot);
    }
}
