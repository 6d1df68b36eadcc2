//! Fakes and fixtures shared by the unit tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::api::Transport;
use crate::audio::{AudioOutput, LoadedAudio};
use crate::error::{Error, ErrorKind, Result};
use crate::features::{Bookmark, KeyValueStore, StorageError};
use crate::model::{Chapter, RevelationPlace, Verse, VerseKey};
use crate::playback::PlaybackSnapshot;
use crate::renderer::Renderer;

// ============ Fixtures ============

pub fn sample_chapter(id: u16, verse_count: u16) -> Chapter {
    Chapter {
        id,
        name_original: format!("سورة {}", id),
        name_transliterated: format!("Chapter {}", id),
        revelation_place: RevelationPlace::Meccan,
        verse_count,
    }
}

pub fn sample_verses(chapter: u16, count: u16) -> Vec<Verse> {
    (1..=count)
        .map(|n| Verse {
            id: u32::from(chapter) * 1000 + u32::from(n),
            verse_number: n,
            key: VerseKey {
                chapter,
                verse: n,
            },
            text_original: format!("آية {}", n),
            translation: Some(format!("translation {}", n)),
        })
        .collect()
}

/// `surah` listing for `(id, verse_count)` pairs
pub fn chapter_list_json(chapters: &[(u16, u16)]) -> Value {
    let data: Vec<Value> = chapters
        .iter()
        .map(|&(id, count)| {
            json!({
                "number": id,
                "name": format!("سورة {}", id),
                "englishName": format!("Chapter {}", id),
                "englishNameTranslation": "",
                "numberOfAyahs": count,
                "revelationType": "Meccan",
            })
        })
        .collect();
    json!({ "code": 200, "status": "OK", "data": data })
}

/// `surah/{id}` body with `count` verses
pub fn surah_text_json(chapter: u16, count: u16) -> Value {
    let ayahs: Vec<Value> = (1..=count)
        .map(|n| {
            json!({
                "number": u32::from(chapter) * 1000 + u32::from(n),
                "numberInSurah": n,
                "text": format!("آية {}", n),
            })
        })
        .collect();
    json!({ "code": 200, "data": { "number": chapter, "ayahs": ayahs } })
}

/// Translation edition body whose texts read `translation {n}`
pub fn translation_json(count: u16) -> Value {
    let ayahs: Vec<Value> = (1..=count)
        .map(|n| {
            json!({
                "number": n,
                "numberInSurah": n,
                "text": format!("translation {}", n),
            })
        })
        .collect();
    json!({ "code": 200, "data": { "ayahs": ayahs } })
}

// ============ Transport ============

/// Serves canned JSON by path; unknown paths fail as unreachable
#[derive(Default)]
pub struct StaticTransport {
    routes: Mutex<HashMap<String, Value>>,
    delays: Mutex<HashMap<String, Duration>>,
    requests: Mutex<Vec<String>>,
}

impl StaticTransport {
    pub fn route(&self, path: &str, body: Value) {
        self.routes.lock().insert(path.to_string(), body);
    }

    pub fn unroute(&self, path: &str) {
        self.routes.lock().remove(path);
    }

    pub fn delay(&self, path: &str, delay: Duration) {
        self.delays.lock().insert(path.to_string(), delay);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl Transport for StaticTransport {
    fn get_json(&self, path: String) -> BoxFuture<'static, Result<Value>> {
        self.requests.lock().push(path.clone());
        let body = self.routes.lock().get(&path).cloned();
        let delay = self.delays.lock().get(&path).copied();

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            body.ok_or_else(|| Error::ServiceUnavailable(format!("no route for {}", path)))
        }
        .boxed()
    }
}

// ============ Audio output ============

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputCall {
    Fetch(String),
    Start(String),
    Pause,
    Resume,
    Restart,
    Seek(Duration),
    Stop,
}

struct FakeOutputState {
    calls: Vec<OutputCall>,
    delays: Vec<(String, Duration)>,
    failures: Vec<String>,
    clip_duration: Option<Duration>,
    loaded: bool,
    position: Duration,
}

/// Records every command; fetches resolve after configurable delays
pub struct FakeOutput {
    state: Mutex<FakeOutputState>,
}

impl Default for FakeOutput {
    fn default() -> Self {
        Self {
            state: Mutex::new(FakeOutputState {
                calls: Vec::new(),
                delays: Vec::new(),
                failures: Vec::new(),
                clip_duration: Some(Duration::from_secs(10)),
                loaded: false,
                position: Duration::ZERO,
            }),
        }
    }
}

impl FakeOutput {
    /// Delay fetches of URLs containing `pattern`
    pub fn delay_matching(&self, pattern: &str, delay: Duration) {
        self.state.lock().delays.push((pattern.to_string(), delay));
    }

    /// Fail fetches of URLs containing `pattern`
    pub fn fail_matching(&self, pattern: &str) {
        self.state.lock().failures.push(pattern.to_string());
    }

    pub fn set_clip_duration(&self, duration: Option<Duration>) {
        self.state.lock().clip_duration = duration;
    }

    pub fn calls(&self) -> Vec<OutputCall> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, call: &OutputCall) -> usize {
        self.state.lock().calls.iter().filter(|c| *c == call).count()
    }

    pub fn started_urls(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                OutputCall::Start(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: OutputCall) {
        self.state.lock().calls.push(call);
    }
}

impl AudioOutput for FakeOutput {
    fn fetch(&self, url: String) -> BoxFuture<'static, Result<LoadedAudio>> {
        let (delay, fails, duration) = {
            let mut state = self.state.lock();
            state.calls.push(OutputCall::Fetch(url.clone()));
            let delay = state
                .delays
                .iter()
                .find(|(pattern, _)| url.contains(pattern.as_str()))
                .map(|(_, delay)| *delay);
            let fails = state.failures.iter().any(|p| url.contains(p.as_str()));
            (delay, fails, state.clip_duration)
        };

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if fails {
                return Err(Error::ServiceUnavailable(format!("fetch failed: {}", url)));
            }
            Ok(LoadedAudio {
                url,
                data: Arc::from(Vec::new()),
                duration,
            })
        }
        .boxed()
    }

    fn start(&self, audio: LoadedAudio) {
        let mut state = self.state.lock();
        state.loaded = true;
        state.position = Duration::ZERO;
        state.calls.push(OutputCall::Start(audio.url));
    }

    fn pause(&self) {
        self.record(OutputCall::Pause);
    }

    fn resume(&self) {
        self.record(OutputCall::Resume);
    }

    fn restart(&self) {
        let mut state = self.state.lock();
        state.position = Duration::ZERO;
        state.calls.push(OutputCall::Restart);
    }

    fn seek(&self, position: Duration) {
        let mut state = self.state.lock();
        state.position = position;
        state.calls.push(OutputCall::Seek(position));
    }

    fn stop(&self) {
        let mut state = self.state.lock();
        state.loaded = false;
        state.position = Duration::ZERO;
        state.calls.push(OutputCall::Stop);
    }

    fn position(&self) -> Duration {
        self.state.lock().position
    }

    fn duration(&self) -> Option<Duration> {
        let state = self.state.lock();
        if state.loaded { state.clip_duration } else { None }
    }
}

// ============ Renderer ============

#[derive(Default)]
pub struct RecordingRenderer {
    chapters: Mutex<Vec<Vec<Chapter>>>,
    verses: Mutex<Vec<Vec<Verse>>>,
    states: Mutex<Vec<PlaybackSnapshot>>,
    errors: Mutex<Vec<(ErrorKind, String)>>,
    bookmarks: Mutex<Vec<Vec<Bookmark>>>,
}

impl RecordingRenderer {
    pub fn chapter_loads(&self) -> usize {
        self.chapters.lock().len()
    }

    pub fn verse_loads(&self) -> usize {
        self.verses.lock().len()
    }

    pub fn last_verses(&self) -> Option<Vec<Verse>> {
        self.verses.lock().last().cloned()
    }

    pub fn states(&self) -> Vec<PlaybackSnapshot> {
        self.states.lock().clone()
    }

    pub fn last_state(&self) -> Option<PlaybackSnapshot> {
        self.states.lock().last().cloned()
    }

    pub fn errors(&self) -> Vec<ErrorKind> {
        self.errors.lock().iter().map(|(kind, _)| *kind).collect()
    }

    pub fn last_bookmarks(&self) -> Option<Vec<Bookmark>> {
        self.bookmarks.lock().last().cloned()
    }
}

impl Renderer for RecordingRenderer {
    fn on_chapters_loaded(&self, chapters: &[Chapter]) {
        self.chapters.lock().push(chapters.to_vec());
    }

    fn on_verses_loaded(&self, verses: &[Verse]) {
        self.verses.lock().push(verses.to_vec());
    }

    fn on_playback_state_changed(&self, state: &PlaybackSnapshot) {
        self.states.lock().push(state.clone());
    }

    fn on_error(&self, kind: ErrorKind, message: &str) {
        self.errors.lock().push((kind, message.to_string()));
    }

    fn on_bookmarks_changed(&self, bookmarks: &[Bookmark]) {
        self.bookmarks.lock().push(bookmarks.to_vec());
    }
}

// ============ Storage ============

/// Store whose every operation fails
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> std::result::Result<Option<String>, StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk unavailable")))
    }

    fn set(&self, _key: &str, _value: &str) -> std::result::Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk unavailable")))
    }

    fn remove(&self, _key: &str) -> std::result::Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk unavailable")))
    }
}
