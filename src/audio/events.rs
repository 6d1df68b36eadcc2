//! Audio thread communication types
//!
//! - `AudioCommand` - Commands sent to the audio thread
//! - `AudioEvent` - Events sent back from the audio thread
//! - `SharedPlaybackState` - Thread-safe state for non-blocking reads
//!
//! ## Architecture
//! ```text
//! AudioHandle --[AudioCommand]--> Audio Thread (AudioPlayer)
//! AppContext  <--[AudioEvent]---- Audio Thread
//! Sequencer   <--[SharedState]--- Audio Thread (non-blocking reads)
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use super::output::LoadedAudio;

// ============ Commands ============

/// Commands processed in order by the audio thread
#[derive(Debug)]
pub enum AudioCommand {
    /// Decode and play a fetched clip, replacing the current one
    Play { audio: LoadedAudio },
    Pause,
    Resume,
    /// Replay the current clip from the beginning
    Restart,
    Seek { position: Duration },
    Stop,
    /// Exit the thread loop
    Shutdown,
}

// ============ Events ============

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    Started { url: String },
    Paused { position: Duration },
    Resumed,
    Stopped,
    /// The clip at `url` played to its end
    Finished { url: String },
    Error { message: String },
}

// ============ Shared State ============

/// Status of the output device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Default)]
struct SharedStateInner {
    status: OutputStatus,
    position: Duration,
    duration: Option<Duration>,
    current_url: Option<String>,
}

/// Thread-safe shared playback state
///
/// Readers never block on the audio thread; the audio thread refreshes the
/// position on every poll.
#[derive(Clone, Default)]
pub struct SharedPlaybackState {
    inner: Arc<RwLock<SharedStateInner>>,
}

impl std::fmt::Debug for SharedPlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("SharedPlaybackState")
            .field("status", &inner.status)
            .field("position", &inner.position)
            .field("duration", &inner.duration)
            .finish()
    }
}

impl SharedPlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> OutputStatus {
        self.inner.read().status
    }

    pub fn position(&self) -> Duration {
        self.inner.read().position
    }

    pub fn duration(&self) -> Option<Duration> {
        self.inner.read().duration
    }

    pub fn current_url(&self) -> Option<String> {
        self.inner.read().current_url.clone()
    }

    // ---- Update methods (called by audio thread) ----

    pub fn set_status(&self, status: OutputStatus) {
        self.inner.write().status = status;
    }

    pub fn set_position(&self, position: Duration) {
        self.inner.write().position = position;
    }

    /// Record a newly started clip
    pub fn set_clip(&self, url: Option<String>, duration: Option<Duration>) {
        let mut inner = self.inner.write();
        inner.current_url = url;
        inner.duration = duration;
        inner.position = Duration::ZERO;
    }

    pub fn clear(&self) {
        *self.inner.write() = SharedStateInner::default();
    }
}

// ============ Channel Types ============

pub type AudioCommandSender = tokio::sync::mpsc::UnboundedSender<AudioCommand>;
pub type AudioCommandReceiver = tokio::sync::mpsc::UnboundedReceiver<AudioCommand>;
pub type AudioEventSender = tokio::sync::mpsc::UnboundedSender<AudioEvent>;
pub type AudioEventReceiver = tokio::sync::mpsc::UnboundedReceiver<AudioEvent>;

pub fn audio_command_channel() -> (AudioCommandSender, AudioCommandReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

pub fn audio_event_channel() -> (AudioEventSender, AudioEventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_state_tracks_clip() {
        let state = SharedPlaybackState::new();
        assert_eq!(state.status(), OutputStatus::Stopped);
        assert_eq!(state.duration(), None);

        state.set_clip(
            Some("https://audio.test/2/1_1.mp3".to_string()),
            Some(Duration::from_secs(4)),
        );
        state.set_status(OutputStatus::Playing);
        state.set_position(Duration::from_secs(1));

        let reader = state.clone();
        assert_eq!(reader.status(), OutputStatus::Playing);
        assert_eq!(reader.position(), Duration::from_secs(1));
        assert_eq!(reader.duration(), Some(Duration::from_secs(4)));

        state.clear();
        assert_eq!(reader.current_url(), None);
        assert_eq!(reader.position(), Duration::ZERO);
    }
}
