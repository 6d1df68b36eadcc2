//! Output without a sound device
//!
//! Every clip "plays" for a fixed length and then reports `Finished`, so the
//! sequencer can run on machines without audio hardware.

use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::events::{AudioEvent, AudioEventReceiver, AudioEventSender, audio_event_channel};
use super::output::{AudioOutput, LoadedAudio};
use crate::error::Result;

pub const DEFAULT_CLIP_LENGTH: Duration = Duration::from_secs(5);

#[derive(Default)]
struct SilentState {
    loaded: bool,
    url: Option<String>,
    /// Set while the clip is running
    started_at: Option<Instant>,
    /// Position accumulated before the last pause or seek
    offset: Duration,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every run so a superseded timer stays silent
    run: u64,
}

impl SilentState {
    fn position(&self) -> Duration {
        self.offset + self.started_at.map(|t| t.elapsed()).unwrap_or_default()
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

pub struct SilentOutput {
    clip_length: Duration,
    state: Arc<Mutex<SilentState>>,
    event_tx: AudioEventSender,
}

impl std::fmt::Debug for SilentOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SilentOutput")
            .field("clip_length", &self.clip_length)
            .finish_non_exhaustive()
    }
}

impl SilentOutput {
    pub fn new(clip_length: Duration) -> (Self, AudioEventReceiver) {
        let (event_tx, event_rx) = audio_event_channel();
        let output = Self {
            clip_length,
            state: Arc::new(Mutex::new(SilentState::default())),
            event_tx,
        };
        (output, event_rx)
    }

    /// Run the clip from `offset` and schedule its end
    fn run_from(&self, state: &mut SilentState, offset: Duration) {
        state.cancel_timer();
        state.loaded = true;
        state.offset = offset.min(self.clip_length);
        state.started_at = Some(Instant::now());
        state.run += 1;

        let run = state.run;
        let remaining = self.clip_length.saturating_sub(state.offset);
        let shared = self.state.clone();
        let event_tx = self.event_tx.clone();
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            let url = {
                let mut state = shared.lock();
                if state.run != run {
                    return;
                }
                let position = state.position();
                state.offset = position;
                state.started_at = None;
                state.timer = None;
                state.url.clone().unwrap_or_default()
            };
            let _ = event_tx.send(AudioEvent::Finished { url });
        }));
    }
}

impl AudioOutput for SilentOutput {
    fn fetch(&self, url: String) -> BoxFuture<'static, Result<LoadedAudio>> {
        let duration = Some(self.clip_length);
        async move {
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
        state.url = Some(audio.url.clone());
        self.run_from(&mut state, Duration::ZERO);
        let _ = self.event_tx.send(AudioEvent::Started { url: audio.url });
    }

    fn pause(&self) {
        let mut state = self.state.lock();
        if state.started_at.is_none() {
            return;
        }
        state.cancel_timer();
        let position = state.position();
        state.offset = position;
        state.started_at = None;
        state.run += 1;
        let _ = self.event_tx.send(AudioEvent::Paused {
            position: state.offset,
        });
    }

    fn resume(&self) {
        let mut state = self.state.lock();
        if !state.loaded || state.started_at.is_some() {
            return;
        }
        let offset = state.offset;
        self.run_from(&mut state, offset);
        let _ = self.event_tx.send(AudioEvent::Resumed);
    }

    fn restart(&self) {
        let mut state = self.state.lock();
        if state.loaded {
            self.run_from(&mut state, Duration::ZERO);
        }
    }

    fn seek(&self, position: Duration) {
        let mut state = self.state.lock();
        if !state.loaded {
            return;
        }
        if state.started_at.is_some() {
            self.run_from(&mut state, position);
        } else {
            state.offset = position.min(self.clip_length);
        }
    }

    fn stop(&self) {
        let mut state = self.state.lock();
        state.cancel_timer();
        let run = state.run + 1;
        *state = SilentState {
            run,
            ..SilentState::default()
        };
        let _ = self.event_tx.send(AudioEvent::Stopped);
    }

    fn position(&self) -> Duration {
        self.state.lock().position()
    }

    fn duration(&self) -> Option<Duration> {
        self.state.lock().loaded.then_some(self.clip_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip() -> LoadedAudio {
        LoadedAudio {
            url: "silent://1_1".to_string(),
            data: Arc::from(Vec::new()),
            duration: None,
        }
    }

    fn finished_url(rx: &mut AudioEventReceiver) -> Option<String> {
        while let Ok(event) = rx.try_recv() {
            if let AudioEvent::Finished { url } = event {
                return Some(url);
            }
        }
        None
    }

    #[tokio::test(start_paused = true)]
    async fn reports_finished_after_clip_length() {
        let (output, mut rx) = SilentOutput::new(Duration::from_secs(3));
        let audio = output.fetch("silent://1_1".to_string()).await.unwrap();
        assert_eq!(audio.duration, Some(Duration::from_secs(3)));

        output.start(audio);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(finished_url(&mut rx), None);
        assert_eq!(output.position(), Duration::from_secs(2));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(finished_url(&mut rx).as_deref(), Some("silent://1_1"));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_holds_position() {
        let (output, mut rx) = SilentOutput::new(Duration::from_secs(3));
        output.start(clip());
        tokio::time::sleep(Duration::from_secs(1)).await;
        output.pause();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(finished_url(&mut rx), None);
        assert_eq!(output.position(), Duration::from_secs(1));

        output.resume();
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(finished_url(&mut rx).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_releases_clip() {
        let (output, mut rx) = SilentOutput::new(Duration::from_secs(3));
        output.start(clip());
        output.stop();
        assert_eq!(output.duration(), None);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(finished_url(&mut rx), None);
    }
}
