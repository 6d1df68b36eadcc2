//! Audio handle for non-blocking audio control
//!
//! `AudioHandle` sends commands to the audio thread and returns immediately.
//! State is read from `SharedPlaybackState` without blocking. Fetching clip
//! bytes happens on the async runtime, never on the audio thread.

use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use reqwest::Client;

use super::events::{AudioCommand, AudioCommandSender, OutputStatus, SharedPlaybackState};
use super::output::{AudioOutput, LoadedAudio};
use super::player::probe_duration;
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct AudioHandle {
    command_tx: AudioCommandSender,
    state: SharedPlaybackState,
    client: Client,
}

impl std::fmt::Debug for AudioHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioHandle")
            .field("state", &self.state)
            .finish()
    }
}

impl AudioHandle {
    pub fn new(command_tx: AudioCommandSender, state: SharedPlaybackState, client: Client) -> Self {
        Self {
            command_tx,
            state,
            client,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.status() == OutputStatus::Playing
    }

    pub(super) fn shutdown(&self) {
        let _ = self.command_tx.send(AudioCommand::Shutdown);
    }

    fn send(&self, command: AudioCommand) {
        if self.command_tx.send(command).is_err() {
            tracing::warn!("Audio thread is gone, command dropped");
        }
    }
}

impl AudioOutput for AudioHandle {
    fn fetch(&self, url: String) -> BoxFuture<'static, Result<LoadedAudio>> {
        let client = self.client.clone();

        async move {
            let response = client
                .get(&url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| Error::ServiceUnavailable(format!("{}: {}", url, e)))?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| Error::ServiceUnavailable(format!("{}: {}", url, e)))?;

            let data: Arc<[u8]> = Arc::from(bytes.as_ref());
            let duration = probe_duration(data.clone());
            tracing::debug!("Fetched {} ({} bytes, {:?})", url, data.len(), duration);

            Ok(LoadedAudio {
                url,
                data,
                duration,
            })
        }
        .boxed()
    }

    fn start(&self, audio: LoadedAudio) {
        // Readers see the new clip before the thread gets to it
        self.state.set_clip(Some(audio.url.clone()), audio.duration);
        self.send(AudioCommand::Play { audio });
    }

    fn pause(&self) {
        self.send(AudioCommand::Pause);
    }

    fn resume(&self) {
        self.send(AudioCommand::Resume);
    }

    fn restart(&self) {
        self.state.set_position(Duration::ZERO);
        self.send(AudioCommand::Restart);
    }

    fn seek(&self, position: Duration) {
        self.state.set_position(position);
        self.send(AudioCommand::Seek { position });
    }

    fn stop(&self) {
        self.send(AudioCommand::Stop);
    }

    fn position(&self) -> Duration {
        self.state.position()
    }

    fn duration(&self) -> Option<Duration> {
        self.state.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::events::audio_command_channel;

    #[test]
    fn commands_are_forwarded_in_order() {
        let (tx, mut rx) = audio_command_channel();
        let state = SharedPlaybackState::new();
        let handle = AudioHandle::new(tx, state.clone(), Client::new());

        handle.start(LoadedAudio {
            url: "https://audio.test/2/1_1.mp3".to_string(),
            data: Arc::from(Vec::new()),
            duration: Some(Duration::from_secs(3)),
        });
        handle.seek(Duration::from_secs(2));
        handle.stop();

        assert!(matches!(rx.try_recv(), Ok(AudioCommand::Play { .. })));
        assert!(matches!(
            rx.try_recv(),
            Ok(AudioCommand::Seek { position }) if position == Duration::from_secs(2)
        ));
        assert!(matches!(rx.try_recv(), Ok(AudioCommand::Stop)));

        assert_eq!(handle.duration(), Some(Duration::from_secs(3)));
        assert_eq!(handle.position(), Duration::from_secs(2));
        assert_eq!(state.current_url().as_deref(), Some("https://audio.test/2/1_1.mp3"));
    }
}
