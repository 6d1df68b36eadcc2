//! Audio thread implementation
//!
//! Runs the `AudioPlayer` in a dedicated thread, processing commands in
//! order and sending events back. Between commands the thread polls the sink
//! to publish the position and to detect the end of a clip.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use reqwest::Client;
use tokio::sync::mpsc::error::TryRecvError;

use super::events::{
    AudioCommand, AudioCommandReceiver, AudioEvent, AudioEventReceiver, AudioEventSender,
    OutputStatus, SharedPlaybackState, audio_command_channel, audio_event_channel,
};
use super::handle::AudioHandle;
use super::player::AudioPlayer;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct AudioThreadHandle {
    pub handle: AudioHandle,
    event_rx: Option<AudioEventReceiver>,
    thread_handle: Option<JoinHandle<()>>,
}

impl AudioThreadHandle {
    pub fn take_event_rx(&mut self) -> Option<AudioEventReceiver> {
        self.event_rx.take()
    }

    /// Ask the thread to exit and wait up to `timeout` for it
    pub fn join(mut self, timeout: Duration) -> Result<(), String> {
        if let Some(handle) = self.thread_handle.take() {
            self.handle.shutdown();

            let start = std::time::Instant::now();
            loop {
                if handle.is_finished() {
                    let _ = handle.join();
                    return Ok(());
                }
                if start.elapsed() > timeout {
                    return Err("Audio thread did not exit in time".to_string());
                }
                thread::sleep(Duration::from_millis(10));
            }
        }
        Ok(())
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        self.handle.shutdown();
    }
}

/// Spawn the audio thread on the default output device
///
/// Fails if the device cannot be opened, so the caller can fall back to a
/// silent output.
pub fn spawn_audio_thread(client: Client) -> Result<AudioThreadHandle, String> {
    let (command_tx, command_rx) = audio_command_channel();
    let (event_tx, event_rx) = audio_event_channel();
    let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), String>>(1);

    let state = SharedPlaybackState::new();
    let state_clone = state.clone();
    let handle = AudioHandle::new(command_tx, state, client);

    let thread_handle = thread::Builder::new()
        .name("audio-player".to_string())
        .spawn(move || match AudioPlayer::new() {
            Ok(player) => {
                let _ = ready_tx.send(Ok(()));
                audio_thread_main(player, command_rx, event_tx, state_clone);
            }
            Err(e) => {
                tracing::error!("Failed to create audio player: {}", e);
                let _ = ready_tx.send(Err(e));
            }
        })
        .map_err(|e| format!("Failed to spawn audio thread: {}", e))?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(AudioThreadHandle {
            handle,
            event_rx: Some(event_rx),
            thread_handle: Some(thread_handle),
        }),
        Ok(Err(e)) => Err(e),
        Err(_) => Err("Audio thread exited during startup".to_string()),
    }
}

fn audio_thread_main(
    mut player: AudioPlayer,
    mut command_rx: AudioCommandReceiver,
    event_tx: AudioEventSender,
    state: SharedPlaybackState,
) {
    tracing::info!("Audio thread started");

    loop {
        match command_rx.try_recv() {
            Ok(AudioCommand::Shutdown) => break,
            Ok(cmd) => handle_command(&mut player, &event_tx, &state, cmd),
            Err(TryRecvError::Empty) => {
                state.set_position(player.position());
                check_playback_finished(&mut player, &event_tx, &state);
                thread::sleep(POLL_INTERVAL);
            }
            Err(TryRecvError::Disconnected) => break,
        }
    }

    player.stop();
    tracing::info!("Audio thread exited");
}

fn handle_command(
    player: &mut AudioPlayer,
    event_tx: &AudioEventSender,
    state: &SharedPlaybackState,
    cmd: AudioCommand,
) {
    match cmd {
        AudioCommand::Play { audio } => {
            let url = audio.url.clone();
            match player.play(audio) {
                Ok(()) => {
                    state.set_clip(Some(url.clone()), player.duration());
                    state.set_status(OutputStatus::Playing);
                    let _ = event_tx.send(AudioEvent::Started { url });
                }
                Err(e) => report_error(event_tx, state, e),
            }
        }

        AudioCommand::Pause => {
            player.pause();
            let position = player.position();
            state.set_position(position);
            state.set_status(player.status());
            let _ = event_tx.send(AudioEvent::Paused { position });
        }

        AudioCommand::Resume => {
            player.resume();
            state.set_status(player.status());
            let _ = event_tx.send(AudioEvent::Resumed);
        }

        AudioCommand::Restart => match player.restart() {
            Ok(()) => {
                state.set_position(Duration::ZERO);
                state.set_status(OutputStatus::Playing);
                if let Some(url) = player.current_url() {
                    let _ = event_tx.send(AudioEvent::Started {
                        url: url.to_string(),
                    });
                }
            }
            Err(e) => report_error(event_tx, state, e),
        },

        AudioCommand::Seek { position } => {
            if let Err(e) = player.seek(position) {
                tracing::warn!("{}", e);
            }
            state.set_position(player.position());
        }

        AudioCommand::Stop => {
            player.stop();
            state.clear();
            let _ = event_tx.send(AudioEvent::Stopped);
        }

        AudioCommand::Shutdown => {}
    }
}

fn report_error(event_tx: &AudioEventSender, state: &SharedPlaybackState, message: String) {
    tracing::error!("Audio error: {}", message);
    state.clear();
    let _ = event_tx.send(AudioEvent::Error { message });
}

/// Send `Finished` once per drained clip
fn check_playback_finished(
    player: &mut AudioPlayer,
    event_tx: &AudioEventSender,
    state: &SharedPlaybackState,
) {
    if player.is_finished() {
        player.mark_finished();
        state.set_status(OutputStatus::Stopped);
        if let Some(url) = player.current_url() {
            let _ = event_tx.send(AudioEvent::Finished {
                url: url.to_string(),
            });
        }
    }
}
