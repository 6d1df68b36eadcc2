//! rodio-backed player owned by the audio thread

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::events::OutputStatus;
use super::output::LoadedAudio;

/// Read the total duration from a clip's header, if it has one
pub fn probe_duration(data: Arc<[u8]>) -> Option<Duration> {
    Decoder::new(Cursor::new(data))
        .ok()
        .and_then(|source| source.total_duration())
}

/// Plays one clip at a time on the default output device
pub struct AudioPlayer {
    _stream: OutputStream,
    mixer: Mixer,
    sink: Option<Sink>,
    current: Option<LoadedAudio>,
    duration: Option<Duration>,
    status: OutputStatus,
}

impl AudioPlayer {
    /// Open the default output device
    pub fn new() -> Result<Self, String> {
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| format!("Failed to create audio output: {}", e))?;
        let mixer = stream.mixer().clone();

        Ok(Self {
            _stream: stream,
            mixer,
            sink: None,
            current: None,
            duration: None,
            status: OutputStatus::Stopped,
        })
    }

    /// Play a clip, replacing the current one
    pub fn play(&mut self, audio: LoadedAudio) -> Result<(), String> {
        self.stop();

        let source = Decoder::new(Cursor::new(audio.data.clone()))
            .map_err(|e| format!("Failed to decode audio: {}", e))?;
        let duration = source.total_duration().or(audio.duration);

        let sink = Sink::connect_new(&self.mixer);
        sink.append(source);
        sink.play();

        tracing::info!("Playing {}, duration: {:?}", audio.url, duration);
        self.sink = Some(sink);
        self.current = Some(audio);
        self.duration = duration;
        self.status = OutputStatus::Playing;
        Ok(())
    }

    pub fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
            self.status = OutputStatus::Paused;
        }
    }

    pub fn resume(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
            self.status = OutputStatus::Playing;
        }
    }

    /// Replay the current clip from the start
    ///
    /// Re-decodes from the fetched bytes since a drained sink cannot be
    /// rewound.
    pub fn restart(&mut self) -> Result<(), String> {
        let audio = self.current.clone().ok_or("No audio loaded")?;
        self.play(audio)
    }

    pub fn seek(&mut self, position: Duration) -> Result<(), String> {
        let sink = self.sink.as_ref().ok_or("No audio loaded")?;
        sink.try_seek(position)
            .map_err(|e| format!("Seek to {:?} failed: {:?}", position, e))?;
        tracing::debug!("Seek to {:?} successful", position);
        Ok(())
    }

    /// Stop and release the current clip
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.current = None;
        self.duration = None;
        self.status = OutputStatus::Stopped;
    }

    pub fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map(|sink| sink.get_pos())
            .unwrap_or(Duration::ZERO)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn status(&self) -> OutputStatus {
        self.status
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|audio| audio.url.as_str())
    }

    /// True once a playing clip has drained
    pub fn is_finished(&self) -> bool {
        self.status == OutputStatus::Playing && self.sink.as_ref().is_some_and(|sink| sink.empty())
    }

    /// Record that the finished clip is no longer playing
    pub fn mark_finished(&mut self) {
        self.status = OutputStatus::Stopped;
    }
}
