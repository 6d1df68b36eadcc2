//! The playback seam between the sequencer and an audio backend

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::error::Result;

/// A fetched clip, ready to hand to [`AudioOutput::start`]
#[derive(Clone)]
pub struct LoadedAudio {
    pub url: String,
    pub data: Arc<[u8]>,
    /// Known up front only when the container header reports it
    pub duration: Option<Duration>,
}

impl std::fmt::Debug for LoadedAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedAudio")
            .field("url", &self.url)
            .field("bytes", &self.data.len())
            .field("duration", &self.duration)
            .finish()
    }
}

/// One audio resource at a time
///
/// `fetch` is the only suspension point; every other call is a non-blocking
/// command. Completion is reported as [`AudioEvent::Finished`] on the
/// backend's event channel.
///
/// [`AudioEvent::Finished`]: super::AudioEvent::Finished
pub trait AudioOutput: Send + Sync {
    /// Download and probe a clip without touching what is playing
    fn fetch(&self, url: String) -> BoxFuture<'static, Result<LoadedAudio>>;
    /// Replace the current clip and start playing it
    fn start(&self, audio: LoadedAudio);
    fn pause(&self);
    fn resume(&self);
    /// Play the current clip again from the beginning
    fn restart(&self);
    fn seek(&self, position: Duration);
    /// Stop and release the current clip
    fn stop(&self);
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
}
