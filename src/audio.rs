//! Audio playback module
//!
//! - `AudioOutput`: the seam the sequencer plays through
//! - `AudioHandle` / `spawn_audio_thread`: rodio playback on a dedicated thread
//! - `SilentOutput`: timer-driven stand-in when no sound device is available
//! - `events`: commands, events and shared state of the audio thread

pub mod events;
mod handle;
mod output;
mod player;
mod silent;
mod thread;

pub use events::{AudioEvent, AudioEventReceiver, OutputStatus, SharedPlaybackState};
pub use handle::AudioHandle;
pub use output::{AudioOutput, LoadedAudio};
pub use player::probe_duration;
pub use silent::{DEFAULT_CLIP_LENGTH, SilentOutput};
pub use thread::{AudioThreadHandle, spawn_audio_thread};
