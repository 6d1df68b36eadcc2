//! Playback sequencing
//!
//! - `Sequencer`: the loop/continuous-play state machine
//! - `VerseNavigator`: next/previous index arithmetic
//! - `state`: phase, state and the snapshot handed to the renderer

mod navigator;
mod sequencer;
mod state;

pub use navigator::VerseNavigator;
pub use sequencer::{AUTO_ADVANCE_DELAY, Sequencer};
pub use state::{AudioRef, PlaybackPhase, PlaybackSnapshot, PlaybackState};
