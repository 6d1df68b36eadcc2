//! Playback state owned by the sequencer

use std::time::Duration;

use crate::features::LoopMode;
use crate::model::Verse;

/// Where the sequencer is in its load/play cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    /// No verse is selected or the last load failed
    #[default]
    Idle,
    /// Audio for the current verse is being fetched
    Loading,
    Playing,
    Paused,
    /// The current verse finished and nothing replaced it yet
    Ended,
}

impl PlaybackPhase {
    pub fn display_name(&self) -> &'static str {
        match self {
            PlaybackPhase::Idle => "Idle",
            PlaybackPhase::Loading => "Loading",
            PlaybackPhase::Playing => "Playing",
            PlaybackPhase::Paused => "Paused",
            PlaybackPhase::Ended => "Ended",
        }
    }
}

/// The audio resource currently handed to the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRef {
    pub url: String,
    pub verse_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub chapter_id: Option<u16>,
    /// Index into the playing sequence
    pub verse_index: usize,
    pub phase: PlaybackPhase,
    pub loop_mode: LoopMode,
    pub continuous_play: bool,
    pub current_audio: Option<AudioRef>,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }
}

/// What the renderer shows of playback
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub chapter_id: Option<u16>,
    pub verse_index: usize,
    pub current_verse: Option<Verse>,
    pub loop_mode: LoopMode,
    pub continuous_play: bool,
    pub elapsed: Duration,
    pub duration: Option<Duration>,
}

impl PlaybackSnapshot {
    /// Fraction of the clip played, when the duration is known
    pub fn progress(&self) -> Option<f64> {
        self.duration
            .filter(|d| !d.is_zero())
            .map(|d| (self.elapsed.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0))
    }
}
