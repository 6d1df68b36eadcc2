//! Presentation seam
//!
//! The core calls into a [`Renderer`] whenever something the user can see
//! changes. All methods default to doing nothing, so a front end implements
//! only what it displays.

use crate::error::ErrorKind;
use crate::features::Bookmark;
use crate::model::{Chapter, Verse};
use crate::playback::PlaybackSnapshot;

pub trait Renderer: Send + Sync {
    fn on_chapters_loaded(&self, _chapters: &[Chapter]) {}

    /// The open chapter's verses were replaced
    fn on_verses_loaded(&self, _verses: &[Verse]) {}

    fn on_playback_state_changed(&self, _state: &PlaybackSnapshot) {}

    /// Non-blocking notification; the operation that failed left prior
    /// state intact
    fn on_error(&self, _kind: ErrorKind, _message: &str) {}

    fn on_bookmarks_changed(&self, _bookmarks: &[Bookmark]) {}
}

/// Renderer that displays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {}
