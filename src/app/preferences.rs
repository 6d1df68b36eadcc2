//! Settings actions
//!
//! Every change is persisted immediately. Storage failures are logged by the
//! preference store and never reach the caller.

use crate::app::AppContext;
use crate::error::Result;
use crate::features::{LoopMode, Theme};

impl AppContext {
    /// Later audio loads use the new reciter; the playing verse is untouched
    pub fn change_reciter(&self, reciter_id: &str) {
        self.preferences
            .update(|prefs| prefs.reciter_id = reciter_id.to_string());
        tracing::info!("Reciter changed to {}", reciter_id);
    }

    /// Persist the translation and reload the open chapter with it
    pub async fn change_translation(&self, translation_id: &str) -> Result<()> {
        self.preferences
            .update(|prefs| prefs.translation_id = translation_id.to_string());
        tracing::info!("Translation changed to {}", translation_id);

        let open = self.reader.lock().chapter.as_ref().map(|c| c.id);
        match open {
            Some(chapter_id) => self.open_chapter(chapter_id).await,
            None => Ok(()),
        }
    }

    pub fn change_tafsir(&self, tafsir_id: &str) {
        self.preferences
            .update(|prefs| prefs.tafsir_id = tafsir_id.to_string());
    }

    pub fn set_auto_scroll(&self, enabled: bool) {
        self.preferences.update(|prefs| prefs.auto_scroll = enabled);
    }

    /// Returns the new value
    pub fn toggle_word_by_word(&self) -> bool {
        self.preferences
            .update(|prefs| prefs.word_by_word = !prefs.word_by_word)
            .word_by_word
    }

    /// Returns the new theme
    pub fn toggle_theme(&self) -> Theme {
        self.preferences
            .update(|prefs| prefs.theme = prefs.theme.toggled())
            .theme
    }

    pub fn set_loop_mode(&self, mode: LoopMode) {
        self.sequencer.set_loop_mode(mode);
    }

    pub fn cycle_loop_mode(&self) -> LoopMode {
        self.sequencer.cycle_loop_mode()
    }
}
