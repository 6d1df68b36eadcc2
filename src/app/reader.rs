//! Chapter list, open chapter and commentary

use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::app::AppContext;
use crate::audio::AudioEvent;
use crate::error::{Error, Result};
use crate::model::{Chapter, Verse};

impl AppContext {
    /// Fetch (once) and show the chapter list
    pub async fn load_chapters(&self) -> Result<Arc<[Chapter]>> {
        match self.gateway.list_chapters().await {
            Ok(chapters) => {
                self.renderer.on_chapters_loaded(&chapters);
                Ok(chapters)
            }
            Err(e) => {
                tracing::error!("Failed to load chapters: {}", e);
                self.renderer.on_error(e.kind(), e.user_message());
                Err(e)
            }
        }
    }

    /// Filter the cached chapter list by name or number
    pub fn find_chapters(&self, query: &str) -> Vec<Chapter> {
        self.gateway
            .cached_chapters()
            .map(|chapters| chapters.iter().filter(|c| c.matches(query)).cloned().collect())
            .unwrap_or_default()
    }

    /// Load a chapter's verses with the current translation and show them
    ///
    /// Only the latest of overlapping calls is applied. On failure the
    /// previously open chapter stays open.
    pub async fn open_chapter(&self, chapter_id: u16) -> Result<()> {
        let generation = self.open_generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("Opening chapter {}", chapter_id);

        let loaded = self.fetch_chapter(chapter_id).await;

        let is_current = || self.open_generation.load(Ordering::SeqCst) == generation;
        match loaded {
            Ok((chapter, verses)) => {
                {
                    let mut reader = self.reader.lock();
                    if !is_current() {
                        tracing::debug!("Discarding stale load of chapter {}", chapter_id);
                        return Ok(());
                    }
                    reader.chapter = Some(chapter);
                    reader.verses = verses.clone();
                    self.sequencer.set_verses(chapter_id, verses.clone());
                }
                self.renderer.on_verses_loaded(&verses);
                Ok(())
            }
            Err(_) if !is_current() => Ok(()),
            Err(e) => {
                tracing::error!("Failed to open chapter {}: {}", chapter_id, e);
                self.renderer.on_error(e.kind(), e.user_message());
                Err(e)
            }
        }
    }

    /// Open `chapter_id` unless it is already open
    pub async fn ensure_open(&self, chapter_id: u16) -> Result<()> {
        let open = self.reader.lock().chapter.as_ref().map(|c| c.id);
        if open == Some(chapter_id) {
            return Ok(());
        }
        self.open_chapter(chapter_id).await
    }

    async fn fetch_chapter(&self, chapter_id: u16) -> Result<(Chapter, Arc<[Verse]>)> {
        let chapters = self.gateway.list_chapters().await?;
        let chapter = chapters
            .iter()
            .find(|c| c.id == chapter_id)
            .cloned()
            .ok_or(Error::ChapterNotFound(chapter_id))?;

        let translation = self.preferences.get().translation_id;
        let verses = self.gateway.load_verses(chapter_id, &translation).await?;
        Ok((chapter, verses.into()))
    }

    /// Commentary for a verse; never fails
    pub async fn show_tafsir(&self, verse_key: &str) -> String {
        self.gateway.fetch_tafsir(verse_key).await
    }

    /// Feed an event from the audio backend into playback
    pub fn handle_audio_event(&self, event: &AudioEvent) {
        self.sequencer.on_audio_event(event);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::app::fixture::fixture;
    use crate::audio::AudioEvent;
    use crate::error::{Error, ErrorKind};
    use crate::playback::PlaybackPhase;

    #[tokio::test]
    async fn chapters_are_reported_to_renderer() {
        let f = fixture();
        let chapters = f.app.load_chapters().await.unwrap();
        assert_eq!(chapters.len(), 3);
        assert_eq!(f.renderer.chapter_loads(), 1);

        assert_eq!(f.app.find_chapters("chapter 2").len(), 1);
        assert_eq!(f.app.find_chapters("3")[0].id, 3);
    }

    #[tokio::test]
    async fn chapter_list_failure_is_reported() {
        let f = fixture();
        f.transport.unroute("surah");

        let err = f.app.load_chapters().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(f.renderer.errors(), [ErrorKind::ServiceUnavailable]);
        assert!(f.app.find_chapters("1").is_empty());
    }

    #[tokio::test]
    async fn open_chapter_shows_verses() {
        let f = fixture();
        f.app.open_chapter(2).await.unwrap();

        assert_eq!(f.app.open_chapter_info().unwrap().id, 2);
        assert_eq!(f.app.verses().len(), 7);
        let shown = f.renderer.last_verses().unwrap();
        assert_eq!(shown[0].verse_key(), "2:1");
        assert_eq!(shown[0].translation.as_deref(), Some("translation 1"));

        f.app.sequencer().play_verse(2, 3).await.unwrap();
        assert_eq!(f.app.sequencer().state().phase, PlaybackPhase::Playing);
    }

    #[tokio::test]
    async fn unknown_chapter_keeps_prior_chapter_open() {
        let f = fixture();
        f.app.open_chapter(1).await.unwrap();

        let err = f.app.open_chapter(9).await.unwrap_err();
        assert_eq!(err, Error::ChapterNotFound(9));
        assert_eq!(f.app.open_chapter_info().unwrap().id, 1);
        assert_eq!(f.renderer.verse_loads(), 1);
    }

    #[tokio::test]
    async fn verse_failure_keeps_prior_chapter_open() {
        let f = fixture();
        f.app.open_chapter(1).await.unwrap();
        f.transport.unroute("surah/3");

        let err = f.app.open_chapter(3).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(f.app.open_chapter_info().unwrap().id, 1);
        assert_eq!(f.app.verses().len(), 7);
        assert_eq!(f.renderer.errors(), [ErrorKind::ServiceUnavailable]);
    }

    #[tokio::test(start_paused = true)]
    async fn latest_open_wins() {
        let f = fixture();
        f.app.load_chapters().await.unwrap();
        f.transport.delay("surah/1", Duration::from_secs(2));

        let slow = tokio::spawn({
            let app = f.app.clone();
            async move { app.open_chapter(1).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        f.app.open_chapter(3).await.unwrap();
        slow.await.unwrap().unwrap();

        assert_eq!(f.app.open_chapter_info().unwrap().id, 3);
        assert_eq!(f.app.verses().len(), 5);
        assert_eq!(f.renderer.verse_loads(), 1);
    }

    #[tokio::test]
    async fn ensure_open_skips_open_chapter() {
        let f = fixture();
        f.app.ensure_open(2).await.unwrap();
        f.app.ensure_open(2).await.unwrap();

        let verse_requests = f
            .transport
            .requests()
            .iter()
            .filter(|path| path.as_str() == "surah/2")
            .count();
        assert_eq!(verse_requests, 1);
    }

    #[tokio::test]
    async fn tafsir_is_best_effort() {
        let f = fixture();
        let text = f.app.show_tafsir("2:4").await;
        assert!(text.contains("verse 4"));
    }

    #[tokio::test]
    async fn audio_events_reach_the_sequencer() {
        let f = fixture();
        f.app.open_chapter(1).await.unwrap();
        f.app.sequencer().play_verse(1, 1).await.unwrap();

        let url = f.app.sequencer().state().current_audio.unwrap().url;
        f.app.handle_audio_event(&AudioEvent::Finished { url });
        assert_eq!(f.app.sequencer().state().phase, PlaybackPhase::Ended);
    }
}
