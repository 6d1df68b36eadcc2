//! Content gateway
//!
//! Chapter list, verse text with translation, audio addresses and
//! commentary, fetched best-effort with no retries.

use std::sync::Arc;

use futures_util::future;
use parking_lot::RwLock;
use serde_json::Value;

use super::model::{EditionText, SurahInfo, SurahText, take_data};
use super::reciters::AudioAddress;
use super::transport::Transport;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::features::NO_TRANSLATION;
use crate::model::{CHAPTER_COUNT, Chapter, Verse};

const TAFSIR_UNAVAILABLE: &str = "Tafsir not available for this verse.";

pub struct ContentGateway {
    transport: Arc<dyn Transport>,
    address: AudioAddress,
    commentary_edition: String,
    chapters: RwLock<Option<Arc<[Chapter]>>>,
}

impl std::fmt::Debug for ContentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentGateway")
            .field("address", &self.address)
            .field("commentary_edition", &self.commentary_edition)
            .field("chapters_cached", &self.chapters.read().is_some())
            .finish()
    }
}

impl ContentGateway {
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self {
            transport,
            address: AudioAddress::from_config(config),
            commentary_edition: config.commentary_edition.clone(),
            chapters: RwLock::new(None),
        }
    }

    pub fn audio_address(&self) -> &AudioAddress {
        &self.address
    }

    /// The chapter list, fetched on first use and cached for the session
    pub async fn list_chapters(&self) -> Result<Arc<[Chapter]>> {
        if let Some(chapters) = self.cached_chapters() {
            return Ok(chapters);
        }

        let response = self
            .transport
            .get_json("surah".to_string())
            .await
            .map_err(|e| Error::ServiceUnavailable(e.to_string()))?;

        let data = take_data(response)
            .ok_or_else(|| Error::ServiceUnavailable("chapter list has no data".to_string()))?;
        let entries: Vec<SurahInfo> = serde_json::from_value(data)
            .map_err(|e| Error::InvalidResponse(format!("chapter list: {}", e)))?;
        if entries.is_empty() {
            return Err(Error::ServiceUnavailable("chapter list is empty".to_string()));
        }

        let chapters = entries
            .into_iter()
            .map(SurahInfo::into_chapter)
            .collect::<Result<Vec<_>>>()?;
        let chapters: Arc<[Chapter]> = chapters.into();

        tracing::info!("Loaded {} chapters", chapters.len());
        *self.chapters.write() = Some(chapters.clone());
        Ok(chapters)
    }

    /// The cached chapter list, without I/O
    pub fn cached_chapters(&self) -> Option<Arc<[Chapter]>> {
        self.chapters.read().clone()
    }

    pub fn cached_chapter(&self, id: u16) -> Option<Chapter> {
        self.chapters
            .read()
            .as_ref()
            .and_then(|chapters| chapters.iter().find(|c| c.id == id).cloned())
    }

    /// Load a chapter's verses with their translation
    ///
    /// The original text and the translation are fetched concurrently and
    /// paired by position. A failed translation leaves every verse without
    /// one; only the original text is required.
    pub async fn load_verses(&self, chapter_id: u16, translation_id: &str) -> Result<Vec<Verse>> {
        if chapter_id == 0 || chapter_id > CHAPTER_COUNT {
            return Err(Error::ChapterNotFound(chapter_id));
        }

        let text = self.transport.get_json(format!("surah/{}", chapter_id));
        let translation = async {
            if translation_id.is_empty() || translation_id == NO_TRANSLATION {
                return None;
            }
            let path = format!("surah/{}/{}", chapter_id, translation_id);
            Some(self.transport.get_json(path).await)
        };
        let (text, translation) = future::join(text, translation).await;

        let ayahs = parse_surah_text(text?)
            .ok_or_else(|| Error::InvalidResponse(format!("chapter {} text has no verses", chapter_id)))?
            .ayahs;
        if ayahs.is_empty() {
            return Err(Error::InvalidResponse(format!(
                "chapter {} text is empty",
                chapter_id
            )));
        }

        let translations: Vec<String> = match translation {
            None => Vec::new(),
            Some(Ok(value)) => match parse_surah_text(value) {
                Some(body) => body.ayahs.into_iter().map(|a| a.text).collect(),
                None => {
                    tracing::warn!(
                        "Translation {} of chapter {} has an unexpected shape",
                        translation_id,
                        chapter_id
                    );
                    Vec::new()
                }
            },
            Some(Err(e)) => {
                tracing::warn!(
                    "Failed to load translation {} of chapter {}: {}",
                    translation_id,
                    chapter_id,
                    e
                );
                Vec::new()
            }
        };

        let verses = ayahs
            .into_iter()
            .enumerate()
            .map(|(i, ayah)| ayah.into_verse(chapter_id, translations.get(i).cloned()))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "Loaded chapter {} ({} verses, translation: {})",
            chapter_id,
            verses.len(),
            translation_id
        );
        Ok(verses)
    }

    /// Commentary for a verse; a placeholder when none can be fetched
    pub async fn fetch_tafsir(&self, verse_key: &str) -> String {
        let (chapter, verse) = verse_key.split_once(':').unwrap_or((verse_key, ""));
        let path = format!(
            "ayah/{}:{}/editions/quran-simple,{}",
            chapter.trim(),
            verse.trim(),
            self.commentary_edition
        );

        match self.transport.get_json(path).await {
            Ok(value) => match commentary_text(value) {
                Some(text) if text.trim().is_empty() => TAFSIR_UNAVAILABLE.to_string(),
                Some(text) => text,
                None => {
                    tracing::warn!("Commentary for {} has an unexpected shape", verse_key);
                    self.tafsir_placeholder(chapter, verse)
                }
            },
            Err(e) => {
                tracing::warn!("Failed to load commentary for {}: {}", verse_key, e);
                self.tafsir_placeholder(chapter, verse)
            }
        }
    }

    fn tafsir_placeholder(&self, chapter: &str, verse: &str) -> String {
        let chapter_name = chapter
            .trim()
            .parse::<u16>()
            .ok()
            .and_then(|id| self.cached_chapter(id))
            .map(|c| c.name_transliterated)
            .unwrap_or_else(|| chapter.trim().to_string());

        format!(
            "This is verse {} from Surah {}. For detailed tafsir commentary, please consult authentic Islamic sources and scholars.",
            verse.trim(),
            chapter_name
        )
    }
}

fn parse_surah_text(value: Value) -> Option<SurahText> {
    take_data(value).and_then(|data| serde_json::from_value(data).ok())
}

/// Second edition entry; the first is the plain text
fn commentary_text(value: Value) -> Option<String> {
    let editions: Vec<EditionText> = serde_json::from_value(take_data(value)?).ok()?;
    let entry = editions.into_iter().nth(1)?;
    Some(entry.text.unwrap_or_default())
}
