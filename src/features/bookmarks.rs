//! Verse bookmarks
//!
//! A set keyed by verse key, kept in insertion order and written through to
//! storage on every mutation.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::storage::KeyValueStore;
use crate::model::{Chapter, Verse};

/// Well-known storage key of the bookmark list
pub const BOOKMARKS_KEY: &str = "quran-app-bookmarks";

/// A bookmarked verse with enough context to display it offline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub verse_key: String,
    #[serde(rename = "surah_arabic")]
    pub chapter_name_original: String,
    #[serde(rename = "surah_name")]
    pub chapter_name_transliterated: String,
    pub verse_number: u16,
    pub text: String,
    #[serde(default)]
    pub translation: Option<String>,
    /// Unix time in milliseconds
    #[serde(rename = "timestamp")]
    pub created_at: i64,
}

impl Bookmark {
    pub fn new(verse: &Verse, chapter: &Chapter) -> Self {
        Self {
            verse_key: verse.verse_key(),
            chapter_name_original: chapter.name_original.clone(),
            chapter_name_transliterated: chapter.name_transliterated.clone(),
            verse_number: verse.verse_number,
            text: verse.text_original.clone(),
            translation: verse.translation.clone(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

pub struct BookmarkManager {
    store: Arc<dyn KeyValueStore>,
    bookmarks: RwLock<Vec<Bookmark>>,
}

impl std::fmt::Debug for BookmarkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookmarkManager")
            .field("count", &self.bookmarks.read().len())
            .finish_non_exhaustive()
    }
}

impl BookmarkManager {
    /// Create a manager and load the persisted bookmarks
    ///
    /// A missing or unreadable record yields an empty set.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let bookmarks = load_bookmarks(store.as_ref());
        Self {
            store,
            bookmarks: RwLock::new(bookmarks),
        }
    }

    /// Insert a bookmark for `verse`. Returns `false` if it already existed.
    pub fn add(&self, verse: &Verse, chapter: &Chapter) -> bool {
        let key = verse.verse_key();
        let mut bookmarks = self.bookmarks.write();
        if bookmarks.iter().any(|b| b.verse_key == key) {
            return false;
        }
        bookmarks.push(Bookmark::new(verse, chapter));

        tracing::info!("Bookmark added: {}", key);
        self.persist(&bookmarks);
        true
    }

    /// Remove the bookmark for `verse_key`. Returns `false` if there was none.
    pub fn remove(&self, verse_key: &str) -> bool {
        let mut bookmarks = self.bookmarks.write();
        let before = bookmarks.len();
        bookmarks.retain(|b| b.verse_key != verse_key);
        if bookmarks.len() == before {
            return false;
        }

        tracing::info!("Bookmark removed: {}", verse_key);
        self.persist(&bookmarks);
        true
    }

    pub fn is_bookmarked(&self, verse_key: &str) -> bool {
        self.bookmarks.read().iter().any(|b| b.verse_key == verse_key)
    }

    pub fn get(&self, verse_key: &str) -> Option<Bookmark> {
        self.bookmarks
            .read()
            .iter()
            .find(|b| b.verse_key == verse_key)
            .cloned()
    }

    /// All bookmarks in insertion order
    pub fn list(&self) -> Vec<Bookmark> {
        self.bookmarks.read().clone()
    }

    pub fn len(&self) -> usize {
        self.bookmarks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.read().is_empty()
    }

    /// Called with the write lock held so saves land in mutation order
    fn persist(&self, bookmarks: &[Bookmark]) {
        let content = match serde_json::to_string(bookmarks) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Failed to serialize bookmarks: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(BOOKMARKS_KEY, &content) {
            tracing::error!("Failed to save bookmarks: {}", e);
        }
    }
}

fn load_bookmarks(store: &dyn KeyValueStore) -> Vec<Bookmark> {
    let raw = match store.get(BOOKMARKS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::error!("Failed to read bookmarks: {}", e);
            return Vec::new();
        }
    };

    let loaded: Vec<Bookmark> = match serde_json::from_str(&raw) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to parse bookmarks, starting empty: {}", e);
            return Vec::new();
        }
    };

    // Records written by hand or by older builds may repeat a key
    let mut seen = HashSet::new();
    loaded
        .into_iter()
        .filter(|b| seen.insert(b.verse_key.clone()))
        .collect()
}
