//! Bookmark actions on the open chapter

use crate::app::AppContext;
use crate::error::{Error, Result};
use crate::features::Bookmark;
use crate::model::{Verse, VerseKey};

impl AppContext {
    /// Bookmark or un-bookmark a verse of the open chapter
    ///
    /// Returns whether the verse is bookmarked afterwards.
    pub fn toggle_bookmark(&self, verse_key: &str) -> Result<bool> {
        let key = VerseKey::parse(verse_key)?;
        let key_str = key.to_string();

        let bookmarked = if self.bookmarks.is_bookmarked(&key_str) {
            self.bookmarks.remove(&key_str);
            false
        } else {
            let (chapter, verse) = {
                let reader = self.reader.lock();
                let chapter = reader
                    .chapter
                    .clone()
                    .filter(|c| c.id == key.chapter)
                    .ok_or_else(|| not_loaded(key))?;
                let verse = find_verse(&reader.verses, key).ok_or_else(|| not_loaded(key))?;
                (chapter, verse)
            };
            self.bookmarks.add(&verse, &chapter);
            true
        };

        self.notify_bookmarks();
        Ok(bookmarked)
    }

    /// Returns false when the key was not bookmarked
    pub fn remove_bookmark(&self, verse_key: &str) -> bool {
        let removed = self.bookmarks.remove(verse_key);
        if removed {
            self.notify_bookmarks();
        }
        removed
    }

    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.bookmarks.list()
    }

    /// Open the bookmarked verse's chapter and return the verse to scroll to
    pub async fn go_to_bookmark(&self, verse_key: &str) -> Result<Verse> {
        let key = VerseKey::parse(verse_key)?;
        self.ensure_open(key.chapter).await?;

        let reader = self.reader.lock();
        find_verse(&reader.verses, key).ok_or_else(|| not_loaded(key))
    }

    fn notify_bookmarks(&self) {
        let list = self.bookmarks.list();
        self.renderer.on_bookmarks_changed(&list);
    }
}

fn find_verse(verses: &[Verse], key: VerseKey) -> Option<Verse> {
    verses.iter().find(|v| v.key == key).cloned()
}

fn not_loaded(key: VerseKey) -> Error {
    Error::VerseNotFound {
        chapter_id: key.chapter,
        verse_number: key.verse,
    }
}

#[cfg(test)]
mod tests {
    use crate::app::fixture::fixture;
    use crate::error::{Error, ErrorKind};

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let f = fixture();
        f.app.open_chapter(2).await.unwrap();

        assert!(f.app.toggle_bookmark("2:3").unwrap());
        let shown = f.renderer.last_bookmarks().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].chapter_name_transliterated, "Chapter 2");
        assert_eq!(shown[0].translation.as_deref(), Some("translation 3"));

        assert!(!f.app.toggle_bookmark("2:3").unwrap());
        assert!(f.app.bookmarks().is_empty());
        assert!(f.renderer.last_bookmarks().unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_needs_the_verse_loaded() {
        let f = fixture();
        f.app.open_chapter(2).await.unwrap();

        assert_eq!(
            f.app.toggle_bookmark("3:1").unwrap_err(),
            Error::VerseNotFound {
                chapter_id: 3,
                verse_number: 1
            }
        );
        assert_eq!(
            f.app.toggle_bookmark("2:9").unwrap_err().kind(),
            ErrorKind::VerseNotFound
        );
        assert_eq!(
            f.app.toggle_bookmark("2-1").unwrap_err().kind(),
            ErrorKind::InvalidKey
        );
        assert!(f.app.bookmarks().is_empty());
    }

    #[tokio::test]
    async fn bookmark_can_be_removed_from_another_chapter() {
        let f = fixture();
        f.app.open_chapter(2).await.unwrap();
        f.app.toggle_bookmark("2:5").unwrap();
        f.app.open_chapter(1).await.unwrap();

        assert!(!f.app.toggle_bookmark("2:5").unwrap());
        assert!(!f.app.remove_bookmark("2:5"));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let f = fixture();
        f.app.open_chapter(1).await.unwrap();
        f.app.toggle_bookmark("1:1").unwrap();

        assert!(f.app.remove_bookmark("1:1"));
        assert!(!f.app.remove_bookmark("1:1"));
    }

    #[tokio::test]
    async fn go_to_bookmark_opens_its_chapter() {
        let f = fixture();
        f.app.open_chapter(3).await.unwrap();
        f.app.toggle_bookmark("3:4").unwrap();
        f.app.open_chapter(1).await.unwrap();

        let verse = f.app.go_to_bookmark("3:4").await.unwrap();
        assert_eq!(verse.verse_number, 4);
        assert_eq!(f.app.open_chapter_info().unwrap().id, 3);
    }
}
