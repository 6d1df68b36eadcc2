//! Wire types of the content service
//!
//! Every response is wrapped in a `{ "data": ... }` envelope. The structs here
//! mirror only the fields the reader uses.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{CHAPTER_COUNT, Chapter, RevelationPlace, Verse, VerseKey};

/// Entry of the `surah` listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurahInfo {
    pub number: u16,
    pub name: String,
    pub english_name: String,
    pub revelation_type: String,
    pub number_of_ayahs: u16,
}

impl SurahInfo {
    pub fn into_chapter(self) -> Result<Chapter> {
        if self.number == 0 || self.number > CHAPTER_COUNT {
            return Err(Error::InvalidResponse(format!(
                "chapter number {} out of range",
                self.number
            )));
        }
        if self.number_of_ayahs == 0 {
            return Err(Error::InvalidResponse(format!(
                "chapter {} has no verses",
                self.number
            )));
        }
        let revelation_place = RevelationPlace::from_service(&self.revelation_type)
            .ok_or_else(|| {
                Error::InvalidResponse(format!(
                    "unknown revelation type {:?} for chapter {}",
                    self.revelation_type, self.number
                ))
            })?;

        Ok(Chapter {
            id: self.number,
            name_original: self.name,
            name_transliterated: self.english_name,
            revelation_place,
            verse_count: self.number_of_ayahs,
        })
    }
}

/// Body of `surah/{id}` and `surah/{id}/{edition}`
#[derive(Debug, Clone, Deserialize)]
pub struct SurahText {
    pub ayahs: Vec<AyahText>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AyahText {
    /// Corpus-wide number
    pub number: u32,
    pub number_in_surah: u16,
    pub text: String,
}

impl AyahText {
    pub fn into_verse(self, chapter_id: u16, translation: Option<String>) -> Result<Verse> {
        let key = VerseKey::new(chapter_id, self.number_in_surah).map_err(|_| {
            Error::InvalidResponse(format!(
                "verse number {} out of range in chapter {}",
                self.number_in_surah, chapter_id
            ))
        })?;

        Ok(Verse {
            id: self.number,
            verse_number: self.number_in_surah,
            key,
            text_original: self.text,
            translation,
        })
    }
}

/// One edition entry of `ayah/{key}/editions/...`
#[derive(Debug, Clone, Deserialize)]
pub struct EditionText {
    #[serde(default)]
    pub text: Option<String>,
}

/// Strip the `{ "data": ... }` envelope; a missing or null `data` yields `None`
pub fn take_data(value: Value) -> Option<Value> {
    match value {
        Value::Object(mut map) => map.remove("data").filter(|data| !data.is_null()),
        _ => None,
    }
}
