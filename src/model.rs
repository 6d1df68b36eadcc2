//! Domain model: chapters, verses and verse keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of chapters in the corpus
pub const CHAPTER_COUNT: u16 = 114;

/// Stable `"chapter:verse"` identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerseKey {
    pub chapter: u16,
    pub verse: u16,
}

impl VerseKey {
    pub fn new(chapter: u16, verse: u16) -> Result<Self> {
        if chapter == 0 || chapter > CHAPTER_COUNT || verse == 0 {
            return Err(Error::InvalidKey(format!("{}:{}", chapter, verse)));
        }
        Ok(Self { chapter, verse })
    }

    /// Parse `"2:255"`. Whitespace around either number is tolerated.
    pub fn parse(key: &str) -> Result<Self> {
        let invalid = || Error::InvalidKey(key.to_string());

        let (chapter, verse) = key.split_once(':').ok_or_else(invalid)?;
        let chapter = chapter.trim().parse::<u16>().map_err(|_| invalid())?;
        let verse = verse.trim().parse::<u16>().map_err(|_| invalid())?;

        Self::new(chapter, verse).map_err(|_| invalid())
    }
}

impl FromStr for VerseKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

/// Where a chapter was revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevelationPlace {
    Meccan,
    Medinan,
}

impl RevelationPlace {
    pub fn from_service(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "meccan" | "makkah" | "makki" => Some(Self::Meccan),
            "medinan" | "madinah" | "madani" => Some(Self::Medinan),
            _ => None,
        }
    }
}

impl fmt::Display for RevelationPlace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevelationPlace::Meccan => write!(f, "Meccan"),
            RevelationPlace::Medinan => write!(f, "Medinan"),
        }
    }
}

/// A chapter (surah) as listed by the content service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: u16,
    pub name_original: String,
    pub name_transliterated: String,
    pub revelation_place: RevelationPlace,
    pub verse_count: u16,
}

impl Chapter {
    /// Case-insensitive match against either name, or an exact match on the number.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.name_original.to_lowercase().contains(&query)
            || self.name_transliterated.to_lowercase().contains(&query)
            || self.id.to_string() == query
    }
}

/// A single verse (ayah), text plus optional translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    /// Corpus-wide verse number
    pub id: u32,
    /// 1-based position within the chapter
    pub verse_number: u16,
    pub key: VerseKey,
    pub text_original: String,
    pub translation: Option<String>,
}

impl Verse {
    pub fn verse_key(&self) -> String {
        self.key.to_string()
    }

    pub fn chapter_id(&self) -> u16 {
        self.key.chapter
    }
}
