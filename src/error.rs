//! Error taxonomy shared by the content gateway, the sequencer and the stores.

use thiserror::Error;

/// Errors surfaced by core operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Network or remote failure, including timeouts.
    #[error("content service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The remote answered with a payload of the wrong shape.
    #[error("invalid response from content service: {0}")]
    InvalidResponse(String),

    /// Navigation target is not part of the loaded verse sequence.
    #[error("verse {chapter_id}:{verse_number} is not loaded")]
    VerseNotFound { chapter_id: u16, verse_number: u16 },

    /// Requested chapter is not in the chapter list.
    #[error("chapter {0} does not exist")]
    ChapterNotFound(u16),

    /// Malformed `chapter:verse` key.
    #[error("malformed verse key {0:?}")]
    InvalidKey(String),

    /// Persistence read or write failed.
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

/// Discriminant of [`Error`], handed to the renderer alongside a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ServiceUnavailable,
    InvalidResponse,
    VerseNotFound,
    ChapterNotFound,
    InvalidKey,
    StorageFailure,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
            Self::VerseNotFound { .. } => ErrorKind::VerseNotFound,
            Self::ChapterNotFound(_) => ErrorKind::ChapterNotFound,
            Self::InvalidKey(_) => ErrorKind::InvalidKey,
            Self::StorageFailure(_) => ErrorKind::StorageFailure,
        }
    }

    /// Short message suitable for a non-blocking notification.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "Failed to reach the content service. Please check your connection.",
            Self::InvalidResponse(_) => "The content service returned unexpected data. Please try again.",
            Self::VerseNotFound { .. } => "That verse is not loaded.",
            Self::ChapterNotFound(_) => "Surah not found.",
            Self::InvalidKey(_) => "Invalid verse reference.",
            Self::StorageFailure(_) => "Failed to save your changes.",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
