//! Feature modules - persisted user state
//!
//! Each feature module owns one durable record. Features do not depend on
//! playback or rendering.

pub mod bookmarks;
pub mod settings;
pub mod storage;

pub use bookmarks::{Bookmark, BookmarkManager};
pub use settings::{LoopMode, NO_TRANSLATION, PreferenceStore, Preferences, Theme};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
