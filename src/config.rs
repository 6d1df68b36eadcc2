//! Runtime configuration
//!
//! Addresses of the remote content and audio services plus the local data
//! directory. Every field has a default; the binary overrides them from the
//! command line.

use std::path::PathBuf;
use std::time::Duration;

/// Base address of the text/translation service
pub const DEFAULT_API_BASE: &str = "https://api.alquran.cloud/v1";

/// Host serving per-verse recitation files
pub const DEFAULT_AUDIO_HOST: &str = "https://the-quran-project.github.io/Quran-Audio/Data";

pub const DEFAULT_AUDIO_EXT: &str = "mp3";

/// Edition used for commentary lookups
pub const DEFAULT_COMMENTARY_EDITION: &str = "en.jalalayn";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base: String,
    pub audio_host: String,
    pub audio_ext: String,
    pub commentary_edition: String,
    /// Applied to every content and audio request
    pub request_timeout: Duration,
    /// Overrides the platform data directory when set
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            audio_host: DEFAULT_AUDIO_HOST.to_string(),
            audio_ext: DEFAULT_AUDIO_EXT.to_string(),
            commentary_edition: DEFAULT_COMMENTARY_EDITION.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: None,
        }
    }
}

impl Config {
    /// Directory holding persisted preferences and bookmarks
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(|| {
            directories::ProjectDirs::from("org", "tartil", "Tartil")
                .map(|dirs| dirs.data_dir().to_path_buf())
        })
    }
}
