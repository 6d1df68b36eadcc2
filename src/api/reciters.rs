//! Reciter table and audio addressing

use crate::config::Config;
use crate::model::VerseKey;

/// A selectable reciter and the directory the audio host files it under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reciter {
    pub id: &'static str,
    pub provider_code: &'static str,
    pub name: &'static str,
}

/// Provider code used for reciters missing from [`RECITERS`]
pub const DEFAULT_PROVIDER_CODE: &str = "2";

pub const RECITERS: &[Reciter] = &[
    Reciter {
        id: "7",
        provider_code: "2",
        name: "Mishary Rashid Alafasy",
    },
    Reciter {
        id: "1",
        provider_code: "1",
        name: "Abdul Basit",
    },
    Reciter {
        id: "2",
        provider_code: "3",
        name: "Saad Al-Ghamdi",
    },
    Reciter {
        id: "4",
        provider_code: "4",
        name: "Maher Al-Muaiqly",
    },
    Reciter {
        id: "6",
        provider_code: "5",
        name: "Yasser Al-Dosari",
    },
];

pub fn find_reciter(id: &str) -> Option<&'static Reciter> {
    RECITERS.iter().find(|r| r.id == id)
}

/// Map a reciter id to the audio host's directory code
pub fn provider_code(reciter_id: &str) -> &'static str {
    match find_reciter(reciter_id) {
        Some(reciter) => reciter.provider_code,
        None => {
            tracing::debug!(
                "Unknown reciter {:?}, using provider code {}",
                reciter_id,
                DEFAULT_PROVIDER_CODE
            );
            DEFAULT_PROVIDER_CODE
        }
    }
}

/// Formats `{host}/{provider}/{chapter}_{verse}.{ext}` addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAddress {
    host: String,
    ext: String,
}

impl AudioAddress {
    pub fn new(host: impl Into<String>, ext: impl Into<String>) -> Self {
        let host: String = host.into();
        Self {
            host: host.trim_end_matches('/').to_string(),
            ext: ext.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.audio_host.clone(), config.audio_ext.clone())
    }

    /// Audio address of `key` for `reciter_id`
    ///
    /// Textual keys are validated by [`VerseKey::parse`] before they get here.
    pub fn resolve(&self, key: VerseKey, reciter_id: &str) -> String {
        format!(
            "{}/{}/{}_{}.{}",
            self.host,
            provider_code(reciter_id),
            key.chapter,
            key.verse,
            self.ext
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> AudioAddress {
        AudioAddress::new("https://audio.test/Data/", "mp3")
    }

    fn key(raw: &str) -> VerseKey {
        VerseKey::parse(raw).unwrap()
    }

    #[test]
    fn known_reciters_map_to_their_code() {
        assert_eq!(provider_code("7"), "2");
        assert_eq!(provider_code("1"), "1");
        assert_eq!(provider_code("6"), "5");
    }

    #[test]
    fn unknown_reciter_uses_default_code() {
        assert_eq!(provider_code("999"), DEFAULT_PROVIDER_CODE);
        assert_eq!(provider_code(""), DEFAULT_PROVIDER_CODE);
        assert_eq!(
            address().resolve(key("1:1"), "unmapped"),
            "https://audio.test/Data/2/1_1.mp3"
        );
    }

    #[test]
    fn resolves_address_layout() {
        assert_eq!(
            address().resolve(key("2:255"), "4"),
            "https://audio.test/Data/4/2_255.mp3"
        );
    }
}
