//! User preference persistence
//!
//! Handles saving and loading of reader/player preferences. Persisted
//! records are overlaid onto the defaults one field at a time, so a record
//! written by an older version (or partially corrupted) still loads.

use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::storage::KeyValueStore;

/// Well-known storage key of the preferences record
pub const SETTINGS_KEY: &str = "quran-app-settings";

/// Translation id meaning "show no translation"
pub const NO_TRANSLATION: &str = "none";

/// Repeat behaviour of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LoopMode {
    /// Stop (or advance, when playing continuously) after each verse
    #[default]
    #[serde(rename = "none")]
    None,
    /// Repeat the current verse
    #[serde(rename = "ayah")]
    Verse,
    /// Wrap from the last verse back to the first
    #[serde(rename = "surah")]
    Chapter,
}

impl LoopMode {
    /// Get the next loop mode in cycle order
    pub fn next(self) -> Self {
        match self {
            LoopMode::None => LoopMode::Verse,
            LoopMode::Verse => LoopMode::Chapter,
            LoopMode::Chapter => LoopMode::None,
        }
    }

    /// Get display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            LoopMode::None => "Loop disabled",
            LoopMode::Verse => "Loop current ayah",
            LoopMode::Chapter => "Loop entire surah",
        }
    }
}

impl std::fmt::Display for LoopMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopMode::None => write!(f, "none"),
            LoopMode::Verse => write!(f, "verse"),
            LoopMode::Chapter => write!(f, "chapter"),
        }
    }
}

impl FromStr for LoopMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(LoopMode::None),
            "verse" | "ayah" | "one" => Ok(LoopMode::Verse),
            "chapter" | "surah" | "all" => Ok(LoopMode::Chapter),
            other => Err(format!("unknown loop mode: {}", other)),
        }
    }
}

/// Colour scheme; stored only, never applied by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Persisted user preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    /// Reciter id, mapped to a provider code when resolving audio
    #[serde(rename = "reciter")]
    pub reciter_id: String,
    /// Translation edition, or [`NO_TRANSLATION`]
    #[serde(rename = "translation")]
    pub translation_id: String,
    #[serde(rename = "tafsir")]
    pub tafsir_id: String,
    /// Persisted mirror of the sequencer's loop mode
    pub loop_mode: LoopMode,
    pub auto_scroll: bool,
    pub word_by_word: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            reciter_id: "7".to_string(), // Mishary Rashid Alafasy
            translation_id: "en.sahih".to_string(),
            tafsir_id: "169".to_string(), // Ibn Kathir
            loop_mode: LoopMode::None,
            auto_scroll: true,
            word_by_word: false,
        }
    }
}

impl Preferences {
    /// Overlay a persisted JSON record onto the defaults
    ///
    /// Unknown fields are ignored and fields that fail to deserialize keep
    /// their default. Only a record that is not a JSON object at all is an
    /// error.
    pub fn from_persisted(raw: &str) -> Result<Self, serde_json::Error> {
        let persisted = match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => map,
            other => {
                return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                    "expected an object, found {}",
                    json_type_name(&other)
                )));
            }
        };

        let mut merged: Map<String, Value> = match serde_json::to_value(Self::default())? {
            Value::Object(map) => map,
            _ => return Ok(Self::default()),
        };

        for (field, value) in persisted {
            if !merged.contains_key(&field) {
                tracing::debug!("Ignoring unknown preference field {:?}", field);
                continue;
            }

            let mut candidate = merged.clone();
            candidate.insert(field.clone(), value);
            if serde_json::from_value::<Self>(Value::Object(candidate.clone())).is_ok() {
                merged = candidate;
            } else {
                tracing::warn!("Malformed preference field {:?}, keeping default", field);
            }
        }

        serde_json::from_value(Value::Object(merged))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Preferences backed by a key-value store
///
/// Keeps an in-memory copy that is a cache of the persisted record. Storage
/// failures are logged and never returned to the caller.
pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<Preferences>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("current", &*self.current.read())
            .finish_non_exhaustive()
    }
}

impl PreferenceStore {
    /// Create a store and load the persisted preferences
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let this = Self {
            store,
            current: RwLock::new(Preferences::default()),
        };
        this.load();
        this
    }

    /// Reload from storage, falling back to defaults on any failure
    pub fn load(&self) -> Preferences {
        let loaded = match self.store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => Preferences::from_persisted(&raw).unwrap_or_else(|e| {
                tracing::error!("Failed to parse saved preferences, using defaults: {}", e);
                Preferences::default()
            }),
            Ok(None) => Preferences::default(),
            Err(e) => {
                tracing::error!("Failed to read saved preferences, using defaults: {}", e);
                Preferences::default()
            }
        };

        *self.current.write() = loaded.clone();
        loaded
    }

    /// Persist `prefs` and make them current
    pub fn save(&self, prefs: &Preferences) {
        *self.current.write() = prefs.clone();
        self.persist(prefs);
    }

    /// Current in-memory preferences
    pub fn get(&self) -> Preferences {
        self.current.read().clone()
    }

    /// Apply `f` to the current preferences and persist the result
    pub fn update(&self, f: impl FnOnce(&mut Preferences)) -> Preferences {
        let updated = {
            let mut current = self.current.write();
            f(&mut current);
            current.clone()
        };
        self.persist(&updated);
        updated
    }

    fn persist(&self, prefs: &Preferences) {
        let content = match serde_json::to_string(prefs) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Failed to serialize preferences: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(SETTINGS_KEY, &content) {
            tracing::error!("Failed to save preferences: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::storage::MemoryStore;
    use crate::testing::FailingStore;

    fn memory() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::default())
    }

    #[test]
    fn loop_mode_cycle_closes_after_three_steps() {
        for start in [LoopMode::None, LoopMode::Verse, LoopMode::Chapter] {
            assert_eq!(start.next().next().next(), start);
        }
        assert_eq!(LoopMode::None.next(), LoopMode::Verse);
        assert_eq!(LoopMode::Verse.next(), LoopMode::Chapter);
        assert_eq!(LoopMode::Chapter.next(), LoopMode::None);
    }

    #[test]
    fn loop_mode_uses_legacy_wire_names() {
        assert_eq!(serde_json::to_string(&LoopMode::Verse).unwrap(), r#""ayah""#);
        assert_eq!(
            serde_json::from_str::<LoopMode>(r#""surah""#).unwrap(),
            LoopMode::Chapter
        );
        assert_eq!("verse".parse::<LoopMode>().unwrap(), LoopMode::Verse);
        assert!("sometimes".parse::<LoopMode>().is_err());
    }

    #[test]
    fn save_then_load_round_trips() {
        let backing = memory();
        let store = PreferenceStore::new(backing.clone());

        let prefs = Preferences {
            theme: Theme::Dark,
            reciter_id: "4".to_string(),
            translation_id: "ur.jalandhry".to_string(),
            tafsir_id: "170".to_string(),
            loop_mode: LoopMode::Chapter,
            auto_scroll: false,
            word_by_word: true,
        };
        store.save(&prefs);

        let reopened = PreferenceStore::new(backing);
        assert_eq!(reopened.load(), prefs);
        assert_eq!(reopened.get(), prefs);
    }

    #[test]
    fn persisted_record_uses_original_field_names() {
        let backing = memory();
        let store = PreferenceStore::new(backing.clone());
        store.save(&Preferences::default());

        let raw = backing.get(SETTINGS_KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["reciter"], "7");
        assert_eq!(value["translation"], "en.sahih");
        assert_eq!(value["loopMode"], "none");
        assert_eq!(value["autoScroll"], true);
        assert_eq!(value["wordByWord"], false);
    }

    #[test]
    fn older_record_keeps_defaults_for_missing_fields() {
        let prefs = Preferences::from_persisted(r#"{"theme":"dark","reciter":"1"}"#).unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.reciter_id, "1");
        assert_eq!(prefs.translation_id, "en.sahih");
        assert_eq!(prefs.loop_mode, LoopMode::None);
        assert!(prefs.auto_scroll);
        assert!(!prefs.word_by_word);
    }

    #[test]
    fn malformed_fields_keep_defaults() {
        let prefs = Preferences::from_persisted(
            r#"{"autoScroll":"yes","loopMode":"forever","wordByWord":true,"extra":1}"#,
        )
        .unwrap();
        assert!(prefs.auto_scroll);
        assert_eq!(prefs.loop_mode, LoopMode::None);
        assert!(prefs.word_by_word);
    }

    #[test]
    fn garbage_record_loads_defaults() {
        assert!(Preferences::from_persisted("not json").is_err());
        assert!(Preferences::from_persisted("[1,2,3]").is_err());

        let backing = memory();
        backing.set(SETTINGS_KEY, "{{{{").unwrap();
        let store = PreferenceStore::new(backing);
        assert_eq!(store.get(), Preferences::default());
    }

    #[test]
    fn storage_failures_are_not_fatal() {
        let store = PreferenceStore::new(Arc::new(FailingStore));
        assert_eq!(store.get(), Preferences::default());

        let updated = store.update(|p| p.loop_mode = LoopMode::Verse);
        assert_eq!(updated.loop_mode, LoopMode::Verse);
        assert_eq!(store.get().loop_mode, LoopMode::Verse);
    }
}
