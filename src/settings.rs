//! Exercise settings and preferences
//!
//! Persisted in LocalStorage on the web; native builds use defaults or a
//! JSON file handed to the binary.

use serde::{Deserialize, Serialize};

use crate::consts::{ANSWER_CEILING, CELEBRATION_MS, MAX_DISTRACTOR_OFFSET, WRONG_ANSWER_CLEAR_MS};

/// Exercise settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How long a wrong answer stays highlighted before the child may retry (ms)
    pub wrong_answer_clear_ms: u32,
    /// Celebration window after a correct answer, then a new exercise starts (ms)
    pub celebration_ms: u32,
    /// Upper bound for addition/subtraction candidates. Raised per exercise
    /// when the correct total is larger.
    pub answer_ceiling: u32,
    /// Include spoken-number captions ("3 - tres") in snapshots
    pub number_words: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wrong_answer_clear_ms: WRONG_ANSWER_CLEAR_MS,
            celebration_ms: CELEBRATION_MS,
            answer_ceiling: ANSWER_CEILING,
            number_words: true,
        }
    }
}

impl Settings {
    /// Clamp values the engines cannot work with
    pub fn sanitized(mut self) -> Self {
        self.answer_ceiling = self.usable_answer_ceiling();
        self
    }

    /// Answer ceiling raised far enough to fit two distractors below a
    /// correct value sitting at the ceiling
    pub fn usable_answer_ceiling(&self) -> u32 {
        self.answer_ceiling.max(MAX_DISTRACTOR_OFFSET + 1)
    }

    /// Parse settings JSON, falling back to defaults on error
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                Self::default()
            }
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "balloon_math_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match serde_json::to_string(self) {
                Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                    Ok(()) => log::info!("Settings saved"),
                    Err(e) => log::warn!("Could not save settings: {:?}", e),
                },
                Err(e) => log::warn!("Could not serialize settings: {}", e),
            }
        } else {
            log::warn!("LocalStorage unavailable, settings not saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
