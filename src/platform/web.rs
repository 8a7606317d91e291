//! Browser bindings
//!
//! JavaScript owns the DOM, layout and animation. It forwards gestures as
//! JSON intents and redraws from the JSON snapshot after each call.

use wasm_bindgen::prelude::*;

use crate::app::{App, Operation};
use crate::settings::Settings;
use crate::sim::Intent;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Balloon Math loaded");
}

#[wasm_bindgen]
pub struct WebApp {
    app: App,
    last_time: Option<f64>,
}

#[wasm_bindgen]
impl WebApp {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebApp {
        let seed = js_sys::Date::now() as u64;
        log::info!("App initialized with seed: {}", seed);
        WebApp {
            app: App::new(Settings::load(), seed),
            last_time: None,
        }
    }

    /// Open a mini-game by name ("addition", "subtraction", "multiplication")
    pub fn select(&mut self, operation: &str) -> bool {
        match Operation::from_str(operation) {
            Some(op) => {
                self.app.select(op);
                true
            }
            None => {
                log::warn!("Unknown operation: {}", operation);
                false
            }
        }
    }

    pub fn back(&mut self) {
        self.app.back();
    }

    /// Apply a JSON intent such as `{"type":"select_answer","value":5}`.
    /// Returns whether the exercise accepted it.
    pub fn dispatch(&mut self, intent_json: &str) -> bool {
        match serde_json::from_str::<Intent>(intent_json) {
            Ok(intent) => self.app.dispatch(intent).is_ok(),
            Err(e) => {
                log::warn!("Malformed intent {}: {}", intent_json, e);
                false
            }
        }
    }

    /// Call from `requestAnimationFrame` with its timestamp
    pub fn frame(&mut self, time_ms: f64) {
        if let Some(last) = self.last_time {
            let dt = ((time_ms - last) / 1000.0) as f32;
            self.app.update(dt);
        }
        self.last_time = Some(time_ms);
    }

    pub fn snapshot(&self) -> String {
        serde_json::to_string(&self.app.snapshot()).unwrap_or_else(|e| {
            log::warn!("Snapshot serialization failed: {}", e);
            String::from("null")
        })
    }

    #[wasm_bindgen(js_name = settingsJson)]
    pub fn settings_json(&self) -> String {
        serde_json::to_string(self.app.settings()).unwrap_or_default()
    }

    /// Replace settings, persist them, and restart on the same screen
    #[wasm_bindgen(js_name = updateSettings)]
    pub fn update_settings(&mut self, json: &str) {
        let settings = Settings::from_json(json);
        settings.save();
        let current = self.app.current();
        self.app = App::new(settings, js_sys::Date::now() as u64);
        if let Some(op) = current {
            self.app.select(op);
        }
    }
}

impl Default for WebApp {
    fn default() -> Self {
        Self::new()
    }
}
