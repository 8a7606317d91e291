//! Platform abstraction layer
//!
//! The browser build exposes the app to JavaScript:
//! - Intents arrive as JSON
//! - Snapshots leave as JSON
//! - Animation-frame timestamps drive the clock
//! - Settings come from LocalStorage

#[cfg(target_arch = "wasm32")]
pub mod web;
