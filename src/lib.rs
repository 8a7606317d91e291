//! Balloon Math - arithmetic exercises with balloon counters
//!
//! Core modules:
//! - `sim`: Deterministic exercise engines (addition, subtraction, multiplication)
//! - `app`: Mini-game navigation and fixed-timestep clock
//! - `platform`: Browser bindings (JSON intents in, JSON snapshots out)
//! - `settings`: Timings and answer range preferences
//! - `words`: Spoken-number captions

pub mod app;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod words;

pub use app::{App, AppSnapshot, Operation};
pub use settings::Settings;

/// Exercise configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation rate. Deferred transitions count down in ticks.
    pub const TICK_HZ: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the clock will account for (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Delay before a wrong selection clears (ms)
    pub const WRONG_ANSWER_CLEAR_MS: u32 = 1000;
    /// Celebration window after a correct answer, before auto-reset (ms)
    pub const CELEBRATION_MS: u32 = 4000;

    /// Number of multiple-choice candidates
    pub const CANDIDATE_COUNT: usize = 3;
    /// Distractors are drawn from correct ± 1..=MAX_DISTRACTOR_OFFSET
    pub const MAX_DISTRACTOR_OFFSET: u32 = 3;
    /// Default upper bound for addition/subtraction candidates
    pub const ANSWER_CEILING: u32 = 20;

    /// Largest factor accepted by the multiplication keypad
    pub const MAX_FACTOR: u8 = 9;

    /// Multiplication group grid
    pub const GROUP_GRID_MAX_COLUMNS: u32 = 3;
    pub const GROUP_GRID_ORIGIN: Vec2 = Vec2::new(20.0, 80.0);
    pub const GROUP_CELL_SIZE: Vec2 = Vec2::new(160.0, 150.0);
}

/// Convert a delay in milliseconds to whole ticks (rounded up)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u32 {
    let ticks = (ms as u64 * consts::TICK_HZ as u64).div_ceil(1000);
    ticks.min(u32::MAX as u64) as u32
}
