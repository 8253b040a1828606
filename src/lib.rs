//! Lemming Engine - terrain stencil and lemming simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (stencil, lemming state machine, step loop)
//! - `level`: Level definitions, validation, objects and terrain
//! - `persistence`: Replay recording, playback and replay files
//! - `platform`: Fixed-timestep clock and input mapping
//! - `audio`: Fire-and-forget sound cues
//! - `renderer`: GPU-ready instance data built from snapshots
//! - `flow`: Intro/briefing/level/debriefing session driver
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod demo;
pub mod error;
pub mod flow;
pub mod level;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{FlowError, LevelError, ReplayError, TuningError};
pub use settings::Settings;
pub use tuning::Tuning;

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation rate (the classic game ran at roughly 17 frames per second)
    pub const TICKS_PER_SECOND: u32 = 17;
    /// Duration of one tick in seconds
    pub const SIM_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;
    /// Maximum substeps per rendered frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Level dimension limits
    pub const MAX_LEVEL_WIDTH: u32 = 4096;
    pub const MAX_LEVEL_HEIGHT: u32 = 1024;

    /// Upper bound on lemmings per level
    pub const MAX_LEMMINGS: u32 = 999;
    /// Upper bound on any single skill budget
    pub const MAX_SKILL_COUNT: u32 = 99;

    /// Release rate bounds
    pub const MIN_RELEASE_RATE: u8 = 1;
    pub const MAX_RELEASE_RATE: u8 = 99;

    /// Time limit bounds (minutes)
    pub const MAX_TIME_LIMIT_MINUTES: u32 = 99;
}

/// Ticks between two releases at the given release rate
#[inline]
pub const fn release_interval(rate: u8) -> u32 {
    let rate = if rate > consts::MAX_RELEASE_RATE {
        consts::MAX_RELEASE_RATE
    } else {
        rate
    };
    4 + (consts::MAX_RELEASE_RATE - rate) as u32 / 2
}

/// Convert a duration in whole seconds to ticks
#[inline]
pub const fn seconds_to_ticks(seconds: u32) -> u32 {
    seconds * consts::TICKS_PER_SECOND
}

/// Convert ticks to whole seconds, rounding up so a running clock never shows 0 early
#[inline]
pub const fn ticks_to_seconds(ticks: u32) -> u32 {
    ticks.div_ceil(consts::TICKS_PER_SECOND)
}
