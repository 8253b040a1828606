//! Replay persistence
//!
//! Features:
//! - Append-only recording during a level
//! - Strictly sequential playback cursor
//! - Versioned JSON envelope with a level parameter snapshot

pub mod replay;

pub use replay::{
    EventKind, REPLAY_FORMAT_VERSION, ReplayCursor, ReplayEvent, ReplayFile, ReplayLog, Target,
};
