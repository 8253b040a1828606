//! Error types for load-time failures
//!
//! The simulation itself never fails; only level, tuning and replay loading do.

use thiserror::Error;

use crate::level::ObjectKind;

/// Level data rejected at load time
#[derive(Error, Debug)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse level: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid level parameter `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("level has no {0:?} object")]
    MissingObject(ObjectKind),
}

impl LevelError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Balance table rejected at load time
#[derive(Error, Debug)]
pub enum TuningError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Replay file could not be loaded, saved or attached
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("replay i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse replay: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported replay format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("replay was recorded on level `{replay}` but `{level}` is loaded")]
    LevelMismatch { replay: String, level: String },

    #[error("replay for `{level}` was recorded with a different tuning table")]
    TuningMismatch { level: String },
}

/// Session driver misuse or a failure while entering a state
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("cannot {action} while in {state:?}")]
    WrongState {
        action: &'static str,
        state: crate::flow::GameState,
    },

    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Replay(#[from] ReplayError),
}
