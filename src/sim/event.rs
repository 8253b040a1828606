//! Events emitted by a simulation step
//!
//! Audio, UI and rendering collaborators react to these after the step
//! completes; the simulation never calls out to them.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::lemming::LemmingId;
use super::skills::{Rejection, Skill};

/// Final result of a level session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Rescue quota met
    Won,
    /// Quota missed
    Lost,
}

/// Why the level stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Nothing left out and nothing left to release
    AllAccountedFor,
    /// Time limit reached
    TimeUp,
}

/// Something observable that happened during a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Released { id: LemmingId, at: IVec2 },
    SkillAssigned { id: LemmingId, skill: Skill },
    SkillRejected {
        id: Option<LemmingId>,
        skill: Skill,
        reason: Rejection,
    },
    ReleaseRateChanged { rate: u8 },
    NukeStarted,
    Paused { paused: bool },
    FastForward { enabled: bool },
    /// One of the builder's last bricks was laid
    BuilderRunningOut { id: LemmingId },
    /// A terrain skill hit indestructible terrain and stopped
    SteelHit { id: LemmingId },
    OhNo { id: LemmingId },
    Exploded { id: LemmingId, at: IVec2 },
    Splatted { id: LemmingId, at: IVec2 },
    Drowned { id: LemmingId, at: IVec2 },
    Trapped { id: LemmingId, object: usize },
    Burned { id: LemmingId, object: usize },
    FellOut { id: LemmingId },
    Exited { id: LemmingId, object: usize },
    /// A replayed event no longer applied and was dropped
    ReplayDesync { frame: u64, reason: Rejection },
    TimeUp,
    LevelEnded { outcome: Outcome, reason: EndReason },
}
