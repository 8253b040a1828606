//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - No RNG at all (demo randomness lives outside and is recorded)
//! - Stable iteration order (by lemming ID)
//! - No rendering, audio or platform dependencies

pub mod behavior;
pub mod event;
pub mod lemming;
pub mod skills;
pub mod snapshot;
pub mod state;
pub mod stencil;
pub mod tick;

pub use event::{EndReason, GameEvent, Outcome};
pub use lemming::{Action, ActionKind, Direction, Lemming, LemmingId};
pub use skills::{Rejection, Skill, SkillCounts};
pub use snapshot::{LemmingView, ObjectView, Snapshot};
pub use state::{Command, Counters, Phase, Simulation};
pub use stencil::{Mask, Material, Rect, Stencil};
pub use tick::{StepReport, step};
