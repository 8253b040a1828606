//! Skill budgets and assignment legality
//!
//! An assignment is accepted only when the budget allows it, the target is
//! alive and its current action is a legal source for the skill. Everything
//! else is a silent rejection reported as an event.

use serde::{Deserialize, Serialize};

use super::behavior;
use super::lemming::{Action, ActionKind, Lemming};
use crate::level::Terrain;
use crate::sim::stencil::Mask;
use crate::tuning::Tuning;

/// Player-assignable skills, in panel order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Climber,
    Floater,
    Bomber,
    Blocker,
    Builder,
    Basher,
    Miner,
    Digger,
}

impl Skill {
    pub const ALL: [Skill; 8] = [
        Skill::Climber,
        Skill::Floater,
        Skill::Bomber,
        Skill::Blocker,
        Skill::Builder,
        Skill::Basher,
        Skill::Miner,
        Skill::Digger,
    ];

    /// Skills that set a permanent flag instead of changing the action
    pub const fn is_permanent(self) -> bool {
        matches!(self, Skill::Climber | Skill::Floater)
    }
}

/// Remaining uses per skill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillCounts {
    pub climber: u32,
    pub floater: u32,
    pub bomber: u32,
    pub blocker: u32,
    pub builder: u32,
    pub basher: u32,
    pub miner: u32,
    pub digger: u32,
}

impl SkillCounts {
    /// Same budget for every skill
    pub const fn uniform(count: u32) -> Self {
        Self {
            climber: count,
            floater: count,
            bomber: count,
            blocker: count,
            builder: count,
            basher: count,
            miner: count,
            digger: count,
        }
    }

    pub const fn get(&self, skill: Skill) -> u32 {
        match skill {
            Skill::Climber => self.climber,
            Skill::Floater => self.floater,
            Skill::Bomber => self.bomber,
            Skill::Blocker => self.blocker,
            Skill::Builder => self.builder,
            Skill::Basher => self.basher,
            Skill::Miner => self.miner,
            Skill::Digger => self.digger,
        }
    }

    fn get_mut(&mut self, skill: Skill) -> &mut u32 {
        match skill {
            Skill::Climber => &mut self.climber,
            Skill::Floater => &mut self.floater,
            Skill::Bomber => &mut self.bomber,
            Skill::Blocker => &mut self.blocker,
            Skill::Builder => &mut self.builder,
            Skill::Basher => &mut self.basher,
            Skill::Miner => &mut self.miner,
            Skill::Digger => &mut self.digger,
        }
    }

    /// Use one charge; false (and unchanged) when exhausted
    pub fn take(&mut self, skill: Skill) -> bool {
        let count = self.get_mut(skill);
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    /// Largest single budget (for validation)
    pub fn max(&self) -> u32 {
        Skill::ALL.iter().map(|&s| self.get(s)).max().unwrap_or(0)
    }
}

/// Why an assignment was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// No live lemming with that id
    UnknownLemming,
    /// Nothing under the cursor
    NoTarget,
    /// Budget for the skill is zero
    Exhausted,
    /// Current action is not a legal source for the skill
    IllegalState,
    /// Permanent skill already set, or fuse already lit
    AlreadyHasSkill,
    /// Blocker field would overlap another blocker
    BlockerOverlap,
    /// Live game commands are ignored while a replay plays
    ReplayActive,
}

/// Legal-source table
pub const fn accepts(skill: Skill, kind: ActionKind) -> bool {
    use ActionKind as K;
    if kind.is_terminal() {
        return false;
    }
    match skill {
        Skill::Climber | Skill::Floater => true,
        Skill::Bomber => !matches!(kind, K::OhNo),
        Skill::Blocker | Skill::Builder => matches!(
            kind,
            K::Walking | K::Shrugging | K::Digging | K::Bashing | K::Mining | K::Building
        ),
        Skill::Basher => matches!(
            kind,
            K::Walking | K::Shrugging | K::Digging | K::Mining | K::Building
        ),
        Skill::Miner => matches!(
            kind,
            K::Walking | K::Shrugging | K::Digging | K::Bashing | K::Building
        ),
        Skill::Digger => matches!(
            kind,
            K::Walking | K::Shrugging | K::Bashing | K::Mining | K::Building
        ),
    }
}

/// Check every precondition except the budget
pub fn check(
    skill: Skill,
    lem: &Lemming,
    terrain: &Terrain,
    tuning: &Tuning,
) -> Result<(), Rejection> {
    if lem.is_terminal() {
        return Err(Rejection::UnknownLemming);
    }
    let already = match skill {
        Skill::Climber => lem.climber,
        Skill::Floater => lem.floater,
        Skill::Bomber => lem.fuse.is_some(),
        _ => false,
    };
    if already {
        return Err(Rejection::AlreadyHasSkill);
    }
    if !accepts(skill, lem.kind()) {
        return Err(Rejection::IllegalState);
    }
    if skill == Skill::Blocker {
        let field = behavior::blocker_field(lem, tuning);
        if terrain.stencil().any_in(field, |m| m.intersects(Mask::FORCE)) {
            return Err(Rejection::BlockerOverlap);
        }
    }
    Ok(())
}

/// Validate, charge the budget and apply the skill
pub fn assign(
    skill: Skill,
    lem: &mut Lemming,
    budget: &mut SkillCounts,
    terrain: &mut Terrain,
    tuning: &Tuning,
) -> Result<(), Rejection> {
    if budget.get(skill) == 0 {
        return Err(Rejection::Exhausted);
    }
    check(skill, lem, terrain, tuning)?;
    budget.take(skill);

    match skill {
        Skill::Climber => lem.climber = true,
        Skill::Floater => lem.floater = true,
        Skill::Bomber => lem.fuse = Some(tuning.bomb_fuse_ticks),
        Skill::Blocker => {
            lem.set_action(Action::Blocking);
            behavior::stamp_blocker(lem, terrain, tuning);
        }
        Skill::Builder => lem.set_action(Action::Building { ticks: 0, bricks: 0 }),
        Skill::Basher => lem.set_action(Action::Bashing { ticks: 0 }),
        Skill::Miner => lem.set_action(Action::Mining { ticks: 0 }),
        Skill::Digger => lem.set_action(Action::Digging { ticks: 0 }),
    }
    Ok(())
}
