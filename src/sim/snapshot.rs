//! Owned read-only views of the simulation for renderers and UI

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::lemming::{ActionKind, Direction, LemmingId};
use super::skills::SkillCounts;
use super::state::{Counters, Phase, Simulation};
use crate::level::ObjectKind;
use crate::sim::stencil::Rect;
use crate::ticks_to_seconds;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmingView {
    pub id: LemmingId,
    pub pos: IVec2,
    pub dir: Direction,
    pub action: ActionKind,
    pub anim_frame: u32,
    /// Countdown shown above a bomber's head
    pub fuse_seconds: Option<u32>,
    pub climber: bool,
    pub floater: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectView {
    pub kind: ObjectKind,
    pub rect: Rect,
    pub anim_frame: u32,
}

/// Everything a frame needs to be drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub frame: u64,
    pub width: i32,
    pub height: i32,
    pub lemmings: Vec<LemmingView>,
    pub objects: Vec<ObjectView>,
    pub counters: Counters,
    pub lemmings_total: u32,
    pub to_rescue: u32,
    pub skills: SkillCounts,
    pub release_rate: u8,
    pub time_remaining_seconds: u32,
    pub paused: bool,
    pub fast_forward: bool,
    pub nuking: bool,
    pub phase: Phase,
    /// Background ARGB image, row-major
    pub background: Vec<u32>,
}

impl Snapshot {
    /// Saved lemmings as a percentage of the level total
    pub fn saved_percent(&self) -> u32 {
        percent(self.counters.exited, self.lemmings_total)
    }

    /// Rescue quota as a percentage of the level total
    pub fn needed_percent(&self) -> u32 {
        percent(self.to_rescue, self.lemmings_total)
    }
}

pub(crate) fn percent(part: u32, total: u32) -> u32 {
    if total == 0 { 0 } else { part * 100 / total }
}

impl Simulation {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            frame: self.frame,
            width: self.level.terrain.width(),
            height: self.level.terrain.height(),
            lemmings: self
                .lemmings
                .iter()
                .map(|lem| LemmingView {
                    id: lem.id,
                    pos: lem.pos(),
                    dir: lem.dir,
                    action: lem.kind(),
                    anim_frame: lem.anim_frame,
                    fuse_seconds: lem.fuse.map(ticks_to_seconds),
                    climber: lem.climber,
                    floater: lem.floater,
                })
                .collect(),
            objects: self
                .level
                .objects
                .iter()
                .map(|o| ObjectView {
                    kind: o.kind,
                    rect: o.rect,
                    anim_frame: o.state.anim_frame,
                })
                .collect(),
            counters: self.counters,
            lemmings_total: self.level.params.lemmings,
            to_rescue: self.level.params.to_rescue,
            skills: self.skills,
            release_rate: self.release_rate,
            time_remaining_seconds: ticks_to_seconds(self.time_remaining),
            paused: self.paused,
            fast_forward: self.fast_forward,
            nuking: self.nuking,
            phase: self.phase,
            background: self.level.terrain.pixels().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentages() {
        assert_eq!(percent(3, 4), 75);
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
    }
}
