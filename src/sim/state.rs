//! Simulation context and core runtime types
//!
//! `Simulation` exclusively owns the terrain, the lemmings and every counter.
//! Everything outside talks to it through `submit` and reads it through
//! `snapshot` or the query methods.

use std::collections::VecDeque;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::event::{EndReason, Outcome};
use super::lemming::{Lemming, LemmingId};
use super::skills::{self, Rejection, Skill, SkillCounts};
use crate::consts::*;
use crate::error::ReplayError;
use crate::level::{Level, LevelObject, Terrain};
use crate::persistence::{ReplayCursor, ReplayFile, ReplayLog};
use crate::tuning::Tuning;

/// A request from the player (or a demo/replay driver)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Assign a skill to a lemming by id
    AssignSkill { lemming: LemmingId, skill: Skill },
    /// Assign a skill to whatever lemming is under the cursor
    AssignSkillAt { point: IVec2, skill: Skill },
    /// Press release rate +/- (delta in rate units)
    ChangeReleaseRate(i32),
    Nuke,
    TogglePause,
    ToggleFastForward,
}

impl Command {
    /// Commands that change the game and therefore go into the replay
    pub const fn is_game_action(&self) -> bool {
        !matches!(self, Command::TogglePause | Command::ToggleFastForward)
    }
}

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Running,
    Ended { outcome: Outcome, reason: EndReason },
}

/// Population counters. `out + exited + dead == released` after every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub released: u32,
    /// Live lemmings in the level
    pub out: u32,
    /// Saved
    pub exited: u32,
    pub dead: u32,
}

impl Counters {
    pub const fn is_consistent(&self) -> bool {
        self.out + self.exited + self.dead == self.released
    }
}

/// The running level
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) level: Level,
    /// Balance table with the level's overrides applied
    pub(crate) tuning: Tuning,
    /// Active lemmings, sorted by id
    pub(crate) lemmings: Vec<Lemming>,
    pub(crate) next_id: u32,
    pub(crate) counters: Counters,
    pub(crate) skills: SkillCounts,
    pub(crate) release_rate: u8,
    pub(crate) release_cooldown: u32,
    pub(crate) entrances: Vec<usize>,
    pub(crate) next_entrance: usize,
    /// Number of the next tick to run
    pub(crate) frame: u64,
    pub(crate) time_remaining: u32,
    pub(crate) paused: bool,
    pub(crate) fast_forward: bool,
    pub(crate) nuking: bool,
    pub(crate) phase: Phase,
    pub(crate) pending: VecDeque<Command>,
    pub(crate) recorder: ReplayLog,
    pub(crate) playback: Option<ReplayCursor>,
}

impl Simulation {
    pub fn new(level: Level, tuning: &Tuning) -> Self {
        let tuning = tuning.with_max_fall_distance(Some(level.params.max_fall_distance));
        let entrances = level.entrances();
        log::info!(
            "Starting level `{}`: {} lemmings, {} to rescue, {} ticks",
            level.id,
            level.params.lemmings,
            level.params.to_rescue,
            level.params.time_limit_ticks
        );
        Self {
            skills: level.params.skills,
            release_rate: level.params.release_rate,
            release_cooldown: tuning.entrance_delay_ticks,
            time_remaining: level.params.time_limit_ticks,
            lemmings: Vec::with_capacity(level.params.lemmings as usize),
            next_id: 0,
            counters: Counters::default(),
            entrances,
            next_entrance: 0,
            frame: 0,
            paused: false,
            fast_forward: false,
            nuking: false,
            phase: Phase::Running,
            pending: VecDeque::new(),
            recorder: ReplayLog::new(),
            playback: None,
            tuning,
            level,
        }
    }

    /// Queue a command for the next processed tick
    pub fn submit(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    /// Play a recorded replay. Live game commands are ignored from now on.
    pub fn attach_replay(&mut self, replay: ReplayFile) -> Result<(), ReplayError> {
        replay.check_level(&self.level, &self.tuning)?;
        log::info!(
            "Replay attached to `{}` with {} events",
            self.level.id,
            replay.events.len()
        );
        self.playback = Some(ReplayCursor::new(replay.events));
        Ok(())
    }

    /// Pick the lemming a click at `point` would assign `skill` to.
    ///
    /// Prefers the first lemming in creation order that would accept the
    /// skill; otherwise the first one under the cursor, so the caller can
    /// report why it was refused.
    pub fn lemming_at(&self, point: IVec2, skill: Skill) -> Option<LemmingId> {
        let half = self.tuning.hit_half_width;
        let height = self.tuning.lemming_height;
        let mut under = self.lemmings.iter().filter(|lem| {
            !lem.is_terminal()
                && (point.x - lem.x).abs() <= half
                && point.y <= lem.y
                && point.y > lem.y - height
        });
        let first = under.next()?;
        if skills::check(skill, first, &self.level.terrain, &self.tuning).is_ok() {
            return Some(first.id);
        }
        under
            .find(|lem| skills::check(skill, lem, &self.level.terrain, &self.tuning).is_ok())
            .map(|lem| lem.id)
            .or(Some(first.id))
    }

    pub(crate) fn index_of(&self, id: LemmingId) -> Option<usize> {
        self.lemmings.binary_search_by_key(&id, |lem| lem.id).ok()
    }

    /// Assign a skill to a live lemming, charging the budget on success
    pub(crate) fn assign(&mut self, id: LemmingId, skill: Skill) -> Result<(), Rejection> {
        let index = self.index_of(id).ok_or(Rejection::UnknownLemming)?;
        skills::assign(
            skill,
            &mut self.lemmings[index],
            &mut self.skills,
            &mut self.level.terrain,
            &self.tuning,
        )?;
        log::debug!("Frame {}: {:?} assigned to lemming {}", self.frame, skill, id.0);
        Ok(())
    }

    /// Apply a release rate delta; returns the new rate if it changed.
    /// The rate never drops below the level's starting rate.
    pub(crate) fn change_release_rate(&mut self, delta: i32) -> Option<u8> {
        let min = self.level.params.release_rate as i32;
        let rate = (self.release_rate as i32 + delta).clamp(min, MAX_RELEASE_RATE as i32) as u8;
        if rate == self.release_rate {
            return None;
        }
        self.release_rate = rate;
        Some(rate)
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn terrain(&self) -> &Terrain {
        &self.level.terrain
    }

    pub fn objects(&self) -> &[LevelObject] {
        &self.level.objects
    }

    pub fn lemmings(&self) -> &[Lemming] {
        &self.lemmings
    }

    pub fn lemming(&self, id: LemmingId) -> Option<&Lemming> {
        self.index_of(id).map(|i| &self.lemmings[i])
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn skills(&self) -> &SkillCounts {
        &self.skills
    }

    pub fn release_rate(&self) -> u8 {
        self.release_rate
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended { .. })
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Running => None,
            Phase::Ended { outcome, .. } => Some(outcome),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_fast_forward(&self) -> bool {
        self.fast_forward
    }

    pub fn is_nuking(&self) -> bool {
        self.nuking
    }

    pub fn is_replaying(&self) -> bool {
        self.playback.is_some()
    }

    /// Actions applied so far, in application order
    pub fn replay_log(&self) -> &ReplayLog {
        &self.recorder
    }

    /// Package the recorded actions as a replay file
    pub fn replay_file(&self) -> ReplayFile {
        self.recorder.to_file(&self.level, &self.tuning)
    }

    /// Lemmings not yet released
    pub fn remaining_to_release(&self) -> u32 {
        self.level.params.lemmings - self.counters.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{LevelDef, ObjectDef, ObjectKind, TerrainPiece};
    use crate::sim::lemming::Action;
    use crate::sim::stencil::{Material, Rect};

    fn level() -> Level {
        let def = LevelDef {
            id: "state-test".into(),
            name: String::new(),
            width: 100,
            height: 60,
            release_rate: 50,
            lemmings: 3,
            to_rescue: 1,
            time_limit_minutes: 1,
            skills: SkillCounts::uniform(2),
            max_fall_distance: Some(40),
            terrain: vec![TerrainPiece {
                rect: Rect::new(0, 40, 100, 20),
                material: Material::Brick,
                erase: false,
            }],
            objects: vec![
                ObjectDef {
                    kind: ObjectKind::Entrance,
                    rect: Rect::new(10, 10, 10, 5),
                    trigger: None,
                },
                ObjectDef {
                    kind: ObjectKind::Exit,
                    rect: Rect::new(80, 30, 10, 10),
                    trigger: None,
                },
            ],
        };
        Level::build(&def, &Tuning::default()).unwrap()
    }

    fn walker(id: u32, x: i32) -> Lemming {
        let mut lem = Lemming::spawn(LemmingId(id), IVec2::new(x, 39));
        lem.set_action(Action::Walking);
        lem
    }

    #[test]
    fn test_new_applies_level_overrides() {
        let sim = Simulation::new(level(), &Tuning::default());
        assert_eq!(sim.tuning().max_fall_distance, 40);
        assert_eq!(sim.release_rate(), 50);
        assert_eq!(sim.skills().digger, 2);
        assert_eq!(sim.time_remaining(), crate::seconds_to_ticks(60));
        assert_eq!(sim.remaining_to_release(), 3);
        assert!(!sim.is_ended());
    }

    #[test]
    fn test_release_rate_clamped_to_level_minimum() {
        let mut sim = Simulation::new(level(), &Tuning::default());
        assert_eq!(sim.change_release_rate(-10), None);
        assert_eq!(sim.change_release_rate(10), Some(60));
        assert_eq!(sim.change_release_rate(100), Some(MAX_RELEASE_RATE));
        assert_eq!(sim.change_release_rate(1), None);
        assert_eq!(sim.change_release_rate(-100), Some(50));
    }

    #[test]
    fn test_cursor_prefers_lemming_that_accepts_skill() {
        let mut sim = Simulation::new(level(), &Tuning::default());
        let mut first = walker(0, 30);
        first.climber = true;
        sim.lemmings.push(first);
        sim.lemmings.push(walker(1, 31));

        let point = IVec2::new(30, 35);
        assert_eq!(sim.lemming_at(point, Skill::Climber), Some(LemmingId(1)));
        assert_eq!(sim.lemming_at(point, Skill::Digger), Some(LemmingId(0)));
        assert_eq!(sim.lemming_at(IVec2::new(60, 35), Skill::Digger), None);
    }

    #[test]
    fn test_cursor_reports_first_when_nobody_accepts() {
        let mut sim = Simulation::new(level(), &Tuning::default());
        let mut a = walker(0, 30);
        a.climber = true;
        let mut b = walker(1, 30);
        b.climber = true;
        sim.lemmings.push(a);
        sim.lemmings.push(b);
        assert_eq!(
            sim.lemming_at(IVec2::new(30, 39), Skill::Climber),
            Some(LemmingId(0))
        );
        assert_eq!(sim.assign(LemmingId(0), Skill::Climber), Err(Rejection::AlreadyHasSkill));
        assert_eq!(sim.assign(LemmingId(7), Skill::Climber), Err(Rejection::UnknownLemming));
    }

    #[test]
    fn test_counters_consistency() {
        let counters = Counters {
            released: 5,
            out: 2,
            exited: 2,
            dead: 1,
        };
        assert!(counters.is_consistent());
        assert!(!Counters { released: 1, ..Counters::default() }.is_consistent());
    }
}
