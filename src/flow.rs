//! Session flow: intro, briefing, level, level end, debriefing
//!
//! The LEVEL state owns the simulation and is the only state that ticks.

use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::level::{Level, LevelDef};
use crate::persistence::ReplayFile;
use crate::platform::FixedClock;
use crate::settings::Settings;
use crate::sim::snapshot::percent;
use crate::sim::{Command, EndReason, Outcome, Simulation, StepReport, step};
use crate::tuning::Tuning;

/// Top-level screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Intro,
    /// Level chosen and validated, waiting to start
    Briefing,
    /// Simulation running
    Level,
    /// Simulation ended, result not yet shown
    LevelEnd,
    /// Result screen
    Debriefing,
}

/// Summary shown on the debriefing screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelResult {
    pub level_id: String,
    pub outcome: Outcome,
    pub reason: EndReason,
    pub saved: u32,
    pub needed: u32,
    pub total: u32,
    pub saved_percent: u32,
    pub needed_percent: u32,
    pub frames: u64,
    pub replay: ReplayFile,
}

/// Drives one player through levels
pub struct Session {
    state: GameState,
    tuning: Tuning,
    settings: Settings,
    level: Option<Level>,
    sim: Option<Simulation>,
    clock: FixedClock,
    result: Option<LevelResult>,
}

impl Session {
    pub fn new(tuning: Tuning, settings: Settings) -> Self {
        Self {
            state: GameState::Intro,
            tuning,
            settings,
            level: None,
            sim: None,
            clock: FixedClock::new(),
            result: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.sim.as_ref()
    }

    pub fn result(&self) -> Option<&LevelResult> {
        self.result.as_ref()
    }

    fn require(&self, expected: &[GameState], action: &'static str) -> Result<(), FlowError> {
        if expected.contains(&self.state) {
            Ok(())
        } else {
            Err(FlowError::WrongState {
                action,
                state: self.state,
            })
        }
    }

    /// Intro/Debriefing -> Briefing with a new level
    pub fn select_level(&mut self, def: &LevelDef) -> Result<(), FlowError> {
        self.require(&[GameState::Intro, GameState::Debriefing], "select a level")?;
        let level = Level::build(def, &self.tuning)?;
        log::info!("Briefing: `{}` {}", level.id, level.name);
        self.level = Some(level);
        self.result = None;
        self.state = GameState::Briefing;
        Ok(())
    }

    /// Briefing -> Level, optionally playing back a replay
    pub fn start(&mut self, replay: Option<ReplayFile>) -> Result<(), FlowError> {
        self.require(&[GameState::Briefing], "start a level")?;
        let Some(level) = self.level.clone() else {
            return Err(FlowError::WrongState {
                action: "start without a level",
                state: self.state,
            });
        };
        let mut sim = Simulation::new(level, &self.tuning);
        if let Some(replay) = replay {
            sim.attach_replay(replay)?;
        }
        self.sim = Some(sim);
        self.clock.reset();
        self.state = GameState::Level;
        Ok(())
    }

    /// Forward a command to the running level
    pub fn submit(&mut self, command: Command) {
        if let (GameState::Level, Some(sim)) = (self.state, self.sim.as_mut()) {
            sim.submit(command);
        }
    }

    /// Run one tick (headless drivers)
    pub fn tick(&mut self) -> Option<StepReport> {
        if self.state != GameState::Level {
            return None;
        }
        let sim = self.sim.as_mut()?;
        let report = step(sim);
        if sim.is_ended() {
            self.state = GameState::LevelEnd;
        }
        Some(report)
    }

    /// Run the ticks owed for a rendered frame of `dt` seconds
    pub fn frame(&mut self, dt: f32) -> Vec<StepReport> {
        let Some(sim) = self.sim.as_ref() else {
            return Vec::new();
        };
        if self.state != GameState::Level {
            return Vec::new();
        }
        let ticks = self.clock.advance(dt, sim.is_fast_forward(), &self.settings);
        let mut reports = Vec::with_capacity(ticks as usize);
        for _ in 0..ticks {
            match self.tick() {
                Some(report) => reports.push(report),
                None => break,
            }
        }
        reports
    }

    /// LevelEnd -> Debriefing. Saves the replay when recording is on.
    pub fn finish(&mut self) -> Result<&LevelResult, FlowError> {
        self.require(&[GameState::LevelEnd], "finish a level")?;
        let Some(sim) = self.sim.take() else {
            return Err(FlowError::WrongState {
                action: "finish without a simulation",
                state: self.state,
            });
        };

        let (outcome, reason) = match sim.phase() {
            crate::sim::Phase::Ended { outcome, reason } => (outcome, reason),
            crate::sim::Phase::Running => (Outcome::Lost, EndReason::TimeUp),
        };
        let params = &sim.level().params;
        let counters = sim.counters();
        let replay = sim.replay_file();

        if self.settings.record_replays && !sim.is_replaying() {
            let path = self.settings.replay_path(&sim.level().id);
            if let Err(e) = replay.save(&path) {
                log::warn!("Could not save replay to {}: {e}", path.display());
            }
        }

        let result = LevelResult {
            level_id: sim.level().id.clone(),
            outcome,
            reason,
            saved: counters.exited,
            needed: params.to_rescue,
            total: params.lemmings,
            saved_percent: percent(counters.exited, params.lemmings),
            needed_percent: percent(params.to_rescue, params.lemmings),
            frames: sim.frame(),
            replay,
        };
        log::info!(
            "Debriefing: saved {}% (needed {}%)",
            result.saved_percent,
            result.needed_percent
        );
        self.state = GameState::Debriefing;
        Ok(self.result.insert(result))
    }

    /// Debriefing -> Briefing on the same level
    pub fn retry(&mut self) -> Result<(), FlowError> {
        self.require(&[GameState::Debriefing], "retry")?;
        self.state = GameState::Briefing;
        Ok(())
    }

    /// Back to the intro from anywhere, abandoning a running level
    pub fn quit_to_intro(&mut self) {
        if self.state == GameState::Level {
            log::info!("Level abandoned");
        }
        self.sim = None;
        self.level = None;
        self.state = GameState::Intro;
    }
}
