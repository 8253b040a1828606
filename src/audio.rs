//! Fire-and-forget sound cues
//!
//! The simulation never plays sound. Cues are derived from the events of a
//! finished step and handed to whatever `CueSink` the host provides.

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Entrance trap door releases a lemming
    Release,
    /// Skill accepted
    Assign,
    /// Skill refused
    Refused,
    /// Release rate changed
    Tick,
    /// Builder is laying its last bricks
    BuilderWarning,
    /// Digger/basher/miner hit steel
    Clink,
    OhNo,
    Explosion,
    Splat,
    Drown,
    /// Trap caught a lemming
    Trap,
    Fire,
    /// Lemming saved
    Yippee,
    /// Nuke pressed
    Nuke,
    TimeUp,
    LevelWon,
    LevelLost,
}

impl SoundCue {
    /// Cue for an event, if it has one
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        use crate::sim::Outcome;
        let cue = match event {
            GameEvent::Released { .. } => SoundCue::Release,
            GameEvent::SkillAssigned { .. } => SoundCue::Assign,
            GameEvent::SkillRejected { .. } => SoundCue::Refused,
            GameEvent::ReleaseRateChanged { .. } => SoundCue::Tick,
            GameEvent::BuilderRunningOut { .. } => SoundCue::BuilderWarning,
            GameEvent::SteelHit { .. } => SoundCue::Clink,
            GameEvent::OhNo { .. } => SoundCue::OhNo,
            GameEvent::Exploded { .. } => SoundCue::Explosion,
            GameEvent::Splatted { .. } => SoundCue::Splat,
            GameEvent::Drowned { .. } => SoundCue::Drown,
            GameEvent::Trapped { .. } => SoundCue::Trap,
            GameEvent::Burned { .. } => SoundCue::Fire,
            GameEvent::Exited { .. } => SoundCue::Yippee,
            GameEvent::NukeStarted => SoundCue::Nuke,
            GameEvent::TimeUp => SoundCue::TimeUp,
            GameEvent::LevelEnded {
                outcome: Outcome::Won,
                ..
            } => SoundCue::LevelWon,
            GameEvent::LevelEnded {
                outcome: Outcome::Lost,
                ..
            } => SoundCue::LevelLost,
            GameEvent::Paused { .. }
            | GameEvent::FastForward { .. }
            | GameEvent::FellOut { .. }
            | GameEvent::ReplayDesync { .. } => return None,
        };
        Some(cue)
    }
}

/// Host audio backend
pub trait CueSink {
    /// Play a cue at `volume` (0.0 - 1.0). Must not block.
    fn play(&mut self, cue: SoundCue, volume: f32);
}

/// Routes cues to a sink, applying volume and mute
pub struct AudioBus<S: CueSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: CueSink> AudioBus<S> {
    pub fn new(sink: S, settings: &Settings) -> Self {
        let mut bus = Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        };
        bus.apply_settings(settings);
        bus
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(cue, vol);
    }

    /// Play the cues for a step's events. Repeats of one cue within the
    /// same step are played once.
    pub fn play_events(&mut self, events: &[GameEvent]) {
        let mut played: Vec<SoundCue> = Vec::new();
        for cue in events.iter().filter_map(SoundCue::from_event) {
            if !played.contains(&cue) {
                played.push(cue);
                self.play(cue);
            }
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// Sink that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogSink;

impl CueSink for LogSink {
    fn play(&mut self, cue: SoundCue, volume: f32) {
        log::trace!("Sound {cue:?} at {volume:.2}");
    }
}

/// Sink that remembers what it was asked to play
#[derive(Debug, Default)]
pub struct CueRecorder {
    pub played: Vec<(SoundCue, f32)>,
}

impl CueSink for CueRecorder {
    fn play(&mut self, cue: SoundCue, volume: f32) {
        self.played.push((cue, volume));
    }
}
