//! Replay recording and playback
//!
//! A replay is the ordered list of player actions keyed by frame number.
//! Because the simulation is deterministic, re-applying the same actions on
//! the same frames reproduces the run exactly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReplayError;
use crate::level::{Level, LevelParams};
use crate::sim::skills::Skill;
use crate::tuning::Tuning;

/// Current on-disk format version
pub const REPLAY_FORMAT_VERSION: u32 = 2;

/// What a replay event acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Lemming by creation index
    Lemming(u32),
    /// Level-wide action
    Global,
}

/// A recorded player action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AssignSkill(Skill),
    /// Release rate delta as pressed
    ChangeReleaseRate(i32),
    Nuke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayEvent {
    pub frame: u64,
    pub target: Target,
    pub kind: EventKind,
}

/// Append-only log written while a level runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayLog {
    events: Vec<ReplayEvent>,
}

impl ReplayLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame: u64, target: Target, kind: EventKind) {
        debug_assert!(
            self.events.last().is_none_or(|last| last.frame <= frame),
            "replay events must be recorded in frame order"
        );
        self.events.push(ReplayEvent {
            frame,
            target,
            kind,
        });
    }

    pub fn events(&self) -> &[ReplayEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Package the log for saving
    pub fn to_file(&self, level: &Level, tuning: &Tuning) -> ReplayFile {
        ReplayFile::new(level, tuning, self.events.clone())
    }
}

/// Sequential reader over a loaded replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayCursor {
    events: Vec<ReplayEvent>,
    next: usize,
}

impl ReplayCursor {
    pub fn new(events: Vec<ReplayEvent>) -> Self {
        Self { events, next: 0 }
    }

    /// Events due at `frame`, each returned exactly once in insertion order.
    ///
    /// Events stamped with an earlier frame that were never taken are
    /// returned too, so nothing is skipped silently.
    pub fn take_due(&mut self, frame: u64) -> &[ReplayEvent] {
        let start = self.next;
        while self.events.get(self.next).is_some_and(|e| e.frame <= frame) {
            self.next += 1;
        }
        &self.events[start..self.next]
    }

    /// All events have been consumed
    pub fn is_finished(&self) -> bool {
        self.next >= self.events.len()
    }

    pub fn remaining(&self) -> usize {
        self.events.len() - self.next
    }
}

/// Versioned replay document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayFile {
    pub format_version: u32,
    pub level_id: String,
    pub params: LevelParams,
    /// Balance table the run was played with, level overrides applied
    pub tuning: Tuning,
    pub events: Vec<ReplayEvent>,
}

/// Just enough of a replay to check its version before a full parse
#[derive(Deserialize)]
struct VersionHeader {
    format_version: u32,
}

impl ReplayFile {
    pub fn new(level: &Level, tuning: &Tuning, events: Vec<ReplayEvent>) -> Self {
        Self {
            format_version: REPLAY_FORMAT_VERSION,
            level_id: level.id.clone(),
            params: level.params.clone(),
            tuning: tuning.clone(),
            events,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let VersionHeader { format_version } = serde_json::from_str(json)?;
        if format_version != REPLAY_FORMAT_VERSION {
            return Err(ReplayError::UnsupportedVersion {
                found: format_version,
                expected: REPLAY_FORMAT_VERSION,
            });
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let file = Self::from_json(&json)?;
        log::info!(
            "Loaded replay for `{}` ({} events) from {}",
            file.level_id,
            file.events.len(),
            path.display()
        );
        Ok(file)
    }

    /// Write through a temporary file so a crash never leaves a torn replay
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, self.to_json()?)?;
        std::fs::rename(&tmp, path)?;
        log::info!("Saved replay ({} events) to {}", self.events.len(), path.display());
        Ok(())
    }

    /// Refuse playback against a different or edited level, or under a
    /// different balance table
    pub fn check_level(&self, level: &Level, tuning: &Tuning) -> Result<(), ReplayError> {
        if self.level_id != level.id || self.params != level.params {
            return Err(ReplayError::LevelMismatch {
                replay: self.level_id.clone(),
                level: level.id.clone(),
            });
        }
        if self.tuning != *tuning {
            return Err(ReplayError::TuningMismatch {
                level: level.id.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(frame: u64, kind: EventKind) -> ReplayEvent {
        ReplayEvent {
            frame,
            target: Target::Global,
            kind,
        }
    }

    #[test]
    fn test_cursor_yields_each_frame_once_in_order() {
        let mut cursor = ReplayCursor::new(vec![
            event(3, EventKind::ChangeReleaseRate(1)),
            event(3, EventKind::ChangeReleaseRate(-1)),
            event(7, EventKind::Nuke),
        ]);
        assert!(cursor.take_due(0).is_empty());
        let due = cursor.take_due(3);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].kind, EventKind::ChangeReleaseRate(1));
        assert_eq!(due[1].kind, EventKind::ChangeReleaseRate(-1));
        assert!(cursor.take_due(3).is_empty());
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.take_due(9).len(), 1);
        assert!(cursor.is_finished());
    }

    #[test]
    fn test_event_json_shape() {
        let e = ReplayEvent {
            frame: 42,
            target: Target::Lemming(3),
            kind: EventKind::AssignSkill(Skill::Digger),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(
            json,
            r#"{"frame":42,"target":{"lemming":3},"kind":{"assign_skill":"digger"}}"#
        );
    }

    #[test]
    fn test_file_without_tuning_does_not_parse() {
        let json = r#"{
            "format_version": 2,
            "level_id": "x",
            "params": {
                "width": 10, "height": 10, "release_rate": 50, "lemmings": 1,
                "to_rescue": 1, "time_limit_ticks": 100, "skills": {},
                "max_fall_distance": 60
            },
            "events": []
        }"#;
        assert!(matches!(ReplayFile::from_json(json), Err(ReplayError::Parse(_))));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let json = r#"{
            "format_version": 99,
            "level_id": "x",
            "params": {
                "width": 10, "height": 10, "release_rate": 50, "lemmings": 1,
                "to_rescue": 1, "time_limit_ticks": 100, "skills": {},
                "max_fall_distance": 60
            },
            "events": []
        }"#;
        assert!(matches!(
            ReplayFile::from_json(json),
            Err(ReplayError::UnsupportedVersion {
                found: 99,
                expected: REPLAY_FORMAT_VERSION
            })
        ));
    }
}
