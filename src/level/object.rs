//! Level objects: entrances, exits, traps, liquids and terrain modifiers

use serde::{Deserialize, Serialize};

use crate::sim::stencil::{Mask, Rect};

/// What a level object does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Trap door lemmings are released from
    Entrance,
    /// Lemmings reaching it are saved
    Exit,
    /// Kills one lemming, then stays busy while it animates
    Trap,
    /// Kills every lemming that touches it
    Fire,
    /// Drowns lemmings that walk or fall into it
    Water,
    /// Turns terrain in its area into indestructible steel
    Steel,
    /// Terrain in its area can only be bashed/mined leftwards
    OneWayLeft,
    /// Terrain in its area can only be bashed/mined rightwards
    OneWayRight,
    /// Purely visual
    Decoration,
}

impl ObjectKind {
    /// Trigger bits this object stamps into the stencil
    pub const fn trigger_mask(self) -> Option<Mask> {
        match self {
            ObjectKind::Exit => Some(Mask::EXIT),
            ObjectKind::Trap => Some(Mask::TRAP),
            ObjectKind::Fire => Some(Mask::FIRE),
            ObjectKind::Water => Some(Mask::WATER),
            ObjectKind::Entrance
            | ObjectKind::Steel
            | ObjectKind::OneWayLeft
            | ObjectKind::OneWayRight
            | ObjectKind::Decoration => None,
        }
    }

    /// Frames in the object's idle/trigger animation
    pub const fn frame_count(self) -> u32 {
        match self {
            ObjectKind::Entrance => 10,
            ObjectKind::Exit | ObjectKind::Fire | ObjectKind::Water => 8,
            ObjectKind::Trap => 16,
            ObjectKind::Steel
            | ObjectKind::OneWayLeft
            | ObjectKind::OneWayRight
            | ObjectKind::Decoration => 1,
        }
    }
}

/// Mutable per-object state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectState {
    /// Ticks left before a trap can catch another lemming
    pub busy_ticks: u32,
    /// Animation frame for the renderer
    pub anim_frame: u32,
}

/// A placed object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelObject {
    pub kind: ObjectKind,
    /// Screen rectangle (sprite bounds)
    pub rect: Rect,
    /// Area that triggers lemming state changes
    pub trigger: Rect,
    pub state: ObjectState,
}

impl LevelObject {
    pub fn new(kind: ObjectKind, rect: Rect, trigger: Option<Rect>) -> Self {
        Self {
            kind,
            rect,
            trigger: trigger.unwrap_or(rect),
            state: ObjectState::default(),
        }
    }

    /// Whether a trap is currently animating a catch
    pub const fn is_busy(&self) -> bool {
        self.state.busy_ticks > 0
    }

    /// Advance the object's animation and busy timer by one tick
    pub fn tick(&mut self) {
        let frames = self.kind.frame_count();
        match self.kind {
            ObjectKind::Trap => {
                if self.state.busy_ticks > 0 {
                    self.state.busy_ticks -= 1;
                    self.state.anim_frame = (self.state.anim_frame + 1) % frames;
                } else {
                    self.state.anim_frame = 0;
                }
            }
            _ => self.state.anim_frame = (self.state.anim_frame + 1) % frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trap_busy_countdown() {
        let mut trap = LevelObject::new(ObjectKind::Trap, Rect::new(0, 0, 8, 8), None);
        assert!(!trap.is_busy());
        trap.state.busy_ticks = 2;
        trap.tick();
        assert!(trap.is_busy());
        assert_eq!(trap.state.anim_frame, 1);
        trap.tick();
        assert!(!trap.is_busy());
        trap.tick();
        assert_eq!(trap.state.anim_frame, 0);
    }

    #[test]
    fn test_trigger_defaults_to_rect() {
        let exit = LevelObject::new(ObjectKind::Exit, Rect::new(4, 4, 10, 6), None);
        assert_eq!(exit.trigger, exit.rect);
        let narrow = Rect::new(8, 8, 2, 2);
        let exit = LevelObject::new(ObjectKind::Exit, Rect::new(4, 4, 10, 6), Some(narrow));
        assert_eq!(exit.trigger, narrow);
    }
}
