//! Lemming agents
//!
//! A lemming's behaviour is a tagged enum: each `Action` variant carries the
//! counters that only matter in that state.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Stable creation index, also the replay target id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LemmingId(pub u32);

/// Facing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    /// -1 for left, +1 for right
    #[inline]
    pub const fn sign(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    #[inline]
    pub const fn reversed(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Current behaviour with per-state data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Walking,
    Falling { distance: i32 },
    Floating,
    Climbing,
    Hoisting { ticks: u32 },
    Digging { ticks: u32 },
    Bashing { ticks: u32 },
    Mining { ticks: u32 },
    Building { ticks: u32, bricks: u32 },
    Shrugging { ticks: u32 },
    Blocking,
    OhNo { ticks: u32 },
    // Terminal: removed at the end of the tick they are reached
    Splatting,
    Drowning,
    Exploding,
    Trapped,
    Burning,
    FellOut,
    Exited,
}

/// Fieldless mirror of `Action` for tables, legality checks and rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Walking,
    Falling,
    Floating,
    Climbing,
    Hoisting,
    Digging,
    Bashing,
    Mining,
    Building,
    Shrugging,
    Blocking,
    OhNo,
    Splatting,
    Drowning,
    Exploding,
    Trapped,
    Burning,
    FellOut,
    Exited,
}

impl Action {
    pub const fn kind(&self) -> ActionKind {
        match self {
            Action::Walking => ActionKind::Walking,
            Action::Falling { .. } => ActionKind::Falling,
            Action::Floating => ActionKind::Floating,
            Action::Climbing => ActionKind::Climbing,
            Action::Hoisting { .. } => ActionKind::Hoisting,
            Action::Digging { .. } => ActionKind::Digging,
            Action::Bashing { .. } => ActionKind::Bashing,
            Action::Mining { .. } => ActionKind::Mining,
            Action::Building { .. } => ActionKind::Building,
            Action::Shrugging { .. } => ActionKind::Shrugging,
            Action::Blocking => ActionKind::Blocking,
            Action::OhNo { .. } => ActionKind::OhNo,
            Action::Splatting => ActionKind::Splatting,
            Action::Drowning => ActionKind::Drowning,
            Action::Exploding => ActionKind::Exploding,
            Action::Trapped => ActionKind::Trapped,
            Action::Burning => ActionKind::Burning,
            Action::FellOut => ActionKind::FellOut,
            Action::Exited => ActionKind::Exited,
        }
    }
}

impl ActionKind {
    /// The lemming leaves the level at the end of this tick
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ActionKind::Splatting
                | ActionKind::Drowning
                | ActionKind::Exploding
                | ActionKind::Trapped
                | ActionKind::Burning
                | ActionKind::FellOut
                | ActionKind::Exited
        )
    }

    /// Not touching the ground: a lit fuse explodes without "oh no"
    pub const fn is_airborne(self) -> bool {
        matches!(
            self,
            ActionKind::Falling | ActionKind::Floating | ActionKind::Climbing | ActionKind::Hoisting
        )
    }

    /// Frames in the sprite strip for this action
    pub const fn frame_count(self) -> u32 {
        match self {
            ActionKind::Walking | ActionKind::Climbing | ActionKind::Hoisting => 8,
            ActionKind::Falling => 4,
            ActionKind::Floating => 8,
            ActionKind::Digging | ActionKind::Building | ActionKind::Blocking => 16,
            ActionKind::Bashing => 32,
            ActionKind::Mining => 24,
            ActionKind::Shrugging => 8,
            ActionKind::OhNo => 16,
            ActionKind::Splatting
            | ActionKind::Drowning
            | ActionKind::Exploding
            | ActionKind::Trapped
            | ActionKind::Burning
            | ActionKind::FellOut
            | ActionKind::Exited => 1,
        }
    }
}

/// One agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lemming {
    pub id: LemmingId,
    /// Column
    pub x: i32,
    /// Foot row; the supporting ground pixel is `y + 1`
    pub y: i32,
    pub dir: Direction,
    pub action: Action,
    /// Animation frame within the current action's sprite strip
    pub anim_frame: u32,
    /// Ticks left on a lit bomber fuse
    pub fuse: Option<u32>,
    pub climber: bool,
    pub floater: bool,
}

impl Lemming {
    /// A freshly released lemming dropping out of an entrance
    pub const fn spawn(id: LemmingId, at: IVec2) -> Self {
        Self {
            id,
            x: at.x,
            y: at.y,
            dir: Direction::Right,
            action: Action::Falling { distance: 0 },
            anim_frame: 0,
            fuse: None,
            climber: false,
            floater: false,
        }
    }

    #[inline]
    pub const fn kind(&self) -> ActionKind {
        self.action.kind()
    }

    #[inline]
    pub const fn pos(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        self.kind().is_terminal()
    }

    /// Switch action, restarting the animation when the kind changes
    pub fn set_action(&mut self, action: Action) {
        if action.kind() != self.kind() {
            self.anim_frame = 0;
        }
        self.action = action;
    }

    pub fn turn_around(&mut self) {
        self.dir = self.dir.reversed();
    }

    /// Step the sprite animation
    pub fn advance_animation(&mut self) {
        let frames = self.kind().frame_count();
        self.anim_frame = (self.anim_frame + 1) % frames;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::Left.sign(), -1);
        assert_eq!(Direction::Right.sign(), 1);
        assert_eq!(Direction::Left.reversed(), Direction::Right);
    }

    #[test]
    fn test_set_action_resets_animation_on_kind_change() {
        let mut lem = Lemming::spawn(LemmingId(0), IVec2::new(5, 5));
        lem.set_action(Action::Walking);
        lem.advance_animation();
        lem.advance_animation();
        assert_eq!(lem.anim_frame, 2);
        lem.set_action(Action::Walking);
        assert_eq!(lem.anim_frame, 2);
        lem.set_action(Action::Digging { ticks: 0 });
        assert_eq!(lem.anim_frame, 0);
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(ActionKind::Exited.is_terminal());
        assert!(ActionKind::Splatting.is_terminal());
        assert!(!ActionKind::OhNo.is_terminal());
        assert!(!ActionKind::Blocking.is_terminal());
    }
}
