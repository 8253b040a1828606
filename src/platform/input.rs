//! Player input mapped to simulation commands

use glam::{IVec2, Vec2};

use crate::sim::{Command, Skill};

/// Release rate units per +/- press
pub const RELEASE_RATE_STEP: i32 = 1;

/// Raw host input, already decoded from the windowing layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Skill panel button
    SelectSkill(Skill),
    /// Pointer press in screen coordinates
    Click(Vec2),
    /// Scroll the view horizontally by screen pixels
    Scroll(f32),
    ReleaseRateUp,
    ReleaseRateDown,
    Nuke,
    Pause,
    FastForward,
}

/// Tracks the selected skill and the view transform
#[derive(Debug, Clone)]
pub struct InputMapper {
    selected: Option<Skill>,
    /// Level x shown at the left edge of the screen
    scroll_x: f32,
    /// Screen pixels per level pixel
    scale: f32,
    level_width: i32,
}

impl InputMapper {
    pub fn new(level_width: i32, scale: f32) -> Self {
        Self {
            selected: None,
            scroll_x: 0.0,
            scale: scale.max(1.0),
            level_width,
        }
    }

    pub fn selected(&self) -> Option<Skill> {
        self.selected
    }

    pub fn scroll_x(&self) -> f32 {
        self.scroll_x
    }

    /// Screen position to level pixel
    pub fn to_level(&self, screen: Vec2) -> IVec2 {
        let x = screen.x / self.scale + self.scroll_x;
        let y = screen.y / self.scale;
        IVec2::new(x.floor() as i32, y.floor() as i32)
    }

    /// Update view state and produce a command where one applies
    pub fn map(&mut self, event: InputEvent) -> Option<Command> {
        match event {
            InputEvent::SelectSkill(skill) => {
                self.selected = Some(skill);
                None
            }
            InputEvent::Click(screen) => {
                let skill = self.selected?;
                Some(Command::AssignSkillAt {
                    point: self.to_level(screen),
                    skill,
                })
            }
            InputEvent::Scroll(dx) => {
                let max = self.level_width.max(0) as f32;
                self.scroll_x = (self.scroll_x + dx / self.scale).clamp(0.0, max);
                None
            }
            InputEvent::ReleaseRateUp => Some(Command::ChangeReleaseRate(RELEASE_RATE_STEP)),
            InputEvent::ReleaseRateDown => Some(Command::ChangeReleaseRate(-RELEASE_RATE_STEP)),
            InputEvent::Nuke => Some(Command::Nuke),
            InputEvent::Pause => Some(Command::TogglePause),
            InputEvent::FastForward => Some(Command::ToggleFastForward),
        }
    }
}
