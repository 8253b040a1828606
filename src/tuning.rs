//! Data-driven game balance
//!
//! Every behaviour constant of the lemming state machine lives here so a
//! level pack can ship its own table. Defaults follow the classic game.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;
use crate::seconds_to_ticks;

/// Balance constants for the simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Body height in pixels (hit box, blocker field, bash window)
    pub lemming_height: i32,
    /// Half-width of the cursor hit box
    pub hit_half_width: i32,

    /// Highest step a walker climbs without turning around
    pub step_up: i32,
    /// Deepest drop a walker follows without falling
    pub step_down: i32,

    /// Pixels per tick while falling
    pub fall_speed: i32,
    /// Fall distance above which landing is fatal
    pub max_fall_distance: i32,
    /// Fall distance after which a floater opens its umbrella
    pub floater_open_distance: i32,
    /// Pixels per tick while floating
    pub float_speed: i32,

    /// Pixels per tick while climbing
    pub climb_speed: i32,
    /// Ticks spent pulling up onto a ledge
    pub hoist_ticks: u32,

    /// Ticks between two dig strokes
    pub dig_ticks: u32,
    /// Half-width of the dug row (row is `2 * half + 1` wide)
    pub dig_half_width: i32,

    /// Ticks between two bash strokes
    pub bash_ticks: u32,
    /// Columns ahead carved per bash stroke
    pub bash_reach: i32,

    /// Ticks between two mine strokes
    pub mine_ticks: u32,
    /// Columns ahead carved per mine stroke
    pub mine_reach: i32,

    /// Ticks between two bricks
    pub brick_ticks: u32,
    /// Bricks per builder assignment
    pub builder_bricks: u32,
    /// Brick length in pixels
    pub brick_width: i32,
    /// Bricks left at which the builder starts warning
    pub builder_warning_bricks: u32,
    /// Ticks spent shrugging after the last brick
    pub shrug_ticks: u32,

    /// Columns covered by a blocker field on each side
    pub blocker_reach: i32,

    /// Bomber fuse length
    pub bomb_fuse_ticks: u32,
    /// Ticks of "oh no" before a grounded bomber explodes
    pub ohno_ticks: u32,
    /// Radius of the carved explosion disc
    pub explosion_radius: i32,

    /// Ticks before the first lemming leaves the entrance
    pub entrance_delay_ticks: u32,
    /// Ticks a trap stays busy after catching a lemming
    pub trap_busy_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lemming_height: 10,
            hit_half_width: 4,

            step_up: 6,
            step_down: 3,

            fall_speed: 3,
            max_fall_distance: 60,
            floater_open_distance: 16,
            float_speed: 2,

            climb_speed: 1,
            hoist_ticks: 8,

            dig_ticks: 4,
            dig_half_width: 4,

            bash_ticks: 2,
            bash_reach: 4,

            mine_ticks: 8,
            mine_reach: 3,

            brick_ticks: 16,
            builder_bricks: 12,
            brick_width: 6,
            builder_warning_bricks: 3,
            shrug_ticks: 8,

            blocker_reach: 6,

            bomb_fuse_ticks: seconds_to_ticks(5),
            ohno_ticks: 16,
            explosion_radius: 8,

            entrance_delay_ticks: 20,
            trap_busy_ticks: 24,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning table; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject tables the state machine cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("lemming_height", self.lemming_height),
            ("fall_speed", self.fall_speed),
            ("max_fall_distance", self.max_fall_distance),
            ("floater_open_distance", self.floater_open_distance),
            ("float_speed", self.float_speed),
            ("climb_speed", self.climb_speed),
            ("bash_reach", self.bash_reach),
            ("mine_reach", self.mine_reach),
            ("brick_width", self.brick_width),
        ];
        for (field, value) in positive {
            if value <= 0 {
                return Err(invalid(field, format!("{value} must be positive")));
            }
        }

        let non_negative = [
            ("hit_half_width", self.hit_half_width),
            ("step_up", self.step_up),
            ("step_down", self.step_down),
            ("dig_half_width", self.dig_half_width),
            ("blocker_reach", self.blocker_reach),
            ("explosion_radius", self.explosion_radius),
        ];
        for (field, value) in non_negative {
            if value < 0 {
                return Err(invalid(field, format!("{value} must not be negative")));
            }
        }

        if self.builder_bricks == 0 {
            return Err(invalid("builder_bricks", "must be positive"));
        }
        if self.bomb_fuse_ticks == 0 {
            return Err(invalid("bomb_fuse_ticks", "must be positive"));
        }
        if self.builder_warning_bricks > self.builder_bricks {
            return Err(invalid(
                "builder_warning_bricks",
                format!(
                    "{} exceeds builder_bricks {}",
                    self.builder_warning_bricks, self.builder_bricks
                ),
            ));
        }
        Ok(())
    }

    /// Copy of this table with the level's fall limit applied
    pub fn with_max_fall_distance(&self, distance: Option<i32>) -> Self {
        let mut tuning = self.clone();
        if let Some(distance) = distance {
            tuning.max_fall_distance = distance;
        }
        tuning
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}
