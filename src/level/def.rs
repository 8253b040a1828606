//! Level definition files
//!
//! A level is a JSON document: numeric parameters, skill budgets, terrain
//! pieces and objects. Everything is validated here; a definition that
//! passes `validate` always builds into a runnable level.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::object::ObjectKind;
use crate::consts::*;
use crate::error::LevelError;
use crate::sim::skills::SkillCounts;
use crate::sim::stencil::{Material, Rect};

/// A rectangle of terrain painted in file order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainPiece {
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(default = "default_material")]
    pub material: Material,
    /// Cut the rectangle out instead of painting it
    #[serde(default)]
    pub erase: bool,
}

const fn default_material() -> Material {
    Material::Brick
}

/// A placed object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDef {
    pub kind: ObjectKind,
    #[serde(flatten)]
    pub rect: Rect,
    /// Trigger area when it differs from the sprite rectangle
    #[serde(default)]
    pub trigger: Option<Rect>,
}

/// On-disk level description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub release_rate: u8,
    pub lemmings: u32,
    pub to_rescue: u32,
    pub time_limit_minutes: u32,
    #[serde(default)]
    pub skills: SkillCounts,
    /// Per-level override of the fatal fall height
    #[serde(default)]
    pub max_fall_distance: Option<i32>,
    #[serde(default)]
    pub terrain: Vec<TerrainPiece>,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
}

impl LevelDef {
    /// Parse and validate a level from JSON
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let def: LevelDef = serde_json::from_str(json)?;
        def.validate()?;
        Ok(def)
    }

    /// Read, parse and validate a level file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let def = Self::from_json(&json)?;
        log::info!("Loaded level `{}` from {}", def.id, path.display());
        Ok(def)
    }

    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Reject anything the simulation cannot run
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.id.trim().is_empty() {
            return Err(LevelError::invalid("id", "must not be empty"));
        }
        if self.width == 0 || self.width > MAX_LEVEL_WIDTH {
            return Err(LevelError::invalid(
                "width",
                format!("{} not in 1..={MAX_LEVEL_WIDTH}", self.width),
            ));
        }
        if self.height == 0 || self.height > MAX_LEVEL_HEIGHT {
            return Err(LevelError::invalid(
                "height",
                format!("{} not in 1..={MAX_LEVEL_HEIGHT}", self.height),
            ));
        }
        if !(MIN_RELEASE_RATE..=MAX_RELEASE_RATE).contains(&self.release_rate) {
            return Err(LevelError::invalid(
                "release_rate",
                format!(
                    "{} not in {MIN_RELEASE_RATE}..={MAX_RELEASE_RATE}",
                    self.release_rate
                ),
            ));
        }
        if self.lemmings == 0 || self.lemmings > MAX_LEMMINGS {
            return Err(LevelError::invalid(
                "lemmings",
                format!("{} not in 1..={MAX_LEMMINGS}", self.lemmings),
            ));
        }
        if self.to_rescue > self.lemmings {
            return Err(LevelError::invalid(
                "to_rescue",
                format!("{} exceeds lemming count {}", self.to_rescue, self.lemmings),
            ));
        }
        if self.time_limit_minutes == 0 || self.time_limit_minutes > MAX_TIME_LIMIT_MINUTES {
            return Err(LevelError::invalid(
                "time_limit_minutes",
                format!(
                    "{} not in 1..={MAX_TIME_LIMIT_MINUTES}",
                    self.time_limit_minutes
                ),
            ));
        }
        if self.skills.max() > MAX_SKILL_COUNT {
            return Err(LevelError::invalid(
                "skills",
                format!("budget above {MAX_SKILL_COUNT}"),
            ));
        }
        if let Some(distance) = self.max_fall_distance {
            if distance <= 0 {
                return Err(LevelError::invalid(
                    "max_fall_distance",
                    "must be positive",
                ));
            }
        }

        let bounds = self.bounds();
        for piece in &self.terrain {
            if piece.rect.is_empty() || !piece.rect.intersects(&bounds) {
                return Err(LevelError::invalid(
                    "terrain",
                    format!("piece {:?} is empty or outside the level", piece.rect),
                ));
            }
        }
        for object in &self.objects {
            let trigger = object.trigger.unwrap_or(object.rect);
            if object.rect.is_empty() || trigger.is_empty() || !trigger.intersects(&bounds) {
                return Err(LevelError::invalid(
                    "objects",
                    format!("{:?} at {:?} is empty or outside the level", object.kind, object.rect),
                ));
            }
        }

        for required in [ObjectKind::Entrance, ObjectKind::Exit] {
            if !self.objects.iter().any(|o| o.kind == required) {
                return Err(LevelError::MissingObject(required));
            }
        }
        Ok(())
    }
}
