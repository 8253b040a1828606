//! Levels: definitions on disk and the runtime level they build into

pub mod def;
pub mod object;
pub mod terrain;

pub use def::{LevelDef, ObjectDef, TerrainPiece};
pub use object::{LevelObject, ObjectKind, ObjectState};
pub use terrain::Terrain;

use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::seconds_to_ticks;
use crate::sim::skills::SkillCounts;
use crate::sim::stencil::{Mask, Material};
use crate::tuning::Tuning;

/// Numeric parameters of a level.
///
/// Replays carry a copy so playback against an edited level is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelParams {
    pub width: u32,
    pub height: u32,
    pub release_rate: u8,
    pub lemmings: u32,
    pub to_rescue: u32,
    pub time_limit_ticks: u32,
    pub skills: SkillCounts,
    pub max_fall_distance: i32,
}

/// A validated level ready to simulate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub id: String,
    pub name: String,
    pub params: LevelParams,
    pub terrain: Terrain,
    pub objects: Vec<LevelObject>,
}

impl Level {
    /// Validate a definition and rasterize its terrain and objects
    pub fn build(def: &LevelDef, tuning: &Tuning) -> Result<Self, LevelError> {
        def.validate()?;

        let mut terrain = Terrain::new(def.width, def.height);
        for piece in &def.terrain {
            let material = if piece.erase {
                Material::Empty
            } else {
                piece.material
            };
            terrain.paint(piece.rect, material);
        }

        let mut objects = Vec::with_capacity(def.objects.len());
        for (index, object) in def.objects.iter().enumerate() {
            let object = LevelObject::new(object.kind, object.rect, object.trigger);
            match object.kind {
                ObjectKind::Steel => terrain.harden(object.trigger),
                ObjectKind::OneWayLeft => terrain.tag_one_way(object.trigger, Mask::ONE_WAY_LEFT),
                ObjectKind::OneWayRight => {
                    terrain.tag_one_way(object.trigger, Mask::ONE_WAY_RIGHT)
                }
                kind => {
                    if let Some(bits) = kind.trigger_mask() {
                        let stencil = terrain.stencil_mut();
                        for p in object.trigger.points() {
                            let mask = (stencil.get(p.x, p.y) | bits).with_object(index);
                            stencil.set(p.x, p.y, mask);
                        }
                    }
                }
            }
            objects.push(object);
        }

        let params = LevelParams {
            width: def.width,
            height: def.height,
            release_rate: def.release_rate,
            lemmings: def.lemmings,
            to_rescue: def.to_rescue,
            time_limit_ticks: seconds_to_ticks(def.time_limit_minutes * 60),
            skills: def.skills,
            max_fall_distance: def.max_fall_distance.unwrap_or(tuning.max_fall_distance),
        };

        log::debug!(
            "Built level `{}`: {}x{}, {} objects, {} lemmings",
            def.id,
            def.width,
            def.height,
            objects.len(),
            def.lemmings
        );

        Ok(Self {
            id: def.id.clone(),
            name: def.name.clone(),
            params,
            terrain,
            objects,
        })
    }

    /// Indices of the entrances in definition order
    pub fn entrances(&self) -> Vec<usize> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.kind == ObjectKind::Entrance)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stencil::Rect;

    fn def() -> LevelDef {
        LevelDef {
            id: "build-test".into(),
            name: String::new(),
            width: 100,
            height: 50,
            release_rate: 50,
            lemmings: 5,
            to_rescue: 1,
            time_limit_minutes: 2,
            skills: SkillCounts::uniform(3),
            max_fall_distance: None,
            terrain: vec![
                TerrainPiece {
                    rect: Rect::new(0, 40, 100, 10),
                    material: Material::Brick,
                    erase: false,
                },
                TerrainPiece {
                    rect: Rect::new(10, 40, 5, 2),
                    material: Material::Brick,
                    erase: true,
                },
            ],
            objects: vec![
                ObjectDef {
                    kind: ObjectKind::Entrance,
                    rect: Rect::new(5, 5, 10, 5),
                    trigger: None,
                },
                ObjectDef {
                    kind: ObjectKind::Exit,
                    rect: Rect::new(80, 30, 10, 10),
                    trigger: Some(Rect::new(84, 36, 2, 4)),
                },
                ObjectDef {
                    kind: ObjectKind::Steel,
                    rect: Rect::new(50, 35, 10, 10),
                    trigger: None,
                },
                ObjectDef {
                    kind: ObjectKind::OneWayRight,
                    rect: Rect::new(60, 40, 10, 5),
                    trigger: None,
                },
            ],
        }
    }

    #[test]
    fn test_build_rasterizes_terrain_and_objects() {
        let tuning = Tuning::default();
        let level = Level::build(&def(), &tuning).unwrap();
        let stencil = level.terrain.stencil();

        assert_eq!(stencil.material(0, 40), Material::Brick);
        assert_eq!(stencil.material(12, 40), Material::Empty);
        assert_eq!(stencil.material(12, 42), Material::Brick);
        // Steel object only hardens existing terrain
        assert_eq!(stencil.material(55, 40), Material::Steel);
        assert_eq!(stencil.material(55, 36), Material::Empty);
        assert!(stencil.get(65, 42).contains(Mask::ONE_WAY_RIGHT));

        let exit = stencil.get(85, 38);
        assert!(exit.contains(Mask::EXIT));
        assert_eq!(exit.object(), Some(1));
        assert!(!stencil.get(81, 31).contains(Mask::EXIT));

        assert_eq!(level.entrances(), vec![0]);
        assert_eq!(level.params.time_limit_ticks, seconds_to_ticks(120));
        assert_eq!(level.params.max_fall_distance, tuning.max_fall_distance);
    }

    #[test]
    fn test_fall_distance_override() {
        let mut def = def();
        def.max_fall_distance = Some(20);
        let level = Level::build(&def, &Tuning::default()).unwrap();
        assert_eq!(level.params.max_fall_distance, 20);
    }

    #[test]
    fn test_build_refuses_invalid_definition() {
        let mut def = def();
        def.lemmings = 0;
        assert!(Level::build(&def, &Tuning::default()).is_err());
    }
}
