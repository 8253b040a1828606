//! Instance data for sprite rendering
//!
//! Built from a `Snapshot`, laid out `#[repr(C)]` so a GPU backend can
//! upload the slices as-is.

use bytemuck::{Pod, Zeroable};

use crate::level::ObjectKind;
use crate::sim::{ActionKind, Direction, Snapshot};

/// Instance flag bits
pub mod flags {
    pub const FLIP_X: u32 = 1 << 0;
    pub const CLIMBER: u32 = 1 << 1;
    pub const FLOATER: u32 = 1 << 2;
    pub const FUSE: u32 = 1 << 3;
}

/// Colors for game elements
pub mod colors {
    pub const LEMMING_ROBE: [f32; 4] = [0.3, 0.4, 1.0, 1.0];
    pub const ENTRANCE: [f32; 4] = [0.6, 0.4, 0.2, 1.0];
    pub const EXIT: [f32; 4] = [0.9, 0.8, 0.3, 1.0];
    pub const HAZARD: [f32; 4] = [1.0, 0.3, 0.2, 1.0];
    pub const WATER: [f32; 4] = [0.2, 0.4, 0.9, 0.8];
    pub const INERT: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
}

/// One lemming sprite
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Foot position in level pixels
    pub position: [f32; 2],
    /// Sprite strip (action)
    pub strip: u32,
    pub frame: u32,
    pub flags: u32,
    /// Fuse seconds to draw, 0 when no fuse
    pub fuse: u32,
    pub tint: [f32; 4],
}

/// One level object sprite
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectInstance {
    /// Top-left corner in level pixels
    pub position: [f32; 2],
    pub size: [f32; 2],
    pub frame: u32,
    pub kind: u32,
    pub color: [f32; 4],
}

/// Stable strip index per action, matching the sprite sheet layout
pub const fn strip_index(kind: ActionKind) -> u32 {
    match kind {
        ActionKind::Walking => 0,
        ActionKind::Falling => 1,
        ActionKind::Floating => 2,
        ActionKind::Climbing => 3,
        ActionKind::Hoisting => 4,
        ActionKind::Digging => 5,
        ActionKind::Bashing => 6,
        ActionKind::Mining => 7,
        ActionKind::Building => 8,
        ActionKind::Shrugging => 9,
        ActionKind::Blocking => 10,
        ActionKind::OhNo => 11,
        ActionKind::Splatting => 12,
        ActionKind::Drowning => 13,
        ActionKind::Exploding => 14,
        ActionKind::Trapped | ActionKind::Burning | ActionKind::FellOut => 15,
        ActionKind::Exited => 16,
    }
}

const fn object_style(kind: ObjectKind) -> (u32, [f32; 4]) {
    match kind {
        ObjectKind::Entrance => (0, colors::ENTRANCE),
        ObjectKind::Exit => (1, colors::EXIT),
        ObjectKind::Trap => (2, colors::HAZARD),
        ObjectKind::Fire => (3, colors::HAZARD),
        ObjectKind::Water => (4, colors::WATER),
        ObjectKind::Steel | ObjectKind::OneWayLeft | ObjectKind::OneWayRight => {
            (5, colors::INERT)
        }
        ObjectKind::Decoration => (6, colors::INERT),
    }
}

pub fn lemming_instances(snapshot: &Snapshot) -> Vec<SpriteInstance> {
    snapshot
        .lemmings
        .iter()
        .map(|lem| {
            let mut bits = 0;
            if lem.dir == Direction::Left {
                bits |= flags::FLIP_X;
            }
            if lem.climber {
                bits |= flags::CLIMBER;
            }
            if lem.floater {
                bits |= flags::FLOATER;
            }
            if lem.fuse_seconds.is_some() {
                bits |= flags::FUSE;
            }
            SpriteInstance {
                position: [lem.pos.x as f32, lem.pos.y as f32],
                strip: strip_index(lem.action),
                frame: lem.anim_frame,
                flags: bits,
                fuse: lem.fuse_seconds.unwrap_or(0),
                tint: colors::LEMMING_ROBE,
            }
        })
        .collect()
}

/// Visible objects; modifier areas are not drawn
pub fn object_instances(snapshot: &Snapshot) -> Vec<ObjectInstance> {
    snapshot
        .objects
        .iter()
        .filter(|o| {
            !matches!(
                o.kind,
                ObjectKind::Steel | ObjectKind::OneWayLeft | ObjectKind::OneWayRight
            )
        })
        .map(|o| {
            let (kind, color) = object_style(o.kind);
            ObjectInstance {
                position: [o.rect.x as f32, o.rect.y as f32],
                size: [o.rect.w as f32, o.rect.h as f32],
                frame: o.anim_frame,
                kind,
                color,
            }
        })
        .collect()
}

/// Raw bytes for a buffer upload
pub fn as_bytes<T: Pod>(instances: &[T]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
