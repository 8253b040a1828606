//! Rendering data module
//!
//! Backend-agnostic: turns snapshots into packed instance buffers and the
//! terrain background into texture bytes. No GPU calls happen here.

pub mod sprite;

pub use sprite::{ObjectInstance, SpriteInstance, lemming_instances, object_instances};

use crate::sim::Snapshot;

/// Everything a backend uploads for one frame
#[derive(Debug, Clone)]
pub struct FrameData {
    pub lemmings: Vec<SpriteInstance>,
    pub objects: Vec<ObjectInstance>,
    /// Terrain texture, `width * height` ARGB pixels
    pub terrain_size: (u32, u32),
    pub terrain: Vec<u8>,
}

impl FrameData {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            lemmings: lemming_instances(snapshot),
            objects: object_instances(snapshot),
            terrain_size: (snapshot.width as u32, snapshot.height as u32),
            terrain: bytemuck::cast_slice(&snapshot.background).to_vec(),
        }
    }
}
