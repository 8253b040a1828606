//! Terrain: the collision stencil plus the visual background image
//!
//! The background is kept in step with the stencil for rendering only; the
//! stencil is authoritative for every collision query.

use crate::sim::stencil::{Mask, Material, Rect, Stencil};

/// ARGB colours written into the background image
pub mod colors {
    pub const TRANSPARENT: u32 = 0x0000_0000;
    pub const BRICK: u32 = 0xFF8B_5A2B;
    pub const BRICK_SHADE: u32 = 0xFF7A_4E24;
    pub const STEEL: u32 = 0xFF8C_8C9C;
    pub const BUILT_BRICK: u32 = 0xFFB0_8050;
}

/// Stencil and background owned together so they never drift apart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terrain {
    stencil: Stencil,
    pixels: Vec<u32>,
}

impl Terrain {
    pub fn new(width: u32, height: u32) -> Self {
        let stencil = Stencil::new(width, height);
        let len = stencil.cells().len();
        Self {
            stencil,
            pixels: vec![colors::TRANSPARENT; len],
        }
    }

    #[inline]
    pub const fn stencil(&self) -> &Stencil {
        &self.stencil
    }

    /// Direct access for trigger stamping and blocker fields
    pub(crate) fn stencil_mut(&mut self) -> &mut Stencil {
        &mut self.stencil
    }

    pub fn width(&self) -> i32 {
        self.stencil.width()
    }

    pub fn height(&self) -> i32 {
        self.stencil.height()
    }

    fn pixel_mut(&mut self, x: i32, y: i32) -> Option<&mut u32> {
        if !self.stencil.in_bounds(x, y) {
            return None;
        }
        let i = y as usize * self.stencil.width() as usize + x as usize;
        self.pixels.get_mut(i)
    }

    fn color_for(material: Material, x: i32, y: i32) -> u32 {
        match material {
            Material::Empty => colors::TRANSPARENT,
            Material::Steel => colors::STEEL,
            Material::Brick if (x / 4 + y / 2) % 2 == 0 => colors::BRICK,
            Material::Brick => colors::BRICK_SHADE,
        }
    }

    /// Fill a rectangle with a material (level construction)
    pub fn paint(&mut self, rect: Rect, material: Material) {
        for p in rect.points() {
            self.stencil.set_material(p.x, p.y, material);
            if let Some(px) = self.pixel_mut(p.x, p.y) {
                *px = Self::color_for(material, p.x, p.y);
            }
        }
    }

    /// Turn the solid pixels of a rectangle into steel
    pub fn harden(&mut self, rect: Rect) {
        for p in rect.points() {
            if self.stencil.is_solid(p.x, p.y) {
                self.stencil.set_material(p.x, p.y, Material::Steel);
                if let Some(px) = self.pixel_mut(p.x, p.y) {
                    *px = colors::STEEL;
                }
            }
        }
    }

    /// Tag the brick pixels of a rectangle with a one-way modifier
    pub fn tag_one_way(&mut self, rect: Rect, bit: Mask) {
        for p in rect.points() {
            if self.stencil.material(p.x, p.y) == Material::Brick {
                self.stencil.insert(p.x, p.y, bit);
            }
        }
    }

    /// Remove a diggable pixel. Steel is never removed.
    /// Returns true if terrain was actually removed.
    pub fn carve(&mut self, x: i32, y: i32) -> bool {
        if self.stencil.material(x, y) != Material::Brick {
            return false;
        }
        self.stencil.set_material(x, y, Material::Empty);
        if let Some(px) = self.pixel_mut(x, y) {
            *px = colors::TRANSPARENT;
        }
        true
    }

    /// Place a builder brick pixel into empty space.
    /// Returns true if a pixel was added.
    pub fn lay_brick(&mut self, x: i32, y: i32) -> bool {
        if !self.stencil.in_bounds(x, y) || self.stencil.is_solid(x, y) {
            return false;
        }
        self.stencil.set_material(x, y, Material::Brick);
        if let Some(px) = self.pixel_mut(x, y) {
            *px = colors::BUILT_BRICK;
        }
        true
    }

    /// Background ARGB image, row-major
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Background image as bytes for texture upload
    pub fn pixel_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}
