//! Per-pixel collision and material stencil
//!
//! One `Mask` per level pixel. The low byte holds the material and its
//! modifiers, the next byte holds trigger kinds, and the high half-word holds
//! the index (+1) of the level object owning a trigger pixel.
//!
//! Out-of-bounds access is always safe: reads return `Mask::EMPTY` and writes
//! are dropped, because terrain-editing skills routinely reach past the edges.

use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use bytemuck::{Pod, Zeroable};
use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Bit-composable pixel classification
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Pod, Zeroable,
)]
pub struct Mask(pub u32);

impl Mask {
    pub const EMPTY: Mask = Mask(0);

    // Material (at most one of these is ever set)
    pub const BRICK: Mask = Mask(1 << 0);
    pub const STEEL: Mask = Mask(1 << 1);

    // Material modifiers
    /// Terrain that can only be bashed or mined travelling left
    pub const ONE_WAY_LEFT: Mask = Mask(1 << 2);
    /// Terrain that can only be bashed or mined travelling right
    pub const ONE_WAY_RIGHT: Mask = Mask(1 << 3);

    // Blocker fields
    /// Walkers entering this pixel are turned to face left
    pub const FORCE_LEFT: Mask = Mask(1 << 4);
    /// Walkers entering this pixel are turned to face right
    pub const FORCE_RIGHT: Mask = Mask(1 << 5);

    // Triggers
    pub const EXIT: Mask = Mask(1 << 8);
    pub const TRAP: Mask = Mask(1 << 9);
    pub const FIRE: Mask = Mask(1 << 10);
    pub const WATER: Mask = Mask(1 << 11);

    pub const MATERIAL: Mask = Mask(Self::BRICK.0 | Self::STEEL.0);
    pub const ONE_WAY: Mask = Mask(Self::ONE_WAY_LEFT.0 | Self::ONE_WAY_RIGHT.0);
    pub const FORCE: Mask = Mask(Self::FORCE_LEFT.0 | Self::FORCE_RIGHT.0);
    pub const TRIGGER: Mask =
        Mask(Self::EXIT.0 | Self::TRAP.0 | Self::FIRE.0 | Self::WATER.0);

    const OBJECT_SHIFT: u32 = 16;
    const OBJECT_BITS: u32 = 0xFFFF << Self::OBJECT_SHIFT;

    /// True if every bit of `other` is set
    #[inline]
    pub const fn contains(self, other: Mask) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set
    #[inline]
    pub const fn intersects(self, other: Mask) -> bool {
        self.0 & other.0 != 0
    }

    /// Material class of this pixel
    pub const fn material(self) -> Material {
        if self.intersects(Self::STEEL) {
            Material::Steel
        } else if self.intersects(Self::BRICK) {
            Material::Brick
        } else {
            Material::Empty
        }
    }

    /// Whether lemmings can stand on or collide with this pixel
    #[inline]
    pub const fn is_solid(self) -> bool {
        self.intersects(Self::MATERIAL)
    }

    /// Index of the level object owning this pixel's trigger
    pub const fn object(self) -> Option<usize> {
        let id = (self.0 & Self::OBJECT_BITS) >> Self::OBJECT_SHIFT;
        if id == 0 { None } else { Some(id as usize - 1) }
    }

    /// Same mask tagged with the given object index
    pub const fn with_object(self, index: usize) -> Mask {
        let id = ((index as u32 + 1) << Self::OBJECT_SHIFT) & Self::OBJECT_BITS;
        Mask((self.0 & !Self::OBJECT_BITS) | id)
    }
}

impl BitOr for Mask {
    type Output = Mask;
    fn bitor(self, rhs: Mask) -> Mask {
        Mask(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mask {
    fn bitor_assign(&mut self, rhs: Mask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Mask {
    type Output = Mask;
    fn bitand(self, rhs: Mask) -> Mask {
        Mask(self.0 & rhs.0)
    }
}

impl Not for Mask {
    type Output = Mask;
    fn not(self) -> Mask {
        Mask(!self.0)
    }
}

/// Exclusive material classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    #[default]
    Empty,
    Brick,
    Steel,
}

impl Material {
    const fn bits(self) -> Mask {
        match self {
            Material::Empty => Mask::EMPTY,
            Material::Brick => Mask::BRICK,
            Material::Steel => Mask::STEEL,
        }
    }
}

/// Axis-aligned pixel rectangle (`w` and `h` exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle spanning two inclusive corners in any order
    pub fn from_corners(a: IVec2, b: IVec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x - min.x + 1, max.y - min.y + 1)
    }

    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub const fn contains(&self, p: IVec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub const fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Bottom-centre pixel (where an entrance drops its lemmings)
    pub const fn bottom_center(&self) -> IVec2 {
        IVec2::new(self.x + self.w / 2, self.y + self.h - 1)
    }

    /// All pixels, row-major
    pub fn points(&self) -> impl Iterator<Item = IVec2> + use<> {
        let r = *self;
        (r.y..r.bottom()).flat_map(move |y| (r.x..r.right()).map(move |x| IVec2::new(x, y)))
    }
}

/// The per-pixel classification grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stencil {
    width: i32,
    height: i32,
    cells: Vec<Mask>,
}

impl Stencil {
    /// Create an all-empty stencil
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.min(i32::MAX as u32) as i32;
        let height = height.min(i32::MAX as u32) as i32;
        Self {
            width,
            height,
            cells: vec![Mask::EMPTY; width as usize * height as usize],
        }
    }

    #[inline]
    pub const fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Full-level rectangle
    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Mask at a pixel; empty outside the level
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Mask {
        self.index(x, y)
            .and_then(|i| self.cells.get(i).copied())
            .unwrap_or(Mask::EMPTY)
    }

    /// Overwrite a pixel; no-op outside the level.
    /// A mask carrying both material bits is stored as steel.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, mask: Mask) {
        let mask = if mask.contains(Mask::MATERIAL) {
            mask & !Mask::BRICK
        } else {
            mask
        };
        if let Some(cell) = self.index(x, y).and_then(|i| self.cells.get_mut(i)) {
            *cell = mask;
        }
    }

    /// Set bits on a pixel
    pub fn insert(&mut self, x: i32, y: i32, bits: Mask) {
        let mask = self.get(x, y);
        self.set(x, y, mask | bits);
    }

    /// Clear bits on a pixel
    pub fn remove(&mut self, x: i32, y: i32, bits: Mask) {
        let mask = self.get(x, y);
        self.set(x, y, mask & !bits);
    }

    #[inline]
    pub fn material(&self, x: i32, y: i32) -> Material {
        self.get(x, y).material()
    }

    /// Replace the material, keeping triggers and blocker fields.
    /// Clearing to empty also drops one-way modifiers.
    pub fn set_material(&mut self, x: i32, y: i32, material: Material) {
        let mut mask = self.get(x, y) & !Mask::MATERIAL;
        if material == Material::Empty {
            mask = mask & !Mask::ONE_WAY;
        }
        self.set(x, y, mask | material.bits());
    }

    #[inline]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_solid()
    }

    #[inline]
    pub fn is_steel(&self, x: i32, y: i32) -> bool {
        self.get(x, y).intersects(Mask::STEEL)
    }

    /// Level object whose trigger covers this pixel
    pub fn object_at(&self, x: i32, y: i32) -> Option<usize> {
        self.get(x, y).object()
    }

    /// Whether any pixel in `rect` satisfies `pred` (out-of-bounds pixels read as empty)
    pub fn any_in(&self, rect: Rect, pred: impl Fn(Mask) -> bool) -> bool {
        rect.points().any(|p| pred(self.get(p.x, p.y)))
    }

    /// Number of pixels of the given material
    pub fn count_material(&self, material: Material) -> usize {
        self.cells.iter().filter(|m| m.material() == material).count()
    }

    /// Raw cells, row-major
    pub fn cells(&self) -> &[Mask] {
        &self.cells
    }

    /// Cells as bytes (GPU upload and byte-for-byte comparisons)
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_material_is_exclusive() {
        let mut stencil = Stencil::new(4, 4);
        stencil.set_material(1, 1, Material::Brick);
        assert_eq!(stencil.material(1, 1), Material::Brick);
        stencil.set_material(1, 1, Material::Steel);
        assert_eq!(stencil.material(1, 1), Material::Steel);
        assert!(!stencil.get(1, 1).intersects(Mask::BRICK));
    }

    #[test]
    fn test_raw_write_of_both_materials_stores_steel() {
        let mut stencil = Stencil::new(4, 4);
        stencil.set(0, 0, Mask::BRICK | Mask::STEEL | Mask::EXIT);
        assert_eq!(stencil.get(0, 0), Mask::STEEL | Mask::EXIT);
    }

    #[test]
    fn test_clearing_material_keeps_triggers() {
        let mut stencil = Stencil::new(4, 4);
        stencil.set(2, 2, (Mask::BRICK | Mask::ONE_WAY_LEFT | Mask::WATER).with_object(3));
        stencil.set_material(2, 2, Material::Empty);
        let mask = stencil.get(2, 2);
        assert_eq!(mask.material(), Material::Empty);
        assert!(mask.contains(Mask::WATER));
        assert!(!mask.intersects(Mask::ONE_WAY));
        assert_eq!(mask.object(), Some(3));
    }

    #[test]
    fn test_object_tagging() {
        assert_eq!(Mask::EMPTY.object(), None);
        let tagged = Mask::EXIT.with_object(0);
        assert_eq!(tagged.object(), Some(0));
        assert!(tagged.contains(Mask::EXIT));
        assert_eq!(tagged.with_object(41).object(), Some(41));
    }

    #[test]
    fn test_region_queries() {
        let mut stencil = Stencil::new(10, 10);
        stencil.set_material(5, 5, Material::Steel);
        assert!(stencil.any_in(Rect::new(4, 4, 3, 3), |m| m.material() == Material::Steel));
        assert!(!stencil.any_in(Rect::new(0, 0, 3, 3), Mask::is_solid));
        assert_eq!(stencil.count_material(Material::Steel), 1);
        assert_eq!(stencil.as_bytes().len(), 10 * 10 * 4);
    }

    #[test]
    fn test_rect_geometry() {
        let r = Rect::from_corners(IVec2::new(5, 8), IVec2::new(2, 3));
        assert_eq!(r, Rect::new(2, 3, 4, 6));
        assert!(r.contains(IVec2::new(5, 8)));
        assert!(!r.contains(IVec2::new(6, 8)));
        assert_eq!(r.points().count(), 24);
        assert_eq!(r.bottom_center(), IVec2::new(4, 8));
    }

    proptest! {
        #[test]
        fn prop_out_of_bounds_is_safe(x in -50i32..50, y in -50i32..50, bits in any::<u32>()) {
            let mut stencil = Stencil::new(16, 12);
            let before = stencil.clone();
            let inside = stencil.in_bounds(x, y);
            stencil.set(x, y, Mask(bits));
            stencil.insert(x, y, Mask(bits));
            stencil.set_material(x, y, Material::Steel);
            if !inside {
                prop_assert_eq!(stencil.get(x, y), Mask::EMPTY);
                prop_assert_eq!(&stencil, &before);
            }
        }

        #[test]
        fn prop_set_keeps_one_material(x in 0i32..16, y in 0i32..12, bits in any::<u32>()) {
            let mut stencil = Stencil::new(16, 12);
            stencil.set(x, y, Mask(bits));
            stencil.insert(x, y, Mask::BRICK);
            let mask = stencil.get(x, y);
            prop_assert!(!mask.contains(Mask::MATERIAL));
            // Everything but the material bits is stored as given
            prop_assert_eq!(mask & !Mask::MATERIAL, Mask(bits) & !Mask::MATERIAL);
            if Mask(bits).intersects(Mask::STEEL) {
                prop_assert_eq!(mask.material(), Material::Steel);
            }
        }
    }
}
