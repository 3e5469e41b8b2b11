//! Math utilities and helpers.

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Ray for raycasting operations.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray, or `None` if the direction has no length.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    /// Get a point along the ray at distance t
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Integer axis-aligned box of block cells.
///
/// Covers cells `min..min + size` on each axis (max exclusive).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockBox {
    pub min: IVec3,
    pub size: IVec3,
}

impl BlockBox {
    #[inline]
    pub const fn new(min: IVec3, size: IVec3) -> Self {
        Self { min, size }
    }

    /// Exclusive upper corner.
    #[inline]
    pub fn max(&self) -> IVec3 {
        self.min + self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0 || self.size.z <= 0
    }

    /// Check if a cell lies inside the box.
    #[inline]
    pub fn contains(&self, cell: IVec3) -> bool {
        let max = self.max();
        cell.x >= self.min.x
            && cell.x < max.x
            && cell.y >= self.min.y
            && cell.y < max.y
            && cell.z >= self.min.z
            && cell.z < max.z
    }

    /// Check if this box shares any cell with another.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x
            && other.min.x < a_max.x
            && self.min.y < b_max.y
            && other.min.y < a_max.y
            && self.min.z < b_max.z
            && other.min.z < a_max.z
    }

    /// Grow the box horizontally by `margin` cells on every side.
    #[inline]
    pub fn expanded_xz(&self, margin: i32) -> Self {
        Self {
            min: self.min - IVec3::new(margin, 0, margin),
            size: self.size + IVec3::new(2 * margin, 0, 2 * margin),
        }
    }

    /// Chebyshev distance in the XZ plane from a column to the box footprint.
    ///
    /// Zero for columns inside the footprint.
    #[inline]
    pub fn distance_xz(&self, x: i32, z: i32) -> i32 {
        let max = self.max();
        let dx = (self.min.x - x).max(x - (max.x - 1)).max(0);
        let dz = (self.min.z - z).max(z - (max.z - 1)).max(0);
        dx.max(dz)
    }

    /// Iterate every cell in the box in x-fastest order.
    pub fn cells(&self) -> impl Iterator<Item = IVec3> {
        let (min, max) = (self.min, self.max());
        (min.y..max.y).flat_map(move |y| {
            (min.z..max.z).flat_map(move |z| (min.x..max.x).map(move |x| IVec3::new(x, y, z)))
        })
    }
}
