//! Chunk streaming window around a reference position.
//!
//! The streaming window is a cube of chunks centred on the chunk containing
//! the reference (player) position, clipped to the generated world bound.

use brickfield_core::constants::{BEDROCK_DEPTH, CHUNK_HEIGHT, WORLD_CHUNK_RADIUS};
use brickfield_core::coords::{ChunkPos, WorldPos};
use brickfield_core::{Error, Result};
use glam::Vec3;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// Configuration for chunk streaming behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Load radius in chunks around the reference chunk (all three axes).
    pub render_distance: i32,
    /// Horizontal radius of the generated world, in chunks.
    pub world_chunk_radius: i32,
    /// Lowest chunk layer of the generated world.
    pub min_chunk_y: i32,
    /// Highest chunk layer of the generated world.
    pub max_chunk_y: i32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_distance: 4,
            world_chunk_radius: WORLD_CHUNK_RADIUS,
            min_chunk_y: BEDROCK_DEPTH.div_euclid(CHUNK_HEIGHT as i32),
            max_chunk_y: 3,
        }
    }
}

impl StreamingConfig {
    /// Check the configuration for values the streamer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.render_distance < 0 {
            return Err(Error::InvalidConfig(format!(
                "render_distance must be non-negative, got {}",
                self.render_distance
            )));
        }
        if self.world_chunk_radius < 0 {
            return Err(Error::InvalidConfig(format!(
                "world_chunk_radius must be non-negative, got {}",
                self.world_chunk_radius
            )));
        }
        if self.min_chunk_y > self.max_chunk_y {
            return Err(Error::InvalidConfig(format!(
                "min_chunk_y ({}) is above max_chunk_y ({})",
                self.min_chunk_y, self.max_chunk_y
            )));
        }
        Ok(())
    }

    /// Whether a chunk lies inside the generated world bound.
    #[inline]
    pub const fn is_within_world(&self, pos: ChunkPos) -> bool {
        pos.x.abs() <= self.world_chunk_radius
            && pos.z.abs() <= self.world_chunk_radius
            && pos.y >= self.min_chunk_y
            && pos.y <= self.max_chunk_y
    }

    /// Whether a chunk lies inside the render cube around `center`.
    #[inline]
    pub fn is_within_render(&self, center: ChunkPos, pos: ChunkPos) -> bool {
        center.chebyshev_distance(pos) <= self.render_distance
    }

    /// Every chunk position of the generated world, in deterministic order.
    pub fn world_chunks(&self) -> Vec<ChunkPos> {
        let r = self.world_chunk_radius;
        let mut out = Vec::new();
        for y in self.min_chunk_y..=self.max_chunk_y {
            for z in -r..=r {
                for x in -r..=r {
                    out.push(ChunkPos::new(x, y, z));
                }
            }
        }
        out
    }

    /// Lowest and highest world-space Y covered by the generated world.
    pub const fn world_y_range(&self) -> (i32, i32) {
        let h = CHUNK_HEIGHT as i32;
        (self.min_chunk_y * h, (self.max_chunk_y + 1) * h - 1)
    }
}

/// Convert world position to chunk position.
pub fn world_to_chunk(pos: Vec3) -> ChunkPos {
    WorldPos::from(pos).chunk_pos()
}

/// Chunks that should be resident for a reference chunk: the render cube
/// intersected with the world bound.
pub fn desired_chunks(config: &StreamingConfig, center: ChunkPos) -> HashSet<ChunkPos> {
    let r = config.render_distance;
    let mut desired = HashSet::new();

    for dy in -r..=r {
        for dz in -r..=r {
            for dx in -r..=r {
                let pos = ChunkPos::new(center.x + dx, center.y + dy, center.z + dz);
                if config.is_within_world(pos) {
                    desired.insert(pos);
                }
            }
        }
    }

    desired
}
