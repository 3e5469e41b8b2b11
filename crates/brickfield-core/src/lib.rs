//! Core types, math, and traits for the Brickfield town engine.
//!
//! This crate provides the foundational types used throughout the engine:
//! - The static block table (`BlockType` and its attributes)
//! - Coordinate systems (world, chunk, local)
//! - Ray and integer box math
//! - Common error types

pub mod block;
pub mod coords;
pub mod error;
pub mod math;

pub use block::{face_visible, BlockProps, BlockShape, BlockType, Color};
pub use coords::{ChunkPos, LocalPos, WorldPos};
pub use error::{Error, Result};
pub use math::{BlockBox, Ray};

/// Engine-wide constants
pub mod constants {
    /// Size of a chunk in blocks along X and Z
    pub const CHUNK_SIZE: usize = 16;
    /// Size of a chunk in blocks along Y
    pub const CHUNK_HEIGHT: usize = 16;
    /// Total blocks in a chunk (16^3)
    pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_HEIGHT * CHUNK_SIZE;

    /// Horizontal radius of the generated town, in chunks.
    pub const WORLD_CHUNK_RADIUS: i32 = 8;
    /// Elevation of open ground around buildings.
    pub const GROUND_LEVEL: i32 = 0;

    /// Lowest layer of the world. Everything at or below is bedrock.
    pub const BEDROCK_DEPTH: i32 = -32;
    /// Concrete floor of the sewer tunnels.
    pub const SEWER_FLOOR: i32 = -10;
    /// Topmost air layer of the sewer tunnels.
    pub const SEWER_CEILING: i32 = -6;
    /// Floor of the bunker beneath the park.
    pub const BUNKER_FLOOR: i32 = -22;
    /// Roof slab of the bunker beneath the park.
    pub const BUNKER_TOP: i32 = -16;

    /// Distance between parallel streets, in blocks.
    pub const STREET_SPACING: i32 = 20;
}
