//! Chunked block storage, chunk streaming and procedural town generation for
//! the Brickfield engine.

pub mod chunk;
pub mod chunk_manager;
pub mod generation;
pub mod landmark;
pub mod streaming;
pub mod world;

pub use chunk::Chunk;
pub use chunk_manager::ChunkManager;
pub use generation::{
    GenerationStage, GeneratorConfig, LayoutConfig, StageTracker, TerrainConfig,
    TerrainGenerator, TownPlan, WorldGenerator,
};
pub use landmark::{BuildingPlot, Landmark, LandmarkCategory, LandmarkType, NpcSpawnPoint};
pub use streaming::StreamingConfig;
pub use world::{BlockAccess, BlockView, World};

/// World seed for procedural generation.
pub type WorldSeed = u64;
