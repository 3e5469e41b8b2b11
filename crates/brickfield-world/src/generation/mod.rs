//! Deterministic procedural town generation.
//!
//! A [`WorldGenerator`] is a pure function of its [`GeneratorConfig`]: the
//! town plan is fixed when the generator is built, and every chunk of the
//! base layer (strata, terrain and sewers) depends only on the seed and the
//! chunk coordinate, so base chunks are generated in parallel and merged into
//! the [`World`] under a single writer. Buildings, streets, the park and the
//! bunker are then stamped in sequence.

pub mod buildings;
pub mod layout;
pub mod park;
pub mod streets;
pub mod terrain;
pub mod underground;

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use brickfield_core::constants::CHUNK_SIZE;
use brickfield_core::coords::{ChunkPos, LocalPos, WorldPos};
use brickfield_core::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use layout::{LayoutConfig, PlannedBuilding, TownPlan};
pub use terrain::{TerrainConfig, TerrainGenerator};

use crate::chunk::Chunk;
use crate::landmark::{BuildingPlot, NpcSpawnPoint};
use crate::world::World;
use crate::WorldSeed;

/// Progress marker for [`WorldGenerator::generate_world`], in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GenerationStage {
    NotStarted = 0,
    PlanningLayout = 1,
    Terrain = 2,
    Underground = 3,
    Streets = 4,
    Buildings = 5,
    Park = 6,
    Complete = 7,
}

impl GenerationStage {
    const ALL: [Self; 8] = [
        Self::NotStarted,
        Self::PlanningLayout,
        Self::Terrain,
        Self::Underground,
        Self::Streets,
        Self::Buildings,
        Self::Park,
        Self::Complete,
    ];

    pub const fn all() -> &'static [Self] {
        &Self::ALL
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        if (value as usize) < Self::ALL.len() {
            Some(Self::ALL[value as usize])
        } else {
            None
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::PlanningLayout => "planning layout",
            Self::Terrain => "terrain",
            Self::Underground => "underground",
            Self::Streets => "streets",
            Self::Buildings => "buildings",
            Self::Park => "park",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared, monotonic generation progress.
///
/// Clones observe the same stage, so a handle can be polled from another
/// thread while generation runs.
#[derive(Debug, Clone, Default)]
pub struct StageTracker(Arc<AtomicU8>);

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> GenerationStage {
        GenerationStage::from_u8(self.0.load(Ordering::Acquire)).unwrap_or(GenerationStage::Complete)
    }

    /// Move to `stage` unless progress is already past it.
    ///
    /// Returns the stage after the call.
    pub fn advance(&self, stage: GenerationStage) -> GenerationStage {
        let previous = self.0.fetch_max(stage as u8, Ordering::AcqRel);
        GenerationStage::from_u8(previous.max(stage as u8)).unwrap_or(GenerationStage::Complete)
    }
}

/// Everything a town depends on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub seed: WorldSeed,
    pub terrain: TerrainConfig,
    pub layout: LayoutConfig,
}

impl GeneratorConfig {
    pub fn with_seed(seed: WorldSeed) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        self.layout.validate()
    }
}

/// Seed-driven town generator.
pub struct WorldGenerator {
    config: GeneratorConfig,
    plan: TownPlan,
    terrain: TerrainGenerator,
    stage: StageTracker,
    plots: Vec<BuildingPlot>,
    spawn_points: Vec<NpcSpawnPoint>,
}

impl WorldGenerator {
    /// Validate the configuration and plan the town.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Create a generator with default settings.
    pub fn with_seed(seed: WorldSeed) -> Self {
        Self::from_valid(GeneratorConfig::with_seed(seed))
    }

    fn from_valid(config: GeneratorConfig) -> Self {
        let plan = TownPlan::generate(config.seed, &config.layout);
        let terrain =
            TerrainGenerator::new(config.seed, config.terrain.clone(), plan.surface_footprints());
        Self {
            config,
            plan,
            terrain,
            stage: StageTracker::new(),
            plots: Vec::new(),
            spawn_points: Vec::new(),
        }
    }

    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub const fn seed(&self) -> WorldSeed {
        self.config.seed
    }

    pub const fn plan(&self) -> &TownPlan {
        &self.plan
    }

    pub const fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }

    pub fn current_stage(&self) -> GenerationStage {
        self.stage.get()
    }

    /// A handle for polling progress from another thread.
    pub fn stage_tracker(&self) -> StageTracker {
        self.stage.clone()
    }

    /// Ground surface height of a column, flattened around buildings.
    pub fn terrain_height(&self, x: i32, z: i32) -> i32 {
        self.terrain.height_at(x, z)
    }

    /// Plots reserved by the last run, above and below ground.
    pub fn building_plots(&self) -> &[BuildingPlot] {
        &self.plots
    }

    /// Staff and visitor spawn points recorded by the last run.
    pub fn npc_spawn_points(&self) -> &[NpcSpawnPoint] {
        &self.spawn_points
    }

    /// Strata, terrain and sewers for one chunk.
    ///
    /// Depends only on the seed and `pos`.
    pub fn generate_chunk_base(&self, pos: ChunkPos) -> Chunk {
        let mut chunk = Chunk::new(pos);
        let base = pos.to_world_pos();
        let size = CHUNK_SIZE as i32;
        let layout = &self.config.layout;
        let dirt_depth = self.config.terrain.dirt_depth;

        for lz in 0..size {
            for lx in 0..size {
                let (x, z) = (base.x + lx, base.z + lz);
                let surface = self.terrain.height_at(x, z);
                let under_road = layout.is_road(x) || layout.is_road(z);

                for ly in 0..size {
                    let block = underground::column_block(base.y + ly, surface, under_road, dirt_depth);
                    if !block.is_air() {
                        chunk.set_local(LocalPos::new(lx as u8, ly as u8, lz as u8), block);
                    }
                }
            }
        }

        chunk
    }

    /// Generate many base chunks in parallel.
    pub fn generate_chunks_parallel(&self, positions: &[ChunkPos]) -> Vec<Chunk> {
        positions
            .par_iter()
            .map(|&pos| self.generate_chunk_base(pos))
            .collect()
    }

    /// Populate `world` with the town.
    ///
    /// Landmarks are registered in the world, and plots and spawn points are
    /// recorded on the generator. Running again regenerates the same town
    /// into the given world.
    #[tracing::instrument(skip(self, world), fields(seed = self.config.seed))]
    pub fn generate_world(&mut self, world: &mut World) {
        let start = std::time::Instant::now();

        self.enter(GenerationStage::PlanningLayout);
        world.clear_landmarks();
        for landmark in self.plan.landmarks() {
            world.add_landmark(*landmark);
        }
        self.plots = self.plan.landmarks().map(BuildingPlot::from).collect();

        self.enter(GenerationStage::Terrain);
        let positions = world.streaming_config().world_chunks();
        let chunks = self.generate_chunks_parallel(&positions);
        let total = chunks.len();
        let solid: Vec<Chunk> = chunks.into_iter().filter(|c| !c.is_empty()).collect();
        debug!("Generated {} base chunks, {} non-empty", total, solid.len());
        world.insert_chunks(solid);

        self.enter(GenerationStage::Underground);
        let hatches = underground::carve_bunker(world, self.plan.bunker());
        debug!("Bunker carved with {} access shafts", hatches.len());

        self.enter(GenerationStage::Streets);
        let paved = streets::lay_streets(
            world,
            &self.config.layout,
            &self.terrain,
            world.streaming_config(),
        );
        debug!("Paved {} street columns", paved);

        self.enter(GenerationStage::Buildings);
        for building in self.plan.buildings() {
            buildings::carve_building(world, building);
        }

        self.enter(GenerationStage::Park);
        let park = *self.plan.park();
        let fence = park::fence_park(world, &park);
        debug!("Park fenced with {} blocks", fence);

        self.spawn_points = self
            .plan
            .landmarks()
            .filter(|l| l.kind.needs_staff())
            .map(|l| NpcSpawnPoint {
                kind: l.kind,
                position: l.entrance(),
            })
            .chain(park::entry_gaps(&park).into_iter().map(|gap| NpcSpawnPoint {
                kind: park.kind,
                position: WorldPos::from(gap),
            }))
            .collect();

        self.enter(GenerationStage::Complete);
        info!(
            "Generated town in {:.2?}: {} landmarks, {} plots, {} spawn points, {} chunks",
            start.elapsed(),
            world.landmark_count(),
            self.plots.len(),
            self.spawn_points.len(),
            world.loaded_chunk_count()
        );
    }

    fn enter(&self, stage: GenerationStage) {
        let now = self.stage.advance(stage);
        if now == stage {
            info!("Generation stage: {}", stage);
        }
    }
}
