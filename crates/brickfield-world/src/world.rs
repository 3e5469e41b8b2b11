//! The block world: sparse chunks, landmark registry and chunk streaming.

use brickfield_core::coords::{ChunkPos, WorldPos};
use brickfield_core::{BlockType, Result};
use glam::{IVec3, Vec3};
use hashbrown::{HashMap, HashSet};
use parking_lot::RwLockReadGuard;
use tracing::{debug, trace};

use crate::chunk::Chunk;
use crate::chunk_manager::ChunkManager;
use crate::landmark::{Landmark, LandmarkType};
use crate::streaming::{desired_chunks, world_to_chunk, StreamingConfig};

/// Read access to blocks by world coordinate.
///
/// Implemented by [`World`] and by [`BlockView`], which holds the chunk map
/// read lock across many lookups.
pub trait BlockAccess {
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType;

    #[inline]
    fn block(&self, pos: IVec3) -> BlockType {
        self.block_at(pos.x, pos.y, pos.z)
    }

    #[inline]
    fn is_solid(&self, pos: IVec3) -> bool {
        self.block(pos).is_solid()
    }
}

/// A sparse world of chunks.
///
/// Block reads and writes take `&self`; the chunk map is guarded by a
/// readers-writer lock so queries may run on worker threads while a single
/// writer applies edits. The landmark registry is only mutated during
/// generation and takes `&mut self`.
pub struct World {
    chunks: ChunkManager,
    landmarks: HashMap<LandmarkType, Vec<Landmark>>,
    streaming: StreamingConfig,
}

impl World {
    /// Create an empty world with default streaming settings.
    pub fn new() -> Self {
        Self {
            chunks: ChunkManager::new(),
            landmarks: HashMap::new(),
            streaming: StreamingConfig::default(),
        }
    }

    /// Create an empty world with the given streaming settings.
    pub fn with_config(streaming: StreamingConfig) -> Result<Self> {
        streaming.validate()?;
        Ok(Self {
            chunks: ChunkManager::new(),
            landmarks: HashMap::new(),
            streaming,
        })
    }

    pub const fn streaming_config(&self) -> &StreamingConfig {
        &self.streaming
    }

    pub const fn render_distance(&self) -> i32 {
        self.streaming.render_distance
    }

    /// Change the render distance used by subsequent streaming updates.
    pub fn set_render_distance(&mut self, render_distance: i32) {
        self.streaming.render_distance = render_distance.max(0);
    }

    /// Read the block at a world coordinate.
    ///
    /// Unloaded chunks read as air; nothing is generated on demand.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockType {
        let (chunk_pos, local) = WorldPos::new(x, y, z).split();
        self.chunks
            .with_chunk(chunk_pos, |chunk| chunk.get_local(local))
            .unwrap_or(BlockType::AIR)
    }

    /// Write the block at a world coordinate, creating its chunk if needed.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: BlockType) {
        let (chunk_pos, local) = WorldPos::new(x, y, z).split();
        self.chunks
            .with_chunk_or_create(chunk_pos, |chunk| chunk.set_local(local, block));
    }

    /// Player block placement. Only fills air with player-placeable blocks.
    ///
    /// Returns whether the block was placed.
    pub fn place_block(&self, pos: IVec3, block: BlockType) -> bool {
        if !block.is_player_placeable() || !self.get_block(pos.x, pos.y, pos.z).is_air() {
            return false;
        }
        self.set_block(pos.x, pos.y, pos.z, block);
        true
    }

    /// Player block removal. Bedrock cannot be broken.
    ///
    /// Returns the removed block.
    pub fn remove_block(&self, pos: IVec3) -> Option<BlockType> {
        let current = self.get_block(pos.x, pos.y, pos.z);
        if current.is_air() || current == BlockType::BEDROCK {
            return None;
        }
        self.set_block(pos.x, pos.y, pos.z, BlockType::AIR);
        Some(current)
    }

    /// Hold the chunk map read lock for a batch of block lookups.
    pub fn view(&self) -> BlockView<'_> {
        BlockView {
            chunks: self.chunks.read(),
        }
    }

    pub fn is_chunk_loaded(&self, cx: i32, cy: i32, cz: i32) -> bool {
        self.chunks.contains(ChunkPos::new(cx, cy, cz))
    }

    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn loaded_chunks(&self) -> Vec<ChunkPos> {
        self.chunks.positions()
    }

    /// Merge a pre-generated chunk into the world, replacing any existing one.
    pub fn insert_chunk(&self, chunk: Chunk) {
        self.chunks.insert(chunk);
    }

    /// Merge many pre-generated chunks under a single write lock.
    pub fn insert_chunks(&self, chunks: impl IntoIterator<Item = Chunk>) {
        self.chunks.insert_all(chunks);
    }

    /// Run a closure against a loaded chunk.
    pub fn with_chunk<F, R>(&self, pos: ChunkPos, f: F) -> Option<R>
    where
        F: FnOnce(&Chunk) -> R,
    {
        self.chunks.with_chunk(pos, f)
    }

    pub fn is_within_world(&self, pos: ChunkPos) -> bool {
        self.streaming.is_within_world(pos)
    }

    /// Y of the highest solid block in a column of the generated world, if any.
    pub fn surface_height(&self, x: i32, z: i32) -> Option<i32> {
        let (bottom, top) = self.streaming.world_y_range();
        let view = self.view();
        (bottom..=top).rev().find(|&y| view.block_at(x, y, z).is_solid())
    }

    /// Bring the chunk set in line with a reference position.
    ///
    /// Every chunk inside the render cube and the world bound is made
    /// resident, created empty if absent. A chunk is evicted only when it lies
    /// outside both the render cube and the world bound; content inside the
    /// bound is never regenerated, so it stays resident. Returns the `"x,y,z"`
    /// keys of evicted chunks.
    pub fn update_loaded_chunks(&self, position: Vec3) -> HashSet<String> {
        let center = world_to_chunk(position);
        let desired = desired_chunks(&self.streaming, center);

        let mut loaded = 0usize;
        for pos in &desired {
            if !self.chunks.contains(*pos) {
                self.chunks.with_chunk_or_create(*pos, |_| ());
                loaded += 1;
            }
        }

        let streaming = &self.streaming;
        let evicted: HashSet<String> = self
            .chunks
            .evict_where(|chunk| {
                let pos = chunk.pos();
                !streaming.is_within_render(center, pos) && !streaming.is_within_world(pos)
            })
            .into_iter()
            .map(ChunkPos::key)
            .collect();

        if loaded > 0 || !evicted.is_empty() {
            debug!(
                "Streaming around chunk {}: loaded {}, evicted {}, resident {}",
                center,
                loaded,
                evicted.len(),
                self.chunks.len()
            );
        }
        evicted
    }

    /// Register a landmark.
    ///
    /// Several landmarks may share a type; [`World::get_landmark`] returns the
    /// most recently added one.
    pub fn add_landmark(&mut self, landmark: Landmark) {
        trace!(
            "Landmark {} at {} ({}x{}x{})",
            landmark.kind,
            landmark.origin,
            landmark.width,
            landmark.height,
            landmark.depth
        );
        self.landmarks.entry(landmark.kind).or_default().push(landmark);
    }

    /// The most recently registered landmark of a type.
    pub fn get_landmark(&self, kind: LandmarkType) -> Option<&Landmark> {
        self.landmarks.get(&kind).and_then(|all| all.last())
    }

    /// Every registered landmark of a type, in insertion order.
    pub fn landmarks(&self, kind: LandmarkType) -> &[Landmark] {
        self.landmarks.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every registered landmark, grouped by type in type order.
    pub fn all_landmarks(&self) -> Vec<&Landmark> {
        LandmarkType::all()
            .iter()
            .flat_map(|kind| self.landmarks(*kind))
            .collect()
    }

    pub fn landmark_count(&self) -> usize {
        self.landmarks.values().map(Vec::len).sum()
    }

    /// Drop every landmark.
    pub fn clear_landmarks(&mut self) {
        self.landmarks.clear();
    }

    /// Get total memory usage of all loaded chunks.
    pub fn memory_usage(&self) -> usize {
        self.chunks.memory_usage()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockAccess for World {
    #[inline]
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.get_block(x, y, z)
    }
}

/// Batched read access to a world, holding the chunk map read lock.
///
/// Writers block while a view is alive, so keep views short-lived.
pub struct BlockView<'a> {
    chunks: RwLockReadGuard<'a, hashbrown::HashMap<ChunkPos, Chunk>>,
}

impl BlockAccess for BlockView<'_> {
    #[inline]
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        let (chunk_pos, local) = WorldPos::new(x, y, z).split();
        self.chunks
            .get(&chunk_pos)
            .map_or(BlockType::AIR, |chunk| chunk.get_local(local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickfield_core::constants::CHUNK_SIZE;

    fn small_world(render_distance: i32) -> World {
        World::with_config(StreamingConfig {
            render_distance,
            world_chunk_radius: 4,
            min_chunk_y: -1,
            max_chunk_y: 1,
        })
        .unwrap()
    }

    #[test]
    fn fresh_world_reads_air() {
        let world = World::new();
        assert_eq!(world.get_block(0, 0, 0), BlockType::AIR);
        assert_eq!(world.get_block(-1000, 50, 77), BlockType::AIR);
        assert_eq!(world.loaded_chunk_count(), 0);
    }

    #[test]
    fn set_get_roundtrip() {
        let world = World::new();
        for (i, block) in BlockType::all().enumerate().skip(1) {
            let x = i as i32 * 7 - 100;
            world.set_block(x, -3, 9, block);
            assert_eq!(world.get_block(x, -3, 9), block);
        }
    }

    #[test]
    fn set_block_creates_chunk_lazily() {
        let world = World::new();
        assert!(!world.is_chunk_loaded(-1, 0, 2));
        world.set_block(-1, 0, 40, BlockType::BRICK);
        assert!(world.is_chunk_loaded(-1, 0, 2));
    }

    #[test]
    fn chunk_seam_blocks_are_independent() {
        let world = World::new();
        let seam = CHUNK_SIZE as i32;
        world.set_block(seam - 1, 5, 0, BlockType::STONE);
        world.set_block(seam, 5, 0, BlockType::GLASS);
        world.set_block(-1, 5, 0, BlockType::DIRT);
        world.set_block(0, 5, 0, BlockType::BRICK);

        assert_eq!(world.get_block(seam - 1, 5, 0), BlockType::STONE);
        assert_eq!(world.get_block(seam, 5, 0), BlockType::GLASS);
        assert_eq!(world.get_block(-1, 5, 0), BlockType::DIRT);
        assert_eq!(world.get_block(0, 5, 0), BlockType::BRICK);
        assert!(world.is_chunk_loaded(0, 0, 0));
        assert!(world.is_chunk_loaded(1, 0, 0));
        assert!(world.is_chunk_loaded(-1, 0, 0));
    }

    #[test]
    fn view_matches_direct_reads() {
        let world = World::new();
        world.set_block(3, -20, -7, BlockType::BEDROCK);
        let view = world.view();
        assert_eq!(view.block_at(3, -20, -7), BlockType::BEDROCK);
        assert!(view.is_solid(IVec3::new(3, -20, -7)));
        assert!(!view.is_solid(IVec3::new(3, -19, -7)));
    }

    #[test]
    fn first_update_loads_without_evicting() {
        let world = small_world(1);
        let evicted = world.update_loaded_chunks(Vec3::new(8.0, 8.0, 8.0));
        assert!(evicted.is_empty());
        assert_eq!(world.loaded_chunk_count(), 27);
        assert!(world.is_chunk_loaded(1, 1, 1));
        assert!(world.is_chunk_loaded(-1, -1, -1));
    }

    #[test]
    fn moving_away_keeps_empty_chunks_inside_world() {
        let world = small_world(1);
        world.update_loaded_chunks(Vec3::ZERO);
        let evicted = world.update_loaded_chunks(Vec3::new(16.0 * 3.0, 0.0, 0.0));

        assert!(evicted.is_empty());
        assert!(world.is_chunk_loaded(-1, 0, 0));
        assert!(world.is_chunk_loaded(1, -1, 1));
        assert!(world.is_chunk_loaded(4, 0, 0));
        assert!(!world.is_chunk_loaded(5, 0, 0));
    }

    #[test]
    fn evicted_keys_never_lie_inside_world() {
        let world = World::with_config(StreamingConfig {
            render_distance: 1,
            world_chunk_radius: 8,
            min_chunk_y: -1,
            max_chunk_y: 1,
        })
        .unwrap();
        world.update_loaded_chunks(Vec3::ZERO);
        world.set_block(16 * 12, 0, 0, BlockType::BRICK);
        let evicted = world.update_loaded_chunks(Vec3::new(48.0, 0.0, 0.0));

        assert_eq!(evicted.len(), 1);
        assert!(evicted.contains("12,0,0"));
        assert!(world.is_chunk_loaded(0, 0, 1));
    }

    #[test]
    fn generated_content_inside_world_survives_streaming() {
        let world = small_world(1);
        world.set_block(-20, 0, 0, BlockType::BRICK);
        world.update_loaded_chunks(Vec3::new(60.0, 0.0, 0.0));

        assert!(world.is_chunk_loaded(-2, 0, 0));
        assert_eq!(world.get_block(-20, 0, 0), BlockType::BRICK);
    }

    #[test]
    fn content_outside_world_is_evicted_when_far() {
        let world = small_world(1);
        world.set_block(16 * 10, 0, 0, BlockType::BRICK);
        let evicted = world.update_loaded_chunks(Vec3::ZERO);

        assert!(evicted.contains("10,0,0"));
        assert_eq!(world.get_block(16 * 10, 0, 0), BlockType::AIR);
    }

    #[test]
    fn content_outside_world_is_kept_while_in_render_range() {
        let world = small_world(2);
        world.set_block(16 * 5, 0, 0, BlockType::BRICK);
        let evicted = world.update_loaded_chunks(Vec3::new(16.0 * 4.0, 0.0, 0.0));

        assert!(evicted.is_empty());
        assert!(world.is_chunk_loaded(5, 0, 0));
    }

    #[test]
    fn landmark_registry() {
        let mut world = World::new();
        assert!(world.get_landmark(LandmarkType::Greggs).is_none());

        let first = Landmark::with_footprint(LandmarkType::TerracedHouse, WorldPos::new(0, 0, 0));
        let second = Landmark::with_footprint(LandmarkType::TerracedHouse, WorldPos::new(5, 0, 0));
        world.add_landmark(first);
        world.add_landmark(second);
        world.add_landmark(Landmark::with_footprint(LandmarkType::Pub, WorldPos::new(40, 0, 0)));

        assert_eq!(world.get_landmark(LandmarkType::TerracedHouse), Some(&second));
        assert_eq!(world.landmarks(LandmarkType::TerracedHouse), &[first, second]);
        assert!(world.landmarks(LandmarkType::Church).is_empty());
        assert_eq!(world.landmark_count(), 3);
        assert_eq!(world.all_landmarks().len(), 3);
    }

    #[test]
    fn player_edits() {
        let world = World::new();
        let pos = IVec3::new(2, 1, 2);
        assert!(world.place_block(pos, BlockType::BRICK));
        assert!(!world.place_block(pos, BlockType::GLASS));
        assert!(!world.place_block(IVec3::new(3, 1, 2), BlockType::BEDROCK));
        assert_eq!(world.remove_block(pos), Some(BlockType::BRICK));
        assert_eq!(world.remove_block(pos), None);

        world.set_block(0, -32, 0, BlockType::BEDROCK);
        assert_eq!(world.remove_block(IVec3::new(0, -32, 0)), None);
    }

    #[test]
    fn surface_height_finds_top_block() {
        let world = small_world(1);
        assert_eq!(world.surface_height(4, 4), None);
        world.set_block(4, -3, 4, BlockType::STONE);
        world.set_block(4, 7, 4, BlockType::GRASS);
        assert_eq!(world.surface_height(4, 4), Some(7));
    }
}
