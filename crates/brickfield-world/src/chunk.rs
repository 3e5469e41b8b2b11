//! Chunk data structure for block world storage.

use brickfield_core::constants::{CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME};
use brickfield_core::coords::{ChunkPos, LocalPos};
use brickfield_core::BlockType;

/// A single chunk of block data (16x16x16 blocks).
///
/// Storage is a dense array indexed by [`LocalPos::to_index`]. All accessors
/// take chunk-relative coordinates; reads outside the chunk return air and
/// writes outside the chunk are ignored.
#[derive(Clone)]
pub struct Chunk {
    pos: ChunkPos,
    blocks: Box<[BlockType; CHUNK_VOLUME]>,
    block_count: usize,
}

impl Chunk {
    /// Create a new all-air chunk at the given position.
    pub fn new(pos: ChunkPos) -> Self {
        Self {
            pos,
            blocks: Box::new([BlockType::AIR; CHUNK_VOLUME]),
            block_count: 0,
        }
    }

    /// Position in chunk coordinates.
    #[inline]
    pub const fn pos(&self) -> ChunkPos {
        self.pos
    }

    /// Read a block at local coordinates.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockType {
        LocalPos::checked(x, y, z).map_or(BlockType::AIR, |local| self.get_local(local))
    }

    /// Write a block at local coordinates. Out-of-range writes are a no-op.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: BlockType) {
        if let Some(local) = LocalPos::checked(x, y, z) {
            self.set_local(local, block);
        }
    }

    #[inline]
    pub fn get_local(&self, local: LocalPos) -> BlockType {
        self.blocks[local.to_index()]
    }

    pub fn set_local(&mut self, local: LocalPos, block: BlockType) {
        let slot = &mut self.blocks[local.to_index()];
        match (slot.is_air(), block.is_air()) {
            (true, false) => self.block_count += 1,
            (false, true) => self.block_count -= 1,
            _ => {}
        }
        *slot = block;
    }

    /// Fill the whole chunk with one block type.
    pub fn fill(&mut self, block: BlockType) {
        self.blocks.fill(block);
        self.block_count = if block.is_air() { 0 } else { CHUNK_VOLUME };
    }

    /// Check if this chunk is empty (all air).
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.block_count == 0
    }

    /// Number of non-air blocks.
    #[inline]
    pub const fn block_count(&self) -> usize {
        self.block_count
    }

    /// Iterate over all non-air blocks with their local positions.
    pub fn iter_blocks(&self) -> impl Iterator<Item = (LocalPos, BlockType)> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.is_air())
            .map(|(i, b)| (LocalPos::from_index(i), *b))
    }

    /// Get memory usage in bytes.
    pub const fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + CHUNK_VOLUME * std::mem::size_of::<BlockType>()
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("pos", &self.pos)
            .field("block_count", &self.block_count)
            .field("dims", &(CHUNK_SIZE, CHUNK_HEIGHT, CHUNK_SIZE))
            .finish_non_exhaustive()
    }
}
