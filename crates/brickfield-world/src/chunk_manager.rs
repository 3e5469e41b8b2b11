//! Chunk manager with spatial indexing.

use brickfield_core::coords::ChunkPos;
use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard};

use crate::chunk::Chunk;

/// Owns every loaded chunk, keyed by chunk position.
///
/// Provides thread-safe access to chunks via `RwLock`: any number of block
/// readers may run alongside each other, while edits and load/unload take the
/// write lock and are serialized against them.
pub struct ChunkManager {
    chunks: RwLock<HashMap<ChunkPos, Chunk>>,
}

impl ChunkManager {
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
        }
    }

    /// Check if a chunk exists at the given position.
    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.read().contains_key(&pos)
    }

    /// Get the number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    /// Check if no chunks are loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }

    /// Insert or replace a chunk at its own position.
    pub fn insert(&self, chunk: Chunk) -> Option<Chunk> {
        self.chunks.write().insert(chunk.pos(), chunk)
    }

    /// Insert many chunks under a single write lock.
    pub fn insert_all(&self, chunks: impl IntoIterator<Item = Chunk>) {
        let mut map = self.chunks.write();
        for chunk in chunks {
            map.insert(chunk.pos(), chunk);
        }
    }

    /// Remove a chunk at the given position.
    pub fn remove(&self, pos: ChunkPos) -> Option<Chunk> {
        self.chunks.write().remove(&pos)
    }

    /// Drop every chunk.
    pub fn clear(&self) {
        self.chunks.write().clear();
    }

    /// Get all loaded chunk positions.
    pub fn positions(&self) -> Vec<ChunkPos> {
        self.chunks.read().keys().copied().collect()
    }

    /// Execute a function with read access to a chunk.
    ///
    /// Returns `None` if the chunk doesn't exist.
    pub fn with_chunk<F, R>(&self, pos: ChunkPos, f: F) -> Option<R>
    where
        F: FnOnce(&Chunk) -> R,
    {
        self.chunks.read().get(&pos).map(f)
    }

    /// Execute a function with write access to a chunk.
    ///
    /// Returns `None` if the chunk doesn't exist.
    pub fn with_chunk_mut<F, R>(&self, pos: ChunkPos, f: F) -> Option<R>
    where
        F: FnOnce(&mut Chunk) -> R,
    {
        self.chunks.write().get_mut(&pos).map(f)
    }

    /// Execute a function with write access to a chunk, creating an empty
    /// chunk first if none is loaded.
    pub fn with_chunk_or_create<F, R>(&self, pos: ChunkPos, f: F) -> R
    where
        F: FnOnce(&mut Chunk) -> R,
    {
        let mut chunks = self.chunks.write();
        f(chunks.entry(pos).or_insert_with(|| Chunk::new(pos)))
    }

    /// Hold the read lock for a batch of lookups.
    pub fn read(&self) -> RwLockReadGuard<'_, HashMap<ChunkPos, Chunk>> {
        self.chunks.read()
    }

    /// Remove every chunk for which `evict` returns true, under one write lock.
    ///
    /// Returns the positions of removed chunks.
    pub fn evict_where<F>(&self, mut evict: F) -> Vec<ChunkPos>
    where
        F: FnMut(&Chunk) -> bool,
    {
        let mut chunks = self.chunks.write();
        let doomed: Vec<ChunkPos> = chunks
            .iter()
            .filter(|(_, chunk)| evict(chunk))
            .map(|(pos, _)| *pos)
            .collect();
        for pos in &doomed {
            chunks.remove(pos);
        }
        doomed
    }

    /// Get total memory usage of all chunks.
    pub fn memory_usage(&self) -> usize {
        self.chunks.read().values().map(Chunk::memory_usage).sum()
    }
}

impl Default for ChunkManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickfield_core::BlockType;

    #[test]
    fn insert_and_retrieve() {
        let manager = ChunkManager::new();
        let pos = ChunkPos::new(1, 2, 3);
        manager.insert(Chunk::new(pos));

        assert!(manager.contains(pos));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn remove_chunk() {
        let manager = ChunkManager::new();
        let pos = ChunkPos::new(1, 2, 3);
        manager.insert(Chunk::new(pos));
        let removed = manager.remove(pos);

        assert!(removed.is_some());
        assert!(!manager.contains(pos));
        assert!(manager.is_empty());
    }

    #[test]
    fn with_chunk_access() {
        let manager = ChunkManager::new();
        let pos = ChunkPos::new(0, 0, 0);
        assert!(manager.with_chunk(pos, Chunk::is_empty).is_none());

        manager.with_chunk_or_create(pos, |c| c.set(1, 2, 3, BlockType::STONE));
        assert_eq!(manager.with_chunk(pos, |c| c.get(1, 2, 3)), Some(BlockType::STONE));

        manager.with_chunk_mut(pos, |c| c.set(1, 2, 3, BlockType::AIR));
        assert_eq!(manager.with_chunk(pos, Chunk::is_empty), Some(true));
    }

    #[test]
    fn evict_where_returns_removed_positions() {
        let manager = ChunkManager::new();
        for x in -2..=2 {
            manager.insert(Chunk::new(ChunkPos::new(x, 0, 0)));
        }
        let mut evicted = manager.evict_where(|c| c.pos().x < 0);
        evicted.sort_by_key(|p| p.x);

        assert_eq!(evicted, vec![ChunkPos::new(-2, 0, 0), ChunkPos::new(-1, 0, 0)]);
        assert_eq!(manager.len(), 3);
    }

    #[test]
    fn insert_all_batches() {
        let manager = ChunkManager::new();
        manager.insert_all((0..4).map(|z| Chunk::new(ChunkPos::new(0, 0, z))));
        assert_eq!(manager.len(), 4);
        manager.clear();
        assert!(manager.is_empty());
    }
}
