//! Road surfaces along the street grid.

use brickfield_core::constants::CHUNK_SIZE;
use brickfield_core::BlockType;

use super::layout::LayoutConfig;
use super::terrain::TerrainGenerator;
use crate::streaming::StreamingConfig;
use crate::world::World;

/// Surface block for a column, if it lies on a street.
///
/// Road wins where a road crosses a pavement.
pub const fn street_surface(layout: &LayoutConfig, x: i32, z: i32) -> Option<BlockType> {
    if layout.is_road(x) || layout.is_road(z) {
        Some(BlockType::TARMAC)
    } else if layout.is_pavement(x) || layout.is_pavement(z) {
        Some(BlockType::PAVEMENT)
    } else {
        None
    }
}

/// Resurface every street column inside the world bound at its terrain height.
///
/// Returns the number of columns paved.
pub fn lay_streets(
    world: &World,
    layout: &LayoutConfig,
    terrain: &TerrainGenerator,
    streaming: &StreamingConfig,
) -> usize {
    let size = CHUNK_SIZE as i32;
    let min = -streaming.world_chunk_radius * size;
    let max = (streaming.world_chunk_radius + 1) * size;

    let mut paved = 0;
    for z in min..max {
        for x in min..max {
            if let Some(surface) = street_surface(layout, x, z) {
                world.set_block(x, terrain.height_at(x, z), z, surface);
                paved += 1;
            }
        }
    }
    paved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_is_tarmac() {
        let layout = LayoutConfig::default();
        assert_eq!(street_surface(&layout, 0, 0), Some(BlockType::TARMAC));
        assert_eq!(street_surface(&layout, 2, 10), Some(BlockType::PAVEMENT));
        assert_eq!(street_surface(&layout, 2, 1), Some(BlockType::TARMAC));
        assert_eq!(street_surface(&layout, 10, 10), None);
    }

    #[test]
    fn streets_follow_the_terrain() {
        let world = World::new();
        let layout = LayoutConfig::default();
        let terrain = TerrainGenerator::with_seed(3);
        let streaming = StreamingConfig {
            world_chunk_radius: 1,
            ..Default::default()
        };
        let paved = lay_streets(&world, &layout, &terrain, &streaming);
        assert!(paved > 0);

        for x in -16..32 {
            let h = terrain.height_at(x, 20);
            assert_eq!(world.get_block(x, h, 20), BlockType::TARMAC);
            let h = terrain.height_at(x, 10);
            let expected = if layout.is_road(x) {
                BlockType::TARMAC
            } else if layout.is_pavement(x) {
                BlockType::PAVEMENT
            } else {
                BlockType::AIR
            };
            assert_eq!(world.get_block(x, h, 10), expected);
        }
    }
}
