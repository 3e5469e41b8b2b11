//! The fenced park at the centre of town.

use brickfield_core::BlockType;
use glam::IVec3;

use crate::landmark::Landmark;
use crate::world::World;

/// Fence rises this many blocks above the park floor.
pub const FENCE_HEIGHT: i32 = 2;
/// Width of the opening in the middle of each fence side.
pub const ENTRY_GAP: i32 = 3;

/// Centre cells of the four entry gaps, at standing height: south, north,
/// west, east.
pub fn entry_gaps(park: &Landmark) -> [IVec3; 4] {
    let b = park.bounds();
    let max = b.max() - 1;
    let y = b.min.y + 1;
    let mid_x = b.min.x + park.width / 2;
    let mid_z = b.min.z + park.depth / 2;
    [
        IVec3::new(mid_x, y, b.min.z),
        IVec3::new(mid_x, y, max.z),
        IVec3::new(b.min.x, y, mid_z),
        IVec3::new(max.x, y, mid_z),
    ]
}

fn in_gap(offset: i32, length: i32) -> bool {
    let mid = length / 2;
    (offset - mid).abs() <= ENTRY_GAP / 2
}

/// Fence the park perimeter, leaving an entry gap centred on each side.
///
/// Returns the number of fence blocks placed.
pub fn fence_park(world: &World, park: &Landmark) -> usize {
    let b = park.bounds();
    let max = b.max() - 1;
    let mut placed = 0;

    for z in b.min.z..=max.z {
        for x in b.min.x..=max.x {
            let on_x_side = z == b.min.z || z == max.z;
            let on_z_side = x == b.min.x || x == max.x;
            if !on_x_side && !on_z_side {
                continue;
            }
            let gap = (on_x_side && in_gap(x - b.min.x, park.width))
                || (on_z_side && in_gap(z - b.min.z, park.depth));
            let corner = on_x_side && on_z_side;
            if gap && !corner {
                continue;
            }
            for y in b.min.y + 1..=b.min.y + FENCE_HEIGHT {
                world.set_block(x, y, z, BlockType::IRON_FENCE);
                placed += 1;
            }
        }
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::LandmarkType;
    use brickfield_core::coords::WorldPos;

    fn park() -> Landmark {
        Landmark::with_footprint(LandmarkType::Park, WorldPos::new(3, 0, 3))
    }

    #[test]
    fn fence_has_four_gaps() {
        let world = World::new();
        let park = park();
        let placed = fence_park(&world, &park);

        // 56 perimeter cells minus 4 gaps of 3, two blocks high
        assert_eq!(placed, (56 - 12) * FENCE_HEIGHT as usize);

        for gap in entry_gaps(&park) {
            for y in 1..=FENCE_HEIGHT {
                assert!(world.get_block(gap.x, y, gap.z).is_air());
            }
        }
        assert_eq!(world.get_block(3, 1, 3), BlockType::IRON_FENCE);
        assert_eq!(world.get_block(3, 2, 3), BlockType::IRON_FENCE);
        assert!(world.get_block(3, 3, 3).is_air());
    }

    #[test]
    fn gap_is_centred() {
        let world = World::new();
        let park = park();
        fence_park(&world, &park);
        let south = entry_gaps(&park)[0];
        assert_eq!(south, IVec3::new(10, 1, 3));
        assert!(world.get_block(9, 1, 3).is_air());
        assert!(world.get_block(11, 1, 3).is_air());
        assert_eq!(world.get_block(8, 1, 3), BlockType::IRON_FENCE);
        assert_eq!(world.get_block(12, 1, 3), BlockType::IRON_FENCE);
    }
}
