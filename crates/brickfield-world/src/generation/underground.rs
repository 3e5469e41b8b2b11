//! Strata, sewer tunnels and the bunker beneath the park.

use brickfield_core::constants::{BEDROCK_DEPTH, GROUND_LEVEL, SEWER_CEILING, SEWER_FLOOR};
use brickfield_core::BlockType;
use glam::IVec3;

use crate::landmark::Landmark;
use crate::world::World;

/// Block for one cell of a column with surface height `surface`.
///
/// `under_road` marks columns beneath a street, where the sewer tunnel runs.
pub fn column_block(y: i32, surface: i32, under_road: bool, dirt_depth: i32) -> BlockType {
    if y < BEDROCK_DEPTH {
        BlockType::AIR
    } else if y == BEDROCK_DEPTH {
        BlockType::BEDROCK
    } else if y > surface {
        BlockType::AIR
    } else if under_road && y > SEWER_FLOOR && y <= SEWER_CEILING {
        BlockType::AIR
    } else if under_road && y == SEWER_FLOOR {
        BlockType::CONCRETE
    } else if y == surface {
        BlockType::GRASS
    } else if y > surface - dirt_depth {
        BlockType::DIRT
    } else {
        BlockType::STONE
    }
}

/// Columns of the access shafts for a bunker.
pub fn shaft_columns(bunker: &Landmark) -> [(i32, i32); 2] {
    let b = bunker.bounds();
    let max = b.max();
    [(b.min.x + 1, b.min.z + 1), (max.x - 2, max.z - 2)]
}

/// Carve the bunker: a concrete shell with a hollow interior, and ladder
/// shafts from its floor up through the roof to a hatch at ground level.
///
/// Returns the ground-level hatch cells.
pub fn carve_bunker(world: &World, bunker: &Landmark) -> Vec<IVec3> {
    let b = bunker.bounds();
    let max = b.max();

    for cell in b.cells() {
        let shell = cell.x == b.min.x
            || cell.x == max.x - 1
            || cell.y == b.min.y
            || cell.y == max.y - 1
            || cell.z == b.min.z
            || cell.z == max.z - 1;
        let block = if shell { BlockType::CONCRETE } else { BlockType::AIR };
        world.set_block(cell.x, cell.y, cell.z, block);
    }

    // Stores along the back wall.
    for x in b.min.x + 2..max.x - 2 {
        if x % 2 == 0 {
            world.set_block(x, b.min.y + 1, max.z - 2, BlockType::SHELF);
        }
    }

    let mut hatches = Vec::new();
    for (x, z) in shaft_columns(bunker) {
        for y in b.min.y + 1..GROUND_LEVEL {
            world.set_block(x, y, z, BlockType::LADDER);
        }
        world.set_block(x, GROUND_LEVEL, z, BlockType::AIR);
        hatches.push(IVec3::new(x, GROUND_LEVEL, z));
    }
    hatches
}
