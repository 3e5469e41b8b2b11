//! Building shells, signs and interior furniture.

use brickfield_core::BlockType;

use super::layout::PlannedBuilding;
use crate::landmark::{Landmark, LandmarkCategory, LandmarkType};
use crate::world::World;

/// Height of one storey in multi-floor buildings.
const STOREY: i32 = 4;

/// Inclusive cell ranges of a building's shell and interior.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x0: i32,
    y0: i32,
    z0: i32,
    x1: i32,
    y1: i32,
    z1: i32,
    door_x: i32,
    ladder: Option<(i32, i32)>,
}

impl Frame {
    fn new(landmark: &Landmark) -> Self {
        let b = landmark.bounds();
        let max = b.max() - 1;
        let ladder = has_upper_floors(landmark).then_some((b.min.x + 1, max.z - 1));
        Self {
            x0: b.min.x,
            y0: b.min.y,
            z0: b.min.z,
            x1: max.x,
            y1: max.y,
            z1: max.z,
            door_x: landmark.door().x,
            ladder,
        }
    }

    const fn is_wall(&self, x: i32, z: i32) -> bool {
        x == self.x0 || x == self.x1 || z == self.z0 || z == self.z1
    }

    const fn is_corner(&self, x: i32, z: i32) -> bool {
        (x == self.x0 || x == self.x1) && (z == self.z0 || z == self.z1)
    }

    /// Window cells: every third cell along a wall, two rows per storey.
    const fn is_window(&self, x: i32, y: i32, z: i32) -> bool {
        if self.is_corner(x, z) || y >= self.y1 {
            return false;
        }
        let along = if z == self.z0 || z == self.z1 {
            x - self.x0
        } else {
            z - self.z0
        };
        let level = (y - self.y0) % STOREY;
        along % 3 == 1 && (level == 2 || level == 3)
    }

    /// Place furniture on the interior, keeping the entryway and ladder clear.
    fn furnish(&self, world: &World, x: i32, y: i32, z: i32, block: BlockType) {
        let inside = x > self.x0 && x < self.x1 && z > self.z0 && z < self.z1;
        let entryway = x == self.door_x && z <= self.z0 + 2;
        let ladder = self.ladder == Some((x, z));
        if inside && !entryway && !ladder {
            world.set_block(x, y, z, block);
        }
    }

    /// Ground floor Y of each storey.
    fn storeys(&self) -> impl Iterator<Item = i32> {
        let top = self.y1;
        (self.y0..top - 1).step_by(STOREY as usize)
    }
}

fn has_upper_floors(landmark: &Landmark) -> bool {
    matches!(
        landmark.kind,
        LandmarkType::OfficeBuilding | LandmarkType::TerracedHouse
    )
}

fn floor_material(kind: LandmarkType) -> BlockType {
    match kind {
        LandmarkType::TerracedHouse | LandmarkType::Pub | LandmarkType::Church => {
            BlockType::WOOD_PLANKS
        }
        _ => BlockType::CONCRETE,
    }
}

fn roof_material(kind: LandmarkType) -> BlockType {
    match kind {
        LandmarkType::OfficeBuilding | LandmarkType::Warehouse | LandmarkType::Supermarket => {
            BlockType::CONCRETE
        }
        _ => BlockType::SLATE_ROOF,
    }
}

/// Build one above-ground building into the world.
pub fn carve_building(world: &World, building: &PlannedBuilding) {
    let landmark = &building.landmark;
    let frame = Frame::new(landmark);
    let floor = floor_material(landmark.kind);
    let roof = roof_material(landmark.kind);

    for cell in landmark.bounds().cells() {
        let (x, y, z) = (cell.x, cell.y, cell.z);
        let block = if y == frame.y0 {
            floor
        } else if y == frame.y1 {
            roof
        } else if frame.is_wall(x, z) {
            if frame.is_window(x, y, z) {
                BlockType::GLASS
            } else {
                building.wall
            }
        } else {
            BlockType::AIR
        };
        world.set_block(x, y, z, block);
    }

    upper_floors(world, &frame, landmark.kind, floor);
    furniture(world, &frame, landmark.kind);

    for y in frame.y0 + 1..=frame.y0 + 2 {
        world.set_block(frame.door_x, y, frame.z0, BlockType::AIR);
        world.set_block(frame.door_x, y, frame.z0 + 1, BlockType::AIR);
    }

    if landmark.kind.category() != LandmarkCategory::Housing {
        let sign = landmark.kind.sign_block();
        for x in frame.door_x - 1..=frame.door_x + 1 {
            world.set_block(x, frame.y1 - 1, frame.z0, sign);
        }
    }
}

fn upper_floors(world: &World, frame: &Frame, kind: LandmarkType, floor: BlockType) {
    let Some((lx, lz)) = frame.ladder else {
        return;
    };
    let step = if kind == LandmarkType::TerracedHouse {
        3
    } else {
        STOREY
    };
    let mut level = frame.y0 + step;
    while level < frame.y1 - 1 {
        for z in frame.z0 + 1..frame.z1 {
            for x in frame.x0 + 1..frame.x1 {
                world.set_block(x, level, z, floor);
            }
        }
        level += step;
    }
    for y in frame.y0 + 1..frame.y1 {
        world.set_block(lx, y, lz, BlockType::LADDER);
    }
}

fn furniture(world: &World, f: &Frame, kind: LandmarkType) {
    let fy = f.y0 + 1;
    let (ix0, ix1, iz0, iz1) = (f.x0 + 1, f.x1 - 1, f.z0 + 1, f.z1 - 1);

    match kind {
        LandmarkType::OfficeBuilding => {
            for base in f.storeys() {
                for z in iz0..=iz1 {
                    for x in ix0..=ix1 {
                        if (x - f.x0) % 3 == 2 && (z - f.z0) % 3 == 2 {
                            f.furnish(world, x, base + 1, z, BlockType::DESK);
                        }
                    }
                }
            }
        }
        LandmarkType::Church => {
            for z in (iz0 + 2..=iz1 - 3).step_by(2) {
                for x in ix0..=ix1 {
                    if x != f.door_x {
                        f.furnish(world, x, fy, z, BlockType::PEW);
                    }
                }
            }
            f.furnish(world, f.door_x, fy, iz1, BlockType::ALTAR);
        }
        LandmarkType::Warehouse => {
            for x in (ix0 + 1..ix1).step_by(3) {
                for z in iz0 + 2..iz1 {
                    if x != f.door_x {
                        f.furnish(world, x, fy, z, BlockType::SHELF);
                        f.furnish(world, x, fy + 1, z, BlockType::SHELF);
                    }
                }
            }
        }
        LandmarkType::PoliceStation | LandmarkType::FireStation => {
            for x in ix0..=ix1 {
                if x != f.door_x {
                    f.furnish(world, x, fy, iz0 + 2, BlockType::COUNTER);
                }
            }
            for x in (ix0..=ix1).step_by(2) {
                f.furnish(world, x, fy, iz1 - 1, BlockType::DESK);
            }
        }
        LandmarkType::Supermarket => {
            for x in (ix0 + 1..ix1).step_by(3) {
                f.furnish(world, x, fy, iz0 + 2, BlockType::COUNTER);
            }
            for x in (ix0 + 1..ix1).step_by(2) {
                if x == f.door_x {
                    continue;
                }
                for z in iz0 + 4..iz1 {
                    f.furnish(world, x, fy, z, BlockType::SHELF);
                }
            }
        }
        LandmarkType::CommunityCentre => {
            for z in iz0..=iz1 {
                for x in ix0..=ix1 {
                    if (x - f.x0) % 3 == 2 && (z - f.z0) % 3 == 2 {
                        f.furnish(world, x, fy, z, BlockType::TABLE);
                    }
                }
            }
        }
        LandmarkType::Pub => {
            for x in ix0 + 1..ix1 {
                f.furnish(world, x, fy, iz1 - 1, BlockType::COUNTER);
            }
            for z in iz0..iz1 - 2 {
                for x in ix0..=ix1 {
                    if (x - f.x0) % 3 == 2 && (z - f.z0) % 3 == 2 {
                        f.furnish(world, x, fy, z, BlockType::TABLE);
                    }
                }
            }
        }
        LandmarkType::Library => {
            for z in (iz0 + 2..=iz1).step_by(3) {
                for x in ix0 + 1..ix1 {
                    if x != f.door_x {
                        f.furnish(world, x, fy, z, BlockType::SHELF);
                    }
                }
            }
        }
        LandmarkType::PrimarySchool | LandmarkType::JobCentre => {
            for z in (iz0 + 2..iz1).step_by(2) {
                for x in (ix0..=ix1).step_by(2) {
                    f.furnish(world, x, fy, z, BlockType::DESK);
                }
            }
            f.furnish(world, f.door_x, fy, iz1, BlockType::TABLE);
        }
        LandmarkType::TerracedHouse => {
            f.furnish(world, ix1, fy, (iz0 + iz1) / 2, BlockType::TABLE);
        }
        LandmarkType::Greggs
        | LandmarkType::CornerShop
        | LandmarkType::OffLicence
        | LandmarkType::Chippy
        | LandmarkType::Bookies
        | LandmarkType::CharityShop
        | LandmarkType::Launderette => {
            for x in ix0..ix1 {
                f.furnish(world, x, fy, iz1 - 1, BlockType::COUNTER);
            }
            for z in iz0 + 1..iz1 - 2 {
                f.furnish(world, ix0, fy, z, BlockType::SHELF);
            }
        }
        LandmarkType::Park | LandmarkType::Bunker => {}
    }
}
