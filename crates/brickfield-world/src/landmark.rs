//! Named buildings and the records generation leaves for NPC spawning.

use brickfield_core::coords::WorldPos;
use brickfield_core::{BlockBox, BlockType};
use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Broad grouping of landmark types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandmarkCategory {
    Open,
    Shop,
    Civic,
    Housing,
    Underground,
}

/// Every kind of landmark the town generator can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LandmarkType {
    Park,
    Greggs,
    CornerShop,
    OffLicence,
    Chippy,
    Bookies,
    CharityShop,
    Launderette,
    JobCentre,
    Pub,
    Supermarket,
    OfficeBuilding,
    Church,
    PoliceStation,
    FireStation,
    PrimarySchool,
    Warehouse,
    CommunityCentre,
    Library,
    TerracedHouse,
    Bunker,
}

impl LandmarkType {
    const ALL: [Self; 21] = [
        Self::Park,
        Self::Greggs,
        Self::CornerShop,
        Self::OffLicence,
        Self::Chippy,
        Self::Bookies,
        Self::CharityShop,
        Self::Launderette,
        Self::JobCentre,
        Self::Pub,
        Self::Supermarket,
        Self::OfficeBuilding,
        Self::Church,
        Self::PoliceStation,
        Self::FireStation,
        Self::PrimarySchool,
        Self::Warehouse,
        Self::CommunityCentre,
        Self::Library,
        Self::TerracedHouse,
        Self::Bunker,
    ];

    pub const fn all() -> &'static [Self] {
        &Self::ALL
    }

    pub const fn category(self) -> LandmarkCategory {
        match self {
            Self::Park => LandmarkCategory::Open,
            Self::Greggs
            | Self::CornerShop
            | Self::OffLicence
            | Self::Chippy
            | Self::Bookies
            | Self::CharityShop
            | Self::Launderette
            | Self::Pub
            | Self::Supermarket => LandmarkCategory::Shop,
            Self::JobCentre
            | Self::OfficeBuilding
            | Self::Church
            | Self::PoliceStation
            | Self::FireStation
            | Self::PrimarySchool
            | Self::Warehouse
            | Self::CommunityCentre
            | Self::Library => LandmarkCategory::Civic,
            Self::TerracedHouse => LandmarkCategory::Housing,
            Self::Bunker => LandmarkCategory::Underground,
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Park => "Park",
            Self::Greggs => "Greggs",
            Self::CornerShop => "Corner Shop",
            Self::OffLicence => "Off-Licence",
            Self::Chippy => "Chippy",
            Self::Bookies => "Bookies",
            Self::CharityShop => "Charity Shop",
            Self::Launderette => "Launderette",
            Self::JobCentre => "Job Centre",
            Self::Pub => "The Red Lion",
            Self::Supermarket => "Supermarket",
            Self::OfficeBuilding => "Office Building",
            Self::Church => "St. Mary's Church",
            Self::PoliceStation => "Police Station",
            Self::FireStation => "Fire Station",
            Self::PrimarySchool => "Primary School",
            Self::Warehouse => "Warehouse",
            Self::CommunityCentre => "Community Centre",
            Self::Library => "Library",
            Self::TerracedHouse => "Terraced House",
            Self::Bunker => "Bunker",
        }
    }

    /// Whether the building is staffed and so gets an NPC spawn point.
    pub const fn needs_staff(self) -> bool {
        matches!(
            self.category(),
            LandmarkCategory::Shop | LandmarkCategory::Civic
        )
    }

    pub const fn is_underground(self) -> bool {
        matches!(self, Self::Bunker)
    }

    /// Nominal `(width, height, depth)` of one instance.
    pub const fn footprint(self) -> (i32, i32, i32) {
        match self {
            Self::Park => (15, 3, 15),
            Self::Greggs | Self::CharityShop => (7, 5, 6),
            Self::CornerShop | Self::OffLicence | Self::Bookies => (6, 5, 6),
            Self::Chippy | Self::Launderette => (6, 5, 7),
            Self::JobCentre => (9, 6, 8),
            Self::Pub => (10, 7, 9),
            Self::Supermarket => (13, 7, 13),
            Self::OfficeBuilding => (10, 17, 10),
            Self::Church => (9, 12, 13),
            Self::PoliceStation => (11, 8, 10),
            Self::FireStation => (12, 8, 11),
            Self::PrimarySchool => (13, 7, 12),
            Self::Warehouse => (13, 9, 13),
            Self::CommunityCentre => (11, 6, 10),
            Self::Library => (10, 7, 9),
            Self::TerracedHouse => (5, 7, 8),
            Self::Bunker => (11, 7, 11),
        }
    }

    /// Colour of the shop sign above the door.
    pub const fn sign_block(self) -> BlockType {
        match self {
            Self::Greggs | Self::FireStation | Self::PoliceStation | Self::Pub => {
                BlockType::SIGN_BLUE
            }
            Self::CornerShop | Self::Library | Self::CommunityCentre => BlockType::SIGN_GREEN,
            Self::OffLicence | Self::Chippy => BlockType::SIGN_RED,
            Self::Bookies | Self::JobCentre | Self::Supermarket => BlockType::SIGN_ORANGE,
            Self::CharityShop | Self::Launderette | Self::PrimarySchool => BlockType::SIGN_YELLOW,
            _ => BlockType::SIGN_WHITE,
        }
    }
}

impl std::fmt::Display for LandmarkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A placed building or structure with an axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Landmark {
    pub kind: LandmarkType,
    /// Minimum corner in world coordinates.
    pub origin: WorldPos,
    pub width: i32,
    pub height: i32,
    pub depth: i32,
}

impl Landmark {
    pub const fn new(kind: LandmarkType, origin: WorldPos, width: i32, height: i32, depth: i32) -> Self {
        Self {
            kind,
            origin,
            width,
            height,
            depth,
        }
    }

    /// Landmark of nominal size for its type.
    pub const fn with_footprint(kind: LandmarkType, origin: WorldPos) -> Self {
        let (w, h, d) = kind.footprint();
        Self::new(kind, origin, w, h, d)
    }

    pub fn bounds(&self) -> BlockBox {
        BlockBox::new(
            self.origin.to_ivec3(),
            IVec3::new(self.width, self.height, self.depth),
        )
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.bounds().intersects(&other.bounds())
    }

    pub fn contains(&self, pos: WorldPos) -> bool {
        self.bounds().contains(pos.to_ivec3())
    }

    /// Cell at the centre of the ground floor.
    pub const fn centre(&self) -> WorldPos {
        WorldPos::new(
            self.origin.x + self.width / 2,
            self.origin.y + 1,
            self.origin.z + self.depth / 2,
        )
    }

    /// Doorway cell in the middle of the front (minimum-Z) wall.
    pub const fn door(&self) -> WorldPos {
        WorldPos::new(self.origin.x + self.width / 2, self.origin.y + 1, self.origin.z)
    }

    /// Floor cell just inside the door.
    pub const fn entrance(&self) -> WorldPos {
        WorldPos::new(self.origin.x + self.width / 2, self.origin.y + 1, self.origin.z + 1)
    }
}

/// Ground footprint reserved for a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingPlot {
    pub kind: LandmarkType,
    pub x: i32,
    pub z: i32,
    pub width: i32,
    pub depth: i32,
    pub underground: bool,
}

impl From<&Landmark> for BuildingPlot {
    fn from(landmark: &Landmark) -> Self {
        Self {
            kind: landmark.kind,
            x: landmark.origin.x,
            z: landmark.origin.z,
            width: landmark.width,
            depth: landmark.depth,
            underground: landmark.kind.is_underground(),
        }
    }
}

/// Where staff or visitors for a landmark appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcSpawnPoint {
    pub kind: LandmarkType,
    pub position: WorldPos,
}
