//! The static block table.
//!
//! Every block kind is a small integer id indexing a fixed table of
//! [`BlockProps`] records. The table is defined once at compile time and never
//! mutated, so attribute lookup is a single array index.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// RGB colour, 0-255 per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Colour as normalized floats, for mesh builders.
    #[inline]
    pub fn to_f32(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

/// Geometric shape of a block.
///
/// Mesh builders match over this to decide which geometry to emit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockShape {
    /// Full unit cube.
    #[default]
    FullCube,
    /// Lower half of a cube.
    HalfSlab,
    /// Two stacked boxes forming a single stair step.
    StairStep,
    /// Flat rungs against one face.
    LadderRungs,
    /// Thin vertical post with rails.
    FencePost,
    /// Thin vertical plate, as for signs.
    Pane,
}

impl BlockShape {
    /// Number of quads a mesh builder emits for an unculled block of this shape.
    ///
    /// Cube, slab and pane are all single boxes with six quads; they differ
    /// in [`BlockShape::extent`].
    pub const fn face_count(self) -> u32 {
        match self {
            Self::FullCube | Self::HalfSlab | Self::Pane => 6,
            Self::StairStep => 10,
            Self::LadderRungs => 2,
            Self::FencePost => 14,
        }
    }

    /// Size of the shape's bounding box within its cell.
    pub const fn extent(self) -> Vec3 {
        match self {
            Self::FullCube | Self::StairStep => Vec3::ONE,
            Self::HalfSlab => Vec3::new(1.0, 0.5, 1.0),
            Self::LadderRungs => Vec3::new(1.0, 1.0, 0.125),
            Self::FencePost => Vec3::new(1.0, 1.5, 1.0),
            Self::Pane => Vec3::new(1.0, 1.0, 0.0625),
        }
    }

    /// Whether the shape fills the whole cell.
    pub const fn is_full(self) -> bool {
        matches!(self, Self::FullCube)
    }
}

/// Static attributes of a block kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockProps {
    pub name: &'static str,
    /// Blocks movement and rays.
    pub solid: bool,
    /// Hides the faces of neighbouring blocks.
    pub opaque: bool,
    /// Rendered with alpha blending.
    pub transparent: bool,
    pub shape: BlockShape,
    pub player_placeable: bool,
    pub color: Color,
    pub top_color: Color,
}

impl BlockProps {
    const fn cube(name: &'static str, color: Color, top_color: Color, placeable: bool) -> Self {
        Self {
            name,
            solid: true,
            opaque: true,
            transparent: false,
            shape: BlockShape::FullCube,
            player_placeable: placeable,
            color,
            top_color,
        }
    }

    const fn furniture(name: &'static str, shape: BlockShape, color: Color) -> Self {
        Self {
            name,
            solid: true,
            opaque: false,
            transparent: false,
            shape,
            player_placeable: true,
            color,
            top_color: color,
        }
    }

    const fn sign(name: &'static str, color: Color) -> Self {
        Self {
            name,
            solid: true,
            opaque: false,
            transparent: false,
            shape: BlockShape::Pane,
            player_placeable: false,
            color,
            top_color: color,
        }
    }
}

/// Identifier of a block kind, indexing the static block table.
///
/// Block id 0 is reserved for air.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable, Serialize,
    Deserialize,
)]
#[repr(transparent)]
pub struct BlockType(pub u8);

impl BlockType {
    pub const AIR: Self = Self(0);
    pub const GRASS: Self = Self(1);
    pub const DIRT: Self = Self(2);
    pub const STONE: Self = Self(3);
    pub const BEDROCK: Self = Self(4);
    pub const CONCRETE: Self = Self(5);
    pub const TARMAC: Self = Self(6);
    pub const PAVEMENT: Self = Self(7);
    pub const BRICK: Self = Self(8);
    pub const YELLOW_BRICK: Self = Self(9);
    pub const PEBBLEDASH: Self = Self(10);
    pub const RENDER: Self = Self(11);
    pub const GLASS: Self = Self(12);
    pub const SLATE_ROOF: Self = Self(13);
    pub const WOOD_PLANKS: Self = Self(14);
    pub const IRON_FENCE: Self = Self(15);
    pub const LADDER: Self = Self(16);
    pub const TABLE: Self = Self(17);
    pub const COUNTER: Self = Self(18);
    pub const SHELF: Self = Self(19);
    pub const DESK: Self = Self(20);
    pub const PEW: Self = Self(21);
    pub const ALTAR: Self = Self(22);
    pub const SIGN_RED: Self = Self(23);
    pub const SIGN_BLUE: Self = Self(24);
    pub const SIGN_GREEN: Self = Self(25);
    pub const SIGN_YELLOW: Self = Self(26);
    pub const SIGN_WHITE: Self = Self(27);
    pub const SIGN_ORANGE: Self = Self(28);
    pub const STEP: Self = Self(29);
    pub const SLAB: Self = Self(30);

    /// Number of entries in the block table.
    pub const COUNT: usize = 31;

    /// Look up a block type by id, failing for ids outside the table.
    pub fn try_from_id(id: u8) -> Result<Self> {
        if (id as usize) < Self::COUNT {
            Ok(Self(id))
        } else {
            Err(Error::UnknownBlock(id))
        }
    }

    /// Iterate over every block type in id order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    /// Static attributes of this block.
    ///
    /// Ids outside the table resolve to air.
    #[inline]
    pub fn props(self) -> &'static BlockProps {
        BLOCK_TABLE.get(self.0 as usize).unwrap_or(&BLOCK_TABLE[0])
    }

    #[inline]
    pub const fn id(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.props().name
    }

    #[inline]
    pub const fn is_air(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_solid(self) -> bool {
        self.props().solid
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.props().opaque
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.props().transparent
    }

    #[inline]
    pub fn is_player_placeable(self) -> bool {
        self.props().player_placeable
    }

    #[inline]
    pub fn shape(self) -> BlockShape {
        self.props().shape
    }

    #[inline]
    pub fn color(self) -> Color {
        self.props().color
    }

    #[inline]
    pub fn top_color(self) -> Color {
        self.props().top_color
    }

    /// Whether an NPC can climb through this cell vertically.
    #[inline]
    pub fn is_climbable(self) -> bool {
        self == Self::LADDER
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a face of `block` bordering `neighbour` should be meshed.
///
/// Air has no faces. Any other block shows a face unless the neighbour is
/// opaque; glass next to glass is culled so panes read as one surface.
pub fn face_visible(block: BlockType, neighbour: BlockType) -> bool {
    if block.is_air() || neighbour.is_opaque() {
        return false;
    }
    !(block.is_transparent() && block == neighbour)
}

static BLOCK_TABLE: [BlockProps; BlockType::COUNT] = [
    BlockProps {
        name: "air",
        solid: false,
        opaque: false,
        transparent: true,
        shape: BlockShape::FullCube,
        player_placeable: false,
        color: Color::rgb(0, 0, 0),
        top_color: Color::rgb(0, 0, 0),
    },
    BlockProps::cube("grass", Color::rgb(121, 85, 58), Color::rgb(86, 125, 70), true),
    BlockProps::cube("dirt", Color::rgb(139, 90, 43), Color::rgb(139, 90, 43), true),
    BlockProps::cube("stone", Color::rgb(128, 128, 128), Color::rgb(128, 128, 128), true),
    BlockProps::cube("bedrock", Color::rgb(40, 40, 44), Color::rgb(40, 40, 44), false),
    BlockProps::cube("concrete", Color::rgb(170, 170, 165), Color::rgb(170, 170, 165), true),
    BlockProps::cube("tarmac", Color::rgb(52, 52, 56), Color::rgb(60, 60, 64), false),
    BlockProps::cube("pavement", Color::rgb(150, 148, 140), Color::rgb(182, 180, 172), true),
    BlockProps::cube("brick", Color::rgb(156, 74, 54), Color::rgb(156, 74, 54), true),
    BlockProps::cube("yellow_brick", Color::rgb(205, 178, 112), Color::rgb(205, 178, 112), true),
    BlockProps::cube("pebbledash", Color::rgb(196, 190, 176), Color::rgb(196, 190, 176), true),
    BlockProps::cube("render", Color::rgb(232, 226, 212), Color::rgb(232, 226, 212), true),
    BlockProps {
        name: "glass",
        solid: true,
        opaque: false,
        transparent: true,
        shape: BlockShape::FullCube,
        player_placeable: true,
        color: Color::rgb(190, 220, 235),
        top_color: Color::rgb(190, 220, 235),
    },
    BlockProps::cube("slate_roof", Color::rgb(70, 74, 86), Color::rgb(62, 66, 78), true),
    BlockProps::cube("wood_planks", Color::rgb(160, 120, 74), Color::rgb(160, 120, 74), true),
    BlockProps {
        name: "iron_fence",
        solid: true,
        opaque: false,
        transparent: true,
        shape: BlockShape::FencePost,
        player_placeable: true,
        color: Color::rgb(36, 40, 36),
        top_color: Color::rgb(36, 40, 36),
    },
    BlockProps {
        name: "ladder",
        solid: false,
        opaque: false,
        transparent: true,
        shape: BlockShape::LadderRungs,
        player_placeable: true,
        color: Color::rgb(120, 88, 52),
        top_color: Color::rgb(120, 88, 52),
    },
    BlockProps::furniture("table", BlockShape::HalfSlab, Color::rgb(133, 94, 60)),
    BlockProps::furniture("counter", BlockShape::FullCube, Color::rgb(110, 80, 60)),
    BlockProps::furniture("shelf", BlockShape::FullCube, Color::rgb(150, 110, 70)),
    BlockProps::furniture("desk", BlockShape::HalfSlab, Color::rgb(96, 70, 48)),
    BlockProps::furniture("pew", BlockShape::StairStep, Color::rgb(92, 60, 36)),
    BlockProps::furniture("altar", BlockShape::FullCube, Color::rgb(225, 220, 200)),
    BlockProps::sign("sign_red", Color::rgb(200, 30, 36)),
    BlockProps::sign("sign_blue", Color::rgb(30, 70, 170)),
    BlockProps::sign("sign_green", Color::rgb(30, 130, 60)),
    BlockProps::sign("sign_yellow", Color::rgb(240, 200, 40)),
    BlockProps::sign("sign_white", Color::rgb(240, 240, 240)),
    BlockProps::sign("sign_orange", Color::rgb(235, 120, 30)),
    BlockProps::furniture("step", BlockShape::StairStep, Color::rgb(150, 150, 150)),
    BlockProps::furniture("slab", BlockShape::HalfSlab, Color::rgb(150, 150, 150)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_empty() {
        assert!(BlockType::AIR.is_air());
        assert!(!BlockType::AIR.is_solid());
        assert!(!BlockType::AIR.is_opaque());
        assert_eq!(BlockType::default(), BlockType::AIR);
    }

    #[test]
    fn table_ids_match_constants() {
        assert_eq!(BlockType::COUNT, 31);
        assert_eq!(BlockType::SLAB.name(), "slab");
        assert_eq!(BlockType::LADDER.name(), "ladder");
        assert_eq!(BlockType::SIGN_ORANGE.name(), "sign_orange");
        assert_eq!(BlockType::all().count(), BlockType::COUNT);
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = BlockType::all().map(BlockType::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BlockType::COUNT);
    }

    #[test]
    fn solidity_is_distinct_from_opacity() {
        assert!(BlockType::GLASS.is_solid());
        assert!(!BlockType::GLASS.is_opaque());
        assert!(BlockType::SLAB.is_solid());
        assert!(!BlockType::SLAB.is_opaque());
        assert!(BlockType::BRICK.is_solid() && BlockType::BRICK.is_opaque());
    }

    #[test]
    fn ladder_is_climbable_but_not_solid() {
        assert!(!BlockType::LADDER.is_solid());
        assert!(BlockType::LADDER.is_climbable());
        assert_eq!(BlockType::LADDER.shape(), BlockShape::LadderRungs);
    }

    #[test]
    fn bedrock_is_not_placeable() {
        assert!(!BlockType::BEDROCK.is_player_placeable());
        assert!(BlockType::BRICK.is_player_placeable());
    }

    #[test]
    fn unknown_id_is_rejected() {
        assert!(BlockType::try_from_id(30).is_ok());
        assert!(matches!(
            BlockType::try_from_id(200),
            Err(Error::UnknownBlock(200))
        ));
        assert_eq!(BlockType(200).props().name, "air");
    }

    #[test]
    fn face_culling() {
        assert!(face_visible(BlockType::STONE, BlockType::AIR));
        assert!(!face_visible(BlockType::STONE, BlockType::BRICK));
        assert!(face_visible(BlockType::STONE, BlockType::GLASS));
        assert!(!face_visible(BlockType::GLASS, BlockType::GLASS));
        assert!(!face_visible(BlockType::AIR, BlockType::AIR));
    }

    #[test]
    fn shape_face_counts() {
        assert_eq!(BlockShape::FullCube.face_count(), 6);
        assert!(BlockShape::StairStep.face_count() > BlockShape::HalfSlab.face_count());
        assert!(BlockShape::FullCube.is_full());
        assert!(!BlockShape::HalfSlab.is_full());
    }

    #[test]
    fn box_shapes_differ_by_extent() {
        let boxes = [BlockShape::FullCube, BlockShape::HalfSlab, BlockShape::Pane];
        for shape in boxes {
            assert_eq!(shape.face_count(), 6);
        }
        assert_eq!(BlockShape::FullCube.extent(), Vec3::ONE);
        assert!(BlockShape::HalfSlab.extent().y < BlockShape::FullCube.extent().y);
        assert!(BlockShape::Pane.extent().z < BlockShape::HalfSlab.extent().y);
        assert_ne!(BlockShape::LadderRungs.face_count(), BlockShape::FencePost.face_count());
    }
}
