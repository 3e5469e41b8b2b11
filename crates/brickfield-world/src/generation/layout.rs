//! Town layout planning: which landmark goes on which lot of the street grid.
//!
//! Streets run along every multiple of `street_spacing` on both horizontal
//! axes. The square between four streets is a lot; its buildable interior
//! starts past the road and pavement. The park takes the lot whose corner is
//! the origin and the bunker sits beneath it; every other landmark type, plus
//! a number of terraced-house rows, gets its own seed-shuffled lot with a
//! seeded offset inside it.

use brickfield_core::constants::{
    BUNKER_FLOOR, BUNKER_TOP, CHUNK_SIZE, GROUND_LEVEL, STREET_SPACING, WORLD_CHUNK_RADIUS,
};
use brickfield_core::coords::WorldPos;
use brickfield_core::{BlockBox, BlockType, Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::landmark::{Landmark, LandmarkType};
use crate::WorldSeed;

/// Street grid and placement settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Distance between parallel streets.
    pub street_spacing: i32,
    /// Road cells either side of the street centre line.
    pub street_half_width: i32,
    /// Lots are indexed `-town_lot_radius..town_lot_radius` on each axis.
    pub town_lot_radius: i32,
    /// Number of lots given over to terraced-house rows.
    pub terrace_rows: usize,
    /// Houses per terraced row.
    pub houses_per_row: i32,
    /// Seeded positions tried per lot before moving to the next lot.
    pub placement_attempts: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            street_spacing: STREET_SPACING,
            street_half_width: 1,
            town_lot_radius: 3,
            terrace_rows: 3,
            houses_per_row: 3,
            placement_attempts: 16,
        }
    }
}

impl LayoutConfig {
    /// Offset of the first buildable cell from a street centre line.
    pub const fn lot_margin(&self) -> i32 {
        // road, then one pavement cell
        self.street_half_width + 2
    }

    /// Buildable width of a lot along either axis.
    pub const fn lot_interior(&self) -> i32 {
        self.street_spacing - 2 * self.lot_margin() + 1
    }

    /// Minimum buildable corner of the lot with index `(i, j)`.
    pub const fn lot_origin(&self, i: i32, j: i32) -> (i32, i32) {
        (
            i * self.street_spacing + self.lot_margin(),
            j * self.street_spacing + self.lot_margin(),
        )
    }

    /// Distance from a coordinate to the nearest street centre line.
    pub const fn distance_to_street(&self, coord: i32) -> i32 {
        let m = coord.rem_euclid(self.street_spacing);
        if m < self.street_spacing - m {
            m
        } else {
            self.street_spacing - m
        }
    }

    /// Whether a coordinate lies on the road surface of a street.
    pub const fn is_road(&self, coord: i32) -> bool {
        self.distance_to_street(coord) <= self.street_half_width
    }

    /// Whether a coordinate lies on the pavement beside a road.
    pub const fn is_pavement(&self, coord: i32) -> bool {
        self.distance_to_street(coord) == self.street_half_width + 1
    }

    /// Lots available to buildings other than the park.
    pub fn lot_count(&self) -> usize {
        let side = (2 * self.town_lot_radius) as usize;
        side * side - 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.street_half_width < 0 || self.street_spacing <= 0 {
            return Err(Error::InvalidConfig(format!(
                "invalid street grid: spacing {}, half width {}",
                self.street_spacing, self.street_half_width
            )));
        }
        let widest = LandmarkType::all()
            .iter()
            .map(|kind| {
                let (w, _, d) = kind.footprint();
                w.max(d)
            })
            .max()
            .unwrap_or(0);
        if self.lot_interior() < widest {
            return Err(Error::InvalidConfig(format!(
                "lot interior {} cannot fit a {widest}-wide building",
                self.lot_interior()
            )));
        }
        let (house_w, _, _) = LandmarkType::TerracedHouse.footprint();
        if self.houses_per_row < 1 || self.houses_per_row * house_w > self.lot_interior() {
            return Err(Error::InvalidConfig(format!(
                "{} terraced houses do not fit a lot {} wide",
                self.houses_per_row,
                self.lot_interior()
            )));
        }
        if self.town_lot_radius < 1 {
            return Err(Error::InvalidConfig(format!(
                "town_lot_radius must be at least 1, got {}",
                self.town_lot_radius
            )));
        }
        let needed = TownPlan::standalone_types().count() + self.terrace_rows;
        if self.lot_count() < needed {
            return Err(Error::InvalidConfig(format!(
                "{} lots cannot hold {needed} buildings",
                self.lot_count()
            )));
        }
        let world_extent = WORLD_CHUNK_RADIUS * CHUNK_SIZE as i32;
        if self.town_lot_radius * self.street_spacing > world_extent {
            return Err(Error::InvalidConfig(format!(
                "town of {} lots exceeds the world radius of {world_extent} blocks",
                self.town_lot_radius
            )));
        }
        if self.placement_attempts == 0 {
            return Err(Error::InvalidConfig(
                "placement_attempts must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// A landmark chosen by the planner together with its wall material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedBuilding {
    pub landmark: Landmark,
    pub wall: BlockType,
}

/// The full set of landmark placements for one seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TownPlan {
    park: Landmark,
    bunker: Landmark,
    buildings: Vec<PlannedBuilding>,
}

impl TownPlan {
    /// Types that get one lot each. The park, bunker and terraced rows are
    /// placed separately.
    pub fn standalone_types() -> impl Iterator<Item = LandmarkType> {
        LandmarkType::all().iter().copied().filter(|kind| {
            !matches!(
                kind,
                LandmarkType::Park | LandmarkType::Bunker | LandmarkType::TerracedHouse
            )
        })
    }

    /// Lay out the town for a seed. `config` must already be validated.
    pub fn generate(seed: WorldSeed, config: &LayoutConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let (park_x, park_z) = config.lot_origin(0, 0);
        let park = Landmark::with_footprint(
            LandmarkType::Park,
            WorldPos::new(park_x, GROUND_LEVEL, park_z),
        );
        let (bw, bh, bd) = LandmarkType::Bunker.footprint();
        debug_assert_eq!(BUNKER_FLOOR + bh - 1, BUNKER_TOP);
        let bunker = Landmark::new(
            LandmarkType::Bunker,
            WorldPos::new(
                park_x + (park.width - bw) / 2,
                BUNKER_FLOOR,
                park_z + (park.depth - bd) / 2,
            ),
            bw,
            bh,
            bd,
        );

        let r = config.town_lot_radius;
        let mut lots: Vec<(i32, i32)> = (-r..r)
            .flat_map(|j| (-r..r).map(move |i| (i, j)))
            .filter(|&lot| lot != (0, 0))
            .collect();
        lots.shuffle(&mut rng);
        let mut lots = lots.into_iter();

        let mut plan = Self {
            park,
            bunker,
            buildings: Vec::new(),
        };

        // Largest first so the big footprints never go hungry.
        let mut kinds: Vec<LandmarkType> = Self::standalone_types().collect();
        kinds.sort_by_key(|kind| {
            let (w, _, d) = kind.footprint();
            std::cmp::Reverse(w * d)
        });

        for kind in kinds {
            let wall = wall_material(kind, &mut rng);
            let placed = lots.by_ref().find_map(|(i, j)| {
                plan.try_place_in_lot(config, &mut rng, (i, j), kind)
            });
            match placed {
                Some(landmark) => plan.buildings.push(PlannedBuilding { landmark, wall }),
                None => warn!("No free lot left for {}", kind),
            }
        }

        for row in 0..config.terrace_rows {
            let Some((i, j)) = lots.next() else {
                warn!("No free lot left for terraced row {}", row);
                break;
            };
            let wall = wall_material(LandmarkType::TerracedHouse, &mut rng);
            plan.place_terrace(config, &mut rng, (i, j), wall);
        }

        debug!(
            "Planned {} landmarks on {} lots",
            plan.landmark_count(),
            config.lot_count()
        );
        plan
    }

    fn try_place_in_lot(
        &self,
        config: &LayoutConfig,
        rng: &mut StdRng,
        (i, j): (i32, i32),
        kind: LandmarkType,
    ) -> Option<Landmark> {
        let (x0, z0) = config.lot_origin(i, j);
        let (w, _, d) = kind.footprint();
        let slack_x = config.lot_interior() - w;
        let slack_z = config.lot_interior() - d;

        (0..config.placement_attempts).find_map(|_| {
            let origin = WorldPos::new(
                x0 + rng.gen_range(0..=slack_x),
                GROUND_LEVEL,
                z0 + rng.gen_range(0..=slack_z),
            );
            let candidate = Landmark::with_footprint(kind, origin);
            self.is_free(&candidate).then_some(candidate)
        })
    }

    fn place_terrace(
        &mut self,
        config: &LayoutConfig,
        rng: &mut StdRng,
        (i, j): (i32, i32),
        wall: BlockType,
    ) {
        let (x0, z0) = config.lot_origin(i, j);
        let (w, _, d) = LandmarkType::TerracedHouse.footprint();
        let row_width = w * config.houses_per_row;
        let x = x0 + rng.gen_range(0..=config.lot_interior() - row_width);
        let z = z0 + rng.gen_range(0..=config.lot_interior() - d);

        for n in 0..config.houses_per_row {
            let house = Landmark::with_footprint(
                LandmarkType::TerracedHouse,
                WorldPos::new(x + n * w, GROUND_LEVEL, z),
            );
            if self.is_free(&house) {
                self.buildings.push(PlannedBuilding {
                    landmark: house,
                    wall,
                });
            } else {
                warn!("Terraced house at {} overlaps an existing landmark", house.origin);
            }
        }
    }

    fn is_free(&self, candidate: &Landmark) -> bool {
        self.landmarks().all(|placed| !placed.overlaps(candidate))
    }

    pub const fn park(&self) -> &Landmark {
        &self.park
    }

    pub const fn bunker(&self) -> &Landmark {
        &self.bunker
    }

    /// Every building apart from the park and bunker.
    pub fn buildings(&self) -> &[PlannedBuilding] {
        &self.buildings
    }

    /// Every planned landmark, park first, bunker last.
    pub fn landmarks(&self) -> impl Iterator<Item = &Landmark> {
        std::iter::once(&self.park)
            .chain(self.buildings.iter().map(|b| &b.landmark))
            .chain(std::iter::once(&self.bunker))
    }

    pub fn landmark_count(&self) -> usize {
        self.buildings.len() + 2
    }

    /// Footprints of every above-ground landmark, for terrain flattening.
    pub fn surface_footprints(&self) -> Vec<BlockBox> {
        self.landmarks()
            .filter(|l| !l.kind.is_underground())
            .map(Landmark::bounds)
            .collect()
    }
}

fn wall_material(kind: LandmarkType, rng: &mut StdRng) -> BlockType {
    const OFFICE: [BlockType; 4] = [
        BlockType::BRICK,
        BlockType::GLASS,
        BlockType::STONE,
        BlockType::CONCRETE,
    ];
    const HOUSE: [BlockType; 3] = [
        BlockType::YELLOW_BRICK,
        BlockType::PEBBLEDASH,
        BlockType::RENDER,
    ];
    const SHOP: [BlockType; 3] = [BlockType::BRICK, BlockType::RENDER, BlockType::YELLOW_BRICK];

    match kind {
        LandmarkType::OfficeBuilding => OFFICE[rng.gen_range(0..OFFICE.len())],
        LandmarkType::TerracedHouse => HOUSE[rng.gen_range(0..HOUSE.len())],
        LandmarkType::Church | LandmarkType::Library => BlockType::STONE,
        LandmarkType::Warehouse | LandmarkType::Supermarket | LandmarkType::Bunker => {
            BlockType::CONCRETE
        }
        LandmarkType::PoliceStation
        | LandmarkType::FireStation
        | LandmarkType::PrimarySchool
        | LandmarkType::JobCentre
        | LandmarkType::CommunityCentre => BlockType::BRICK,
        _ => SHOP[rng.gen_range(0..SHOP.len())],
    }
}
