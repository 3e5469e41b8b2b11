//! Noise heightmap with flattening around building footprints.

use brickfield_core::{BlockBox, Error, Result};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::WorldSeed;

/// Terrain generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Horizontal scale of terrain features.
    pub terrain_scale: f64,
    /// Maximum terrain height above ground level.
    pub terrain_height: f64,
    /// Number of noise octaves for detail.
    pub octaves: usize,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Blocks around a footprint forced to ground level.
    pub flat_margin: i32,
    /// Distance from a footprint at which terrain reaches full noise height.
    pub blend_margin: i32,
    /// Depth of dirt layer below surface.
    pub dirt_depth: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            terrain_scale: 64.0,
            terrain_height: 12.0,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            flat_margin: 2,
            blend_margin: 8,
            dirt_depth: 3,
        }
    }
}

impl TerrainConfig {
    /// Tallest noise height the world's chunk layers leave headroom for.
    pub const MAX_TERRAIN_HEIGHT: f64 = 40.0;

    pub fn validate(&self) -> Result<()> {
        if !(self.terrain_scale.is_finite() && self.terrain_scale > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "terrain_scale must be positive, got {}",
                self.terrain_scale
            )));
        }
        if !(0.0..=Self::MAX_TERRAIN_HEIGHT).contains(&self.terrain_height) {
            return Err(Error::InvalidConfig(format!(
                "terrain_height must be within 0..={}, got {}",
                Self::MAX_TERRAIN_HEIGHT,
                self.terrain_height
            )));
        }
        if !(1..=16).contains(&self.octaves) {
            return Err(Error::InvalidConfig(format!(
                "octaves must be within 1..=16, got {}",
                self.octaves
            )));
        }
        if self.flat_margin < 0 || self.blend_margin <= self.flat_margin {
            return Err(Error::InvalidConfig(format!(
                "need 0 <= flat_margin < blend_margin, got {} and {}",
                self.flat_margin, self.blend_margin
            )));
        }
        if self.dirt_depth < 1 {
            return Err(Error::InvalidConfig(format!(
                "dirt_depth must be at least 1, got {}",
                self.dirt_depth
            )));
        }
        Ok(())
    }
}

/// Procedural heightmap using fractal noise.
///
/// Heights are a pure function of the seed, the column and the set of
/// above-ground footprints the generator was built with: inside a footprint
/// expanded by `flat_margin` the ground is level at zero, and beyond that the
/// noise height fades back in until `blend_margin`.
pub struct TerrainGenerator {
    config: TerrainConfig,
    height_noise: Fbm<Perlin>,
    footprints: Vec<BlockBox>,
}

/// Fold a 64-bit seed into the 32 bits the noise functions take, so the high
/// half still matters.
#[inline]
const fn fold_seed(seed: WorldSeed) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

impl TerrainGenerator {
    /// Create a new terrain generator. `footprints` are the above-ground
    /// building boxes the terrain must stay flat around.
    pub fn new(seed: WorldSeed, config: TerrainConfig, footprints: Vec<BlockBox>) -> Self {
        let height_noise = Fbm::<Perlin>::new(fold_seed(seed))
            .set_octaves(config.octaves)
            .set_lacunarity(config.lacunarity)
            .set_persistence(config.persistence);

        Self {
            config,
            height_noise,
            footprints,
        }
    }

    /// Create an unconstrained terrain generator with default configuration.
    pub fn with_seed(seed: WorldSeed) -> Self {
        Self::new(seed, TerrainConfig::default(), Vec::new())
    }

    pub const fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn footprints(&self) -> &[BlockBox] {
        &self.footprints
    }

    /// Noise height before any flattening, in `0..=terrain_height`.
    pub fn raw_height(&self, world_x: i32, world_z: i32) -> i32 {
        let nx = f64::from(world_x) / self.config.terrain_scale;
        let nz = f64::from(world_z) / self.config.terrain_scale;

        // Noise returns roughly [-1, 1]; map to [0, terrain_height].
        let noise_value = self.height_noise.get([nx, nz]).clamp(-1.0, 1.0);
        ((noise_value + 1.0) * 0.5 * self.config.terrain_height) as i32
    }

    /// Horizontal distance to the nearest footprint, or `None` with no footprints.
    pub fn footprint_distance(&self, world_x: i32, world_z: i32) -> Option<i32> {
        self.footprints
            .iter()
            .map(|b| b.distance_xz(world_x, world_z))
            .min()
    }

    /// Scale applied to the noise height: 0 in the hard-flat zone, rising
    /// linearly to 1 across the blend zone.
    pub fn flatten_factor(&self, world_x: i32, world_z: i32) -> f64 {
        let Some(distance) = self.footprint_distance(world_x, world_z) else {
            return 1.0;
        };
        let flat = self.config.flat_margin;
        let span = f64::from(self.config.blend_margin - flat);
        (f64::from(distance - flat - 1) / span).clamp(0.0, 1.0)
    }

    /// Get terrain height at world XZ coordinates.
    ///
    /// Returns the Y coordinate of the surface block at this position.
    pub fn height_at(&self, world_x: i32, world_z: i32) -> i32 {
        let factor = self.flatten_factor(world_x, world_z);
        if factor <= 0.0 {
            return 0;
        }
        (f64::from(self.raw_height(world_x, world_z)) * factor).floor() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::IVec3;

    fn with_building() -> TerrainGenerator {
        let footprint = BlockBox::new(IVec3::new(0, 0, 0), IVec3::new(10, 6, 10));
        TerrainGenerator::new(7, TerrainConfig::default(), vec![footprint])
    }

    #[test]
    fn generator_deterministic() {
        let gen1 = TerrainGenerator::with_seed(12345);
        let gen2 = TerrainGenerator::with_seed(12345);

        for x in -100..100 {
            for z in -100..100 {
                assert_eq!(gen1.height_at(x, z), gen2.height_at(x, z));
            }
        }
    }

    #[test]
    fn different_seeds_different_terrain() {
        let gen1 = TerrainGenerator::with_seed(12345);
        let gen2 = TerrainGenerator::with_seed(54321);

        let mut differences = 0;
        for x in 0..20 {
            for z in 0..20 {
                if gen1.height_at(x * 7, z * 7) != gen2.height_at(x * 7, z * 7) {
                    differences += 1;
                }
            }
        }
        assert!(differences > 50, "Seeds should produce different terrain");
    }

    #[test]
    fn high_seed_bits_change_terrain() {
        let low = TerrainGenerator::with_seed(12345);
        let high = TerrainGenerator::with_seed(12345 | (1 << 40));

        let differences = (0..400)
            .filter(|i| {
                let (x, z) = ((i % 20) * 7, (i / 20) * 7);
                low.height_at(x, z) != high.height_at(x, z)
            })
            .count();
        assert!(differences > 50, "High seed bits should reach the noise");
    }

    #[test]
    fn heights_stay_in_range() {
        let gen = TerrainGenerator::with_seed(99);
        let max = gen.config().terrain_height as i32;
        for x in (-200..200).step_by(3) {
            for z in (-200..200).step_by(5) {
                let h = gen.height_at(x, z);
                assert!((0..=max).contains(&h), "height {h} at ({x}, {z})");
            }
        }
    }

    #[test]
    fn footprint_and_margin_are_flat() {
        let gen = with_building();
        let margin = gen.config().flat_margin;
        for x in -margin - 1..10 + margin + 1 {
            for z in -margin - 1..10 + margin + 1 {
                assert_eq!(gen.height_at(x, z), 0, "not flat at ({x}, {z})");
            }
        }
    }

    #[test]
    fn flattened_height_never_exceeds_raw() {
        let gen = with_building();
        for x in -30..40 {
            for z in -30..40 {
                assert!(gen.height_at(x, z) <= gen.raw_height(x, z));
            }
        }
    }

    #[test]
    fn blend_rises_away_from_footprint() {
        let gen = with_building();
        let blend = gen.config().blend_margin;
        let mut previous = 0.0;
        for x in 10..10 + blend + 4 {
            let factor = gen.flatten_factor(x, 5);
            assert!(factor >= previous);
            previous = factor;
        }
        assert_relative_eq!(gen.flatten_factor(9 + blend + 1, 5), 1.0);
        assert_relative_eq!(gen.flatten_factor(100, 100), 1.0);
        assert_eq!(gen.height_at(100, 100), gen.raw_height(100, 100));
    }

    #[test]
    fn config_validation() {
        assert!(TerrainConfig::default().validate().is_ok());
        let bad = TerrainConfig {
            blend_margin: 2,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = TerrainConfig {
            terrain_scale: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = TerrainConfig {
            terrain_height: 500.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
