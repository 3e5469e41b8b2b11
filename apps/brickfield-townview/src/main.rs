//! Brickfield Town Viewer
//!
//! Generates a town for a seed without a window, then exercises the world the
//! way a client would: walks the chunk streamer along a street, casts a ray at
//! the ground and routes a pedestrian between two landmarks.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p brickfield-townview -- [OPTIONS]
//! ```
//!
//! ## Options
//!
//! - `--seed <N>`: World generation seed (default: 42)
//! - `--render-distance <N>`: Chunk load radius around the walker (default: 4)
//! - `-h, --help`: Print help message
//!
//! ## Examples
//!
//! ```bash
//! # Default town
//! cargo run -p brickfield-townview
//!
//! # Another town with a tighter streaming radius
//! cargo run -p brickfield-townview -- --seed 1984 --render-distance 2
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

use std::time::Instant;

use brickfield_core::constants::CHUNK_SIZE;
use brickfield_core::WorldPos;
use brickfield_nav::{find_path, path_length};
use brickfield_physics::raycast;
use brickfield_world::{GeneratorConfig, LandmarkType, StreamingConfig, World, WorldGenerator};
use glam::Vec3;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Street the walker follows while streaming.
const WALK_Z: f32 = 0.5;
/// Distance between streaming updates along the walk.
const WALK_STEP: f32 = 16.0;
/// Height the sample ray is cast down from.
const RAY_HEIGHT: f32 = 40.0;

/// Run parameters (from CLI or defaults).
#[derive(Debug, Clone)]
struct TownviewParams {
    seed: u64,
    render_distance: i32,
    help: bool,
}

impl Default for TownviewParams {
    fn default() -> Self {
        Self {
            seed: 42,
            render_distance: StreamingConfig::default().render_distance,
            help: false,
        }
    }
}

impl TownviewParams {
    /// Parse parameters from command line arguments.
    fn from_args() -> Self {
        let mut params = Self::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--seed" => {
                    if i + 1 < args.len() {
                        if let Ok(v) = args[i + 1].parse() {
                            params.seed = v;
                            i += 1;
                        }
                    }
                }
                "--render-distance" => {
                    if i + 1 < args.len() {
                        if let Ok(v) = args[i + 1].parse() {
                            params.render_distance = v;
                            i += 1;
                        }
                    }
                }
                "-h" | "--help" => params.help = true,
                other => warn!("Ignoring unknown argument {other:?}"),
            }
            i += 1;
        }

        params
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let params = TownviewParams::from_args();
    if params.help {
        print_help();
        return Ok(());
    }

    let streaming = StreamingConfig {
        render_distance: params.render_distance,
        ..StreamingConfig::default()
    };
    let mut world = World::with_config(streaming.clone())?;
    let mut generator = WorldGenerator::new(GeneratorConfig::with_seed(params.seed))?;

    let start = Instant::now();
    generator.generate_world(&mut world);
    info!(
        "Generated seed {} in {:.2?}: {} chunks, {:.1} MiB",
        params.seed,
        start.elapsed(),
        world.loaded_chunk_count(),
        world.memory_usage() as f64 / (1024.0 * 1024.0)
    );

    print_summary(&world, &generator);
    sample_raycast(&world, &generator);
    sample_path(&world);
    walk_street(&world, &streaming);

    Ok(())
}

fn print_summary(world: &World, generator: &WorldGenerator) {
    info!("{} landmarks", world.landmark_count());
    for landmark in world.all_landmarks() {
        info!(
            "  {:<16} at {} ({}x{}x{})",
            landmark.kind.to_string(),
            landmark.origin,
            landmark.width,
            landmark.height,
            landmark.depth
        );
    }

    let underground = generator
        .building_plots()
        .iter()
        .filter(|plot| plot.underground)
        .count();
    info!(
        "{} building plots ({} underground), {} NPC spawn points",
        generator.building_plots().len(),
        underground,
        generator.npc_spawn_points().len()
    );
}

fn sample_raycast(world: &World, generator: &WorldGenerator) {
    // Halfway between the park and the first lot east of it.
    let x = generator.config().layout.street_spacing / 2;
    let origin = Vec3::new(x as f32 + 0.5, RAY_HEIGHT, WALK_Z);

    match raycast(world, origin, Vec3::NEG_Y, RAY_HEIGHT * 2.0) {
        Some(hit) => info!(
            "Ray from {} hit {} at {} after {:.1} blocks; a placed block would go to {}",
            origin,
            hit.block,
            hit.position,
            hit.distance,
            hit.placement_cell()
        ),
        None => warn!("Ray from {} hit nothing", origin),
    }
}

fn sample_path(world: &World) {
    let (Some(from), Some(to)) = (
        world.get_landmark(LandmarkType::Pub),
        world.get_landmark(LandmarkType::Library),
    ) else {
        warn!("Town has no pub or no library to route between");
        return;
    };

    let start = from.entrance().to_ivec3();
    let end = to.entrance().to_ivec3();
    let timer = Instant::now();
    match find_path(world, start, end) {
        Some(path) => info!(
            "Pub to library: {} waypoints, {:.1} blocks walked, found in {:.2?}",
            path.len(),
            path_length(&path),
            timer.elapsed()
        ),
        None => warn!("No walking route from {} to {}", start, end),
    }
}

fn walk_street(world: &World, streaming: &StreamingConfig) {
    let reach = ((streaming.world_chunk_radius + 1) * CHUNK_SIZE as i32) as f32;
    let mut x = -reach;
    while x <= reach {
        let position = Vec3::new(x, 2.0, WALK_Z);
        let evicted = world.update_loaded_chunks(position);
        info!(
            "Walker at {}: {} chunks loaded, {} evicted",
            WorldPos::from(position),
            world.loaded_chunk_count(),
            evicted.len()
        );
        x += WALK_STEP;
    }
}

fn print_help() {
    eprintln!(
        "Brickfield Town Viewer

USAGE:
    cargo run -p brickfield-townview -- [OPTIONS]

OPTIONS:
    --seed <N>              World generation seed (default: 42)
    --render-distance <N>   Chunk load radius around the walker (default: 4)
    -h, --help              Print this help message

EXAMPLES:
    # Default town
    cargo run -p brickfield-townview

    # Another town with a tighter streaming radius
    cargo run -p brickfield-townview -- --seed 1984 --render-distance 2

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log level (e.g., info, debug, trace)"
    );
}
