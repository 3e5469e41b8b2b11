//! Voxel traversal raycasting (Amanatides & Woo DDA).

use brickfield_core::{BlockType, Ray};
use brickfield_world::BlockAccess;
use glam::{IVec3, Vec3};
use tracing::trace;

/// Cell where a traversal stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelHit {
    /// The cell that satisfied the predicate.
    pub position: IVec3,
    /// The cell visited just before, where a placed block would go.
    pub previous: IVec3,
    /// Outward normal of the face the ray entered through. Zero when the
    /// origin itself is inside the hit cell.
    pub normal: IVec3,
    /// Distance along the ray to the entry point of the hit cell.
    pub distance: f32,
}

/// Result of a raycast against solid blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastResult {
    pub position: IVec3,
    pub block: BlockType,
    pub normal: IVec3,
    pub distance: f32,
    pub previous: IVec3,
}

impl RaycastResult {
    /// Cell adjacent to the hit face.
    pub fn placement_cell(&self) -> IVec3 {
        self.position + self.normal
    }
}

/// Cast a ray and return the first solid block within `max_distance`.
///
/// `direction` need not be normalized; a zero direction yields `None`.
pub fn raycast<W>(world: &W, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastResult>
where
    W: BlockAccess + ?Sized,
{
    let mut block = BlockType::AIR;
    let hit = raycast_with(origin, direction, max_distance, |cell| {
        block = world.block(cell);
        block.is_solid()
    })?;

    trace!("Ray hit {} at {} after {:.2}", block, hit.position, hit.distance);
    Some(RaycastResult {
        position: hit.position,
        block,
        normal: hit.normal,
        distance: hit.distance,
        previous: hit.previous,
    })
}

/// Walk the cells a ray passes through, in order, until `is_hit` accepts one
/// or the ray has travelled further than `max_distance`.
pub fn raycast_with<F>(origin: Vec3, direction: Vec3, max_distance: f32, mut is_hit: F) -> Option<VoxelHit>
where
    F: FnMut(IVec3) -> bool,
{
    if !max_distance.is_finite() || max_distance < 0.0 {
        return None;
    }
    let ray = Ray::new(origin, direction)?;
    let dir = ray.direction;

    let mut cell = origin.floor().as_ivec3();
    let step = IVec3::new(
        axis_step(dir.x),
        axis_step(dir.y),
        axis_step(dir.z),
    );

    // Ray length to cross one whole cell on each axis.
    let t_delta = Vec3::new(inv_abs(dir.x), inv_abs(dir.y), inv_abs(dir.z));

    // Ray length to the first boundary on each axis.
    let frac = origin - origin.floor();
    let mut t_max = Vec3::new(
        first_boundary(step.x, frac.x, t_delta.x),
        first_boundary(step.y, frac.y, t_delta.y),
        first_boundary(step.z, frac.z, t_delta.z),
    );

    let mut previous = cell;
    let mut normal = IVec3::ZERO;
    let mut t = 0.0f32;

    while t <= max_distance {
        if is_hit(cell) {
            return Some(VoxelHit {
                position: cell,
                previous,
                normal,
                distance: t,
            });
        }
        previous = cell;

        if t_max.x < t_max.y && t_max.x < t_max.z {
            cell.x += step.x;
            t = t_max.x;
            t_max.x += t_delta.x;
            normal = IVec3::new(-step.x, 0, 0);
        } else if t_max.y < t_max.z {
            cell.y += step.y;
            t = t_max.y;
            t_max.y += t_delta.y;
            normal = IVec3::new(0, -step.y, 0);
        } else {
            cell.z += step.z;
            t = t_max.z;
            t_max.z += t_delta.z;
            normal = IVec3::new(0, 0, -step.z);
        }
    }

    None
}

#[inline]
fn axis_step(d: f32) -> i32 {
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

#[inline]
fn inv_abs(d: f32) -> f32 {
    if d.abs() < 1e-8 {
        f32::MAX
    } else {
        1.0 / d.abs()
    }
}

#[inline]
fn first_boundary(step: i32, frac: f32, delta: f32) -> f32 {
    match step {
        1 => (1.0 - frac) * delta,
        -1 => frac * delta,
        _ => f32::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brickfield_world::World;

    const CENTRE: Vec3 = Vec3::new(0.5, 0.5, 0.5);

    #[test]
    fn returns_nearest_of_stacked_blocks() {
        let world = World::new();
        for x in [5, 7, 9] {
            world.set_block(x, 0, 0, BlockType::STONE);
        }

        let hit = raycast(&world, CENTRE, Vec3::X, 20.0).unwrap();
        assert_eq!(hit.position, IVec3::new(5, 0, 0));
        assert_eq!(hit.block, BlockType::STONE);
        assert_eq!(hit.normal, IVec3::new(-1, 0, 0));
        assert_eq!(hit.previous, IVec3::new(4, 0, 0));
        assert_eq!(hit.placement_cell(), hit.previous);
        assert_relative_eq!(hit.distance, 4.5);
    }

    #[test]
    fn air_only_ray_misses() {
        let world = World::new();
        assert!(raycast(&world, CENTRE, Vec3::new(1.0, 0.3, -0.2), 50.0).is_none());
    }

    #[test]
    fn max_distance_bounds_the_search() {
        let world = World::new();
        world.set_block(10, 0, 0, BlockType::BRICK);

        assert!(raycast(&world, CENTRE, Vec3::X, 5.0).is_none());
        assert!(raycast(&world, CENTRE, Vec3::X, 9.0).is_none());
        let hit = raycast(&world, CENTRE, Vec3::X, 9.5).unwrap();
        assert_eq!(hit.position, IVec3::new(10, 0, 0));
    }

    #[test]
    fn zero_direction_and_bad_distance_miss() {
        let world = World::new();
        world.set_block(0, 0, 0, BlockType::STONE);
        assert!(raycast(&world, CENTRE, Vec3::ZERO, 10.0).is_none());
        assert!(raycast(&world, CENTRE, Vec3::X, f32::INFINITY).is_none());
        assert!(raycast(&world, CENTRE, Vec3::X, -1.0).is_none());
    }

    #[test]
    fn downward_ray_hits_ground_top_face() {
        let world = World::new();
        world.set_block(-3, -1, 4, BlockType::GRASS);

        let hit = raycast(&world, Vec3::new(-2.5, 10.2, 4.5), Vec3::NEG_Y, 32.0).unwrap();
        assert_eq!(hit.position, IVec3::new(-3, -1, 4));
        assert_eq!(hit.normal, IVec3::Y);
        assert_eq!(hit.previous, IVec3::new(-3, 0, 4));
        assert_relative_eq!(hit.distance, 10.2, epsilon = 1e-5);
    }

    #[test]
    fn non_solid_blocks_are_skipped() {
        let world = World::new();
        world.set_block(2, 0, 0, BlockType::LADDER);
        world.set_block(4, 0, 0, BlockType::GLASS);

        let hit = raycast(&world, CENTRE, Vec3::X, 10.0).unwrap();
        assert_eq!(hit.block, BlockType::GLASS);
    }

    #[test]
    fn origin_inside_block_hits_immediately() {
        let world = World::new();
        world.set_block(0, 0, 0, BlockType::CONCRETE);
        let hit = raycast(&world, CENTRE, Vec3::Z, 4.0).unwrap();
        assert_eq!(hit.position, IVec3::ZERO);
        assert_eq!(hit.normal, IVec3::ZERO);
        assert_relative_eq!(hit.distance, 0.0);
    }

    #[test]
    fn diagonal_ray_visits_face_connected_cells() {
        let mut visited = Vec::new();
        let hit = raycast_with(CENTRE, Vec3::new(1.0, 1.0, 0.0), 100.0, |cell| {
            visited.push(cell);
            cell == IVec3::new(3, 3, 0)
        })
        .unwrap();

        assert_eq!(hit.position, IVec3::new(3, 3, 0));
        for pair in visited.windows(2) {
            let d = (pair[1] - pair[0]).abs();
            assert_eq!(d.x + d.y + d.z, 1, "{pair:?} not face-adjacent");
        }
    }

    #[test]
    fn works_through_a_locked_view() {
        let world = World::new();
        world.set_block(0, 5, 0, BlockType::SLATE_ROOF);
        let view = world.view();
        let hit = raycast(&view, CENTRE, Vec3::Y, 10.0).unwrap();
        assert_eq!(hit.block, BlockType::SLATE_ROOF);
    }
}
