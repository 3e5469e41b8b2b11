//! A* search over standable block cells.
//!
//! A node is the cell an agent's feet occupy. It is passable when it and the
//! cells above it up to `clearance` are not solid, and standable when it is
//! passable and rests on a solid block or a ladder (or is itself a ladder).
//! Move costs are the Euclidean length of each step, so the straight-line
//! distance to the goal is an admissible heuristic.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use brickfield_world::BlockAccess;
use glam::IVec3;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Limits on how an agent may move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOptions {
    /// Highest ledge that can be stepped onto without a ladder.
    pub max_step_up: i32,
    /// Furthest the agent will step down off a ledge.
    pub max_drop: i32,
    /// Non-solid cells needed from the feet upwards.
    pub clearance: i32,
    /// Node expansions before the search gives up.
    pub max_nodes: usize,
    pub allow_diagonals: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            max_step_up: 1,
            max_drop: 3,
            clearance: 2,
            max_nodes: 20_000,
            allow_diagonals: true,
        }
    }
}

/// Shared flag for abandoning a search from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Acquire)
    }
}

/// Open-set entry, ordered so the heap pops the lowest `f` first.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    pos: IVec3,
    g: f32,
    f: f32,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for a min-heap; prefer deeper nodes on ties.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| self.g.total_cmp(&other.g))
    }
}

/// How often the cancel flag is polled, in expansions.
const CANCEL_POLL: usize = 64;

const CARDINALS: [IVec3; 4] = [
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
];

const DIAGONALS: [IVec3; 4] = [
    IVec3::new(1, 0, 1),
    IVec3::new(1, 0, -1),
    IVec3::new(-1, 0, 1),
    IVec3::new(-1, 0, -1),
];

/// Find a walking route with default options.
///
/// Returns waypoints from `start` to `end` inclusive, `[start]` when the two
/// are the same open cell, or `None` when no route exists or either end is
/// inside a solid block.
pub fn find_path<W>(world: &W, start: IVec3, end: IVec3) -> Option<Vec<IVec3>>
where
    W: BlockAccess + ?Sized,
{
    find_path_with(world, start, end, &PathOptions::default(), None)
}

/// Find a walking route, abandoning the search when `cancel` is set or the
/// node budget runs out.
pub fn find_path_with<W>(
    world: &W,
    start: IVec3,
    end: IVec3,
    options: &PathOptions,
    cancel: Option<&CancelToken>,
) -> Option<Vec<IVec3>>
where
    W: BlockAccess + ?Sized,
{
    if world.is_solid(start) {
        trace!("Start {} is inside a solid block", start);
        return None;
    }
    if start == end {
        return Some(vec![start]);
    }
    if world.is_solid(end) {
        trace!("Goal {} is inside a solid block", end);
        return None;
    }
    let grid = Grid {
        world,
        options,
        goal: end,
    };

    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<IVec3, f32> = HashMap::new();
    let mut came_from: HashMap<IVec3, IVec3> = HashMap::new();
    let mut closed: HashSet<IVec3> = HashSet::new();

    g_score.insert(start, 0.0);
    open.push(Frontier {
        pos: start,
        g: 0.0,
        f: distance(start, end),
    });

    let mut expanded = 0usize;
    let mut neighbours = Vec::with_capacity(16);

    while let Some(Frontier { pos, g, .. }) = open.pop() {
        if pos == end {
            let path = reconstruct(&came_from, end);
            trace!("Path of {} waypoints after {} expansions", path.len(), expanded);
            return Some(path);
        }
        if !closed.insert(pos) {
            continue;
        }

        if expanded % CANCEL_POLL == 0 && cancel.is_some_and(CancelToken::is_cancelled) {
            debug!("Path search {} -> {} cancelled", start, end);
            return None;
        }
        expanded += 1;
        if expanded > options.max_nodes {
            debug!(
                "Path search {} -> {} exhausted its budget of {} nodes",
                start, end, options.max_nodes
            );
            return None;
        }

        neighbours.clear();
        grid.neighbours(pos, &mut neighbours);
        for &next in &neighbours {
            if closed.contains(&next) {
                continue;
            }
            let tentative = g + distance(pos, next);
            if g_score.get(&next).is_some_and(|&known| known <= tentative) {
                continue;
            }
            g_score.insert(next, tentative);
            came_from.insert(next, pos);
            open.push(Frontier {
                pos: next,
                g: tentative,
                f: tentative + distance(next, end),
            });
        }
    }

    trace!("No route {} -> {} after {} expansions", start, end, expanded);
    None
}

/// Total Euclidean length of a path.
pub fn path_length(path: &[IVec3]) -> f32 {
    path.windows(2).map(|w| distance(w[0], w[1])).sum()
}

fn distance(a: IVec3, b: IVec3) -> f32 {
    (b - a).as_vec3().length()
}

fn reconstruct(came_from: &HashMap<IVec3, IVec3>, end: IVec3) -> Vec<IVec3> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Walkability rules over a block source.
struct Grid<'a, W: ?Sized> {
    world: &'a W,
    options: &'a PathOptions,
    goal: IVec3,
}

impl<W: BlockAccess + ?Sized> Grid<'_, W> {
    fn solid(&self, pos: IVec3) -> bool {
        self.world.is_solid(pos)
    }

    fn climbable(&self, pos: IVec3) -> bool {
        self.world.block(pos).is_climbable()
    }

    fn passable(&self, pos: IVec3) -> bool {
        (0..self.options.clearance.max(1)).all(|h| !self.solid(pos + IVec3::new(0, h, 0)))
    }

    fn standable(&self, pos: IVec3) -> bool {
        self.passable(pos)
            && (self.solid(pos - IVec3::Y)
                || self.climbable(pos - IVec3::Y)
                || self.climbable(pos))
    }

    /// Cells an agent can end a move in. The goal only needs to be enterable.
    fn accepts(&self, pos: IVec3) -> bool {
        self.standable(pos) || (pos == self.goal && !self.solid(pos))
    }

    fn neighbours(&self, pos: IVec3, out: &mut Vec<IVec3>) {
        for dir in CARDINALS {
            let ahead = pos + dir;
            if self.accepts(ahead) {
                out.push(ahead);
                continue;
            }

            // Step up onto a ledge, with headroom above the current cell.
            let mut stepped = false;
            for up in 1..=self.options.max_step_up {
                let lift = IVec3::new(0, up, 0);
                if !self.passable(pos + lift) {
                    break;
                }
                if self.accepts(ahead + lift) {
                    out.push(ahead + lift);
                    stepped = true;
                    break;
                }
            }
            if stepped || !self.passable(ahead) {
                continue;
            }

            // Step off a ledge and land on the first support below.
            for down in 1..=self.options.max_drop {
                let landing = ahead - IVec3::new(0, down, 0);
                if self.solid(landing) {
                    break;
                }
                if self.accepts(landing) {
                    out.push(landing);
                    break;
                }
            }
        }

        if self.options.allow_diagonals {
            for dir in DIAGONALS {
                let ahead = pos + dir;
                // No cutting corners past solid blocks.
                let side_x = pos + IVec3::new(dir.x, 0, 0);
                let side_z = pos + IVec3::new(0, 0, dir.z);
                if self.passable(side_x) && self.passable(side_z) && self.accepts(ahead) {
                    out.push(ahead);
                }
            }
        }

        // Ladders.
        if self.climbable(pos) && self.accepts(pos + IVec3::Y) {
            out.push(pos + IVec3::Y);
        }
        if self.climbable(pos - IVec3::Y) && self.passable(pos - IVec3::Y) {
            out.push(pos - IVec3::Y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brickfield_core::BlockType;
    use brickfield_world::World;

    /// Stone floor at y = 0 covering x, z in -5..25.
    fn floored() -> World {
        let world = World::new();
        for z in -5..25 {
            for x in -5..25 {
                world.set_block(x, 0, z, BlockType::STONE);
            }
        }
        world
    }

    fn assert_walkable(world: &World, path: &[IVec3]) {
        for cell in path {
            assert!(!world.is_solid(*cell), "waypoint {cell} is solid");
        }
    }

    #[test]
    fn straight_path_on_flat_ground() {
        let world = floored();
        let start = IVec3::new(0, 1, 0);
        let end = IVec3::new(10, 1, 0);
        let path = find_path(&world, start, end).unwrap();

        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        assert_eq!(path.len(), 11);
        assert_relative_eq!(path_length(&path), 10.0);
        assert_walkable(&world, &path);
    }

    #[test]
    fn same_start_and_end_is_single_point() {
        let world = floored();
        let p = IVec3::new(3, 1, 3);
        assert_eq!(find_path(&world, p, p), Some(vec![p]));
    }

    #[test]
    fn routes_around_a_wall() {
        let world = floored();
        for z in -3..=3 {
            for y in 1..=3 {
                world.set_block(5, y, z, BlockType::BRICK);
            }
        }
        let start = IVec3::new(0, 1, 0);
        let end = IVec3::new(10, 1, 0);
        let path = find_path(&world, start, end).unwrap();

        assert!(path_length(&path) > 10.0);
        assert_walkable(&world, &path);
        assert!(path.iter().all(|p| p.x != 5 || p.z.abs() > 3));
        assert_eq!(path.last(), Some(&end));
    }

    #[test]
    fn enclosed_goal_is_unreachable() {
        let world = floored();
        let goal = IVec3::new(10, 1, 10);
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (1, -1), (-1, 1), (-1, -1)] {
            for y in 1..=3 {
                world.set_block(goal.x + dx, y, goal.z + dz, BlockType::CONCRETE);
            }
        }
        world.set_block(goal.x, 3, goal.z, BlockType::CONCRETE);

        assert!(find_path(&world, IVec3::new(0, 1, 0), goal).is_none());
    }

    #[test]
    fn solid_goal_is_rejected() {
        let world = floored();
        assert!(find_path(&world, IVec3::new(0, 1, 0), IVec3::new(4, 0, 4)).is_none());
    }

    #[test]
    fn start_inside_the_floor_is_rejected() {
        let world = floored();
        let buried = IVec3::new(0, 0, 0);
        assert!(find_path(&world, buried, IVec3::new(5, 1, 0)).is_none());
        assert!(find_path(&world, buried, buried).is_none());
    }

    #[test]
    fn climbs_a_stepped_hill() {
        let world = floored();
        // Rises of one block at x = 3, 4, 5 across the whole floor.
        for z in -5..25 {
            for x in 3..15 {
                let top = (x - 2).min(3);
                for y in 1..=top {
                    world.set_block(x, y, z, BlockType::DIRT);
                }
            }
        }
        let start = IVec3::new(0, 1, 0);
        let end = IVec3::new(10, 4, 0);
        let path = find_path(&world, start, end).unwrap();

        assert_eq!(path.last(), Some(&end));
        assert!(path.iter().any(|p| p.y > 1));
        assert_walkable(&world, &path);
        for pair in path.windows(2) {
            assert!(pair[1].y - pair[0].y <= 1, "climbed more than one block");
        }
    }

    #[test]
    fn cliff_taller_than_step_is_impassable() {
        let world = floored();
        for z in -5..25 {
            for x in 3..15 {
                for y in 1..=2 {
                    world.set_block(x, y, z, BlockType::STONE);
                }
            }
        }
        assert!(find_path(&world, IVec3::new(0, 1, 0), IVec3::new(10, 3, 0)).is_none());
        // Stepping down off it is fine.
        let down = find_path(&world, IVec3::new(10, 3, 0), IVec3::new(0, 1, 0)).unwrap();
        assert_eq!(down.last(), Some(&IVec3::new(0, 1, 0)));
    }

    #[test]
    fn ladder_reaches_a_platform() {
        let world = floored();
        for y in 1..=5 {
            world.set_block(2, y, 0, BlockType::LADDER);
        }
        world.set_block(3, 5, 0, BlockType::STONE);
        let end = IVec3::new(3, 6, 0);

        let path = find_path(&world, IVec3::new(0, 1, 0), end).unwrap();
        assert_eq!(path.last(), Some(&end));
        assert!(path.iter().any(|p| world.get_block(p.x, p.y, p.z).is_climbable()));
    }

    #[test]
    fn diagonals_do_not_cut_corners() {
        let world = floored();
        for y in 1..=2 {
            world.set_block(1, y, 0, BlockType::BRICK);
            world.set_block(0, y, 1, BlockType::BRICK);
        }
        let start = IVec3::new(0, 1, 0);
        let end = IVec3::new(1, 1, 1);
        let path = find_path(&world, start, end).unwrap();
        assert!(path.len() > 2);
        assert_walkable(&world, &path);
    }

    #[test]
    fn cancelled_search_gives_up() {
        let world = floored();
        let token = CancelToken::new();
        token.cancel();
        let options = PathOptions::default();
        let far = find_path_with(
            &world,
            IVec3::new(-5, 1, -5),
            IVec3::new(24, 1, 24),
            &options,
            Some(&token),
        );
        // The flag is checked before the first expansion.
        assert!(far.is_none());
    }

    #[test]
    fn node_budget_bounds_the_search() {
        let world = floored();
        let options = PathOptions {
            max_nodes: 5,
            ..Default::default()
        };
        let start = IVec3::new(0, 1, 0);
        let end = IVec3::new(20, 1, 0);
        assert!(find_path_with(&world, start, end, &options, None).is_none());
        assert!(find_path_with(&world, start, end, &PathOptions::default(), None).is_some());
    }

    #[test]
    fn works_through_a_locked_view() {
        let world = floored();
        let view = world.view();
        let path = find_path(&view, IVec3::new(0, 1, 0), IVec3::new(0, 1, 6)).unwrap();
        assert_eq!(path.len(), 7);
    }
}
