//! Walkable-route search over the Brickfield block world.

pub mod pathfinding;

pub use pathfinding::{find_path, find_path_with, path_length, CancelToken, PathOptions};
