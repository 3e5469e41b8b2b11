//! Ray queries against the Brickfield block world.
//!
//! Collision response is left to callers; this crate answers "what does this
//! ray touch first".

pub mod raycast;

pub use raycast::{raycast, raycast_with, RaycastResult, VoxelHit};
