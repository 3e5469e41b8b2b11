//! Error types for the engine.

use thiserror::Error;

/// Engine-wide error type.
///
/// Block queries, raycasts and path searches never produce these; they are
/// reserved for construction and validation seams.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data error
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Out of bounds access
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    /// Block id with no entry in the block table
    #[error("Unknown block id: {0}")]
    UnknownBlock(u8),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
