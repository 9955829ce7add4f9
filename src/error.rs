//! Error types for cloth construction and configuration.

use thiserror::Error;

/// Errors raised at the construction and tuning boundary of the cloth.
///
/// Nothing inside [`ClothGrid::step`](crate::ClothGrid::step) returns an
/// error: degenerate geometry is handled by the zero-vector normalize policy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClothError {
    /// Grid must have at least one node along each axis.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidGridDimensions { width: usize, height: usize },
    /// Point mass must be non-zero and finite.
    #[error("point mass must be non-zero and finite")]
    InvalidMass,
    /// Node coordinates are outside the grid.
    #[error("node ({x}, {y}) out of bounds for {width}x{height} grid")]
    NodeOutOfBounds { x: usize, y: usize, width: usize, height: usize },
    /// Plane obstacle normal has zero length.
    #[error("plane normal must have non-zero length")]
    DegenerateNormal,
}
