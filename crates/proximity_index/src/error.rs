//! Error types for index operations.

use crate::quadtree::PointId;
use thiserror::Error;

/// Errors returned by [`SpatialIndex`](crate::SpatialIndex) mutations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    #[error("point ({x}, {y}) lies outside the indexed region")]
    OutOfBounds { x: f64, y: f64 },

    #[error("point {0} is not present in the index")]
    NotFound(PointId),
}
