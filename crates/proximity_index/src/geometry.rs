//! Planar geometry primitives used by the index.
//!
//! Coordinates are raw `f64` pairs. Nothing here knows about the curvature of
//! the earth: a "radius" is a half-extent in coordinate units, and distances
//! are only ever used to rank candidates against each other.

use serde::{Deserialize, Serialize};

/// A coordinate pair with an optional payload.
///
/// The payload is opaque to the index; it is carried through insertion and
/// relocation unchanged and handed back with query results.
#[derive(Debug, Clone)]
pub struct Point<T> {
    pub x: f64,
    pub y: f64,
    pub payload: Option<T>,
}

impl<T> Point<T> {
    /// Creates a point carrying `payload`.
    pub fn new(x: f64, y: f64, payload: T) -> Self {
        Self {
            x,
            y,
            payload: Some(payload),
        }
    }

    /// Creates a point with no payload, e.g. a query corner.
    pub fn bare(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            payload: None,
        }
    }

    pub fn coordinates(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// True when both coordinates match exactly. Payloads are ignored.
    pub fn same_position<U>(&self, other: &Point<U>) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Squared Euclidean distance in coordinate space.
    pub fn squared_distance<U>(&self, other: &Point<U>) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Axis-aligned rectangle with `min_x <= max_x` and `min_y <= max_y`.
///
/// Used both as the region owned by a quadtree node and as a query window.
/// Edges are inclusive for containment and intersection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Builds a box from two arbitrary corners, normalizing them into min/max.
    pub fn new<A, B>(a: &Point<A>, b: &Point<B>) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Square window of side `2 * half_extent` centered on `center`.
    pub fn from_center<T>(center: &Point<T>, half_extent: f64) -> Self {
        Self::from_center_extents(center, half_extent, half_extent)
    }

    /// Window centered on `center` with separate half-extents per axis.
    pub fn from_center_extents<T>(center: &Point<T>, half_x: f64, half_y: f64) -> Self {
        let half_x = half_x.abs();
        let half_y = half_y.abs();
        Self {
            min_x: center.x - half_x,
            min_y: center.y - half_y,
            max_x: center.x + half_x,
            max_y: center.y + half_y,
        }
    }

    pub fn center(&self) -> Point<()> {
        Point::bare(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains<T>(&self, point: &Point<T>) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(other.min_x > self.max_x
            || other.max_x < self.min_x
            || other.min_y > self.max_y
            || other.max_y < self.min_y)
    }
}
