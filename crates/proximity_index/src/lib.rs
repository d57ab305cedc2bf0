//! # Proximity Index
//!
//! A mutable region quadtree for points that move. It supports three
//! operations:
//!
//! * **insert** - add a point and get back its identity ([`PointId`])
//! * **update** - relocate a point by identity, keeping the id
//! * **k_nearest** - up to `k` points inside a fixed window that pass a
//!   caller-supplied filter, nearest to the window center first
//!
//! ```rust
//! use proximity_index::{BoundingBox, Point, SpatialIndex};
//!
//! let world = BoundingBox::new(&Point::<()>::bare(-90.0, -180.0), &Point::<()>::bare(90.0, 180.0));
//! let mut index = SpatialIndex::new(world);
//!
//! let alice = index.insert(Point::new(51.50, -0.10, "alice")).unwrap();
//! index.update(&alice, Point::new(51.51, -0.11, "alice")).unwrap();
//!
//! let window = BoundingBox::from_center(&Point::<()>::bare(51.5, -0.1), 1.0);
//! let near = index.k_nearest(&window, 5, |p| p.payload == Some("alice"));
//! assert_eq!(near.len(), 1);
//! ```
//!
//! The index is not synchronized. Distances are planar and only used for
//! ranking.

pub mod error;
pub mod geometry;
pub mod quadtree;

pub use error::IndexError;
pub use geometry::{BoundingBox, Point};
pub use quadtree::{
    IndexConfig, IndexStats, IndexedPoint, NodeStats, PointId, QuadNode, SpatialIndex,
    DEFAULT_MAX_DEPTH, DEFAULT_NODE_CAPACITY,
};
