//! Region quadtree holding moving points.
//!
//! Leaves hold up to `node_capacity` points. A full leaf splits into four
//! quadrants (NW, NE, SW, SE) before accepting another point and pushes its
//! points down by the same routing rule. Relocation removes a point from its
//! leaf and re-inserts it; emptied leaves are never merged back.

use crate::error::IndexError;
use crate::geometry::{BoundingBox, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum points per leaf before it subdivides
pub const DEFAULT_NODE_CAPACITY: usize = 8;
/// Maximum depth for quadtree subdivision
pub const DEFAULT_MAX_DEPTH: u8 = 10;

/// Identity of a point inside one index. Survives relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(u64);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A point as stored by the index, tagged with its identity.
#[derive(Debug, Clone)]
pub struct IndexedPoint<T> {
    pub id: PointId,
    pub point: Point<T>,
}

/// Tuning knobs for node subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Points a leaf holds before it subdivides
    pub node_capacity: usize,
    /// Leaves at this depth never subdivide and may exceed capacity
    pub max_depth: u8,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            node_capacity: DEFAULT_NODE_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A node in the quadtree
#[derive(Debug)]
pub struct QuadNode<T> {
    /// Region covered by this node
    pub region: BoundingBox,
    /// Points stored here (only if leaf)
    pub points: Vec<IndexedPoint<T>>,
    /// Child nodes (NW, NE, SW, SE) - None if leaf
    pub children: Option<Box<[QuadNode<T>; 4]>>,
    /// Current depth in tree
    pub depth: u8,
}

impl<T> QuadNode<T> {
    pub fn new(region: BoundingBox, depth: u8) -> Self {
        Self {
            region,
            points: Vec::new(),
            children: None,
            depth,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Places an entry below this node. The caller has already checked that
    /// the entry lies inside `self.region`.
    fn insert(&mut self, entry: IndexedPoint<T>, config: &IndexConfig) {
        if self.children.is_none() {
            if self.points.len() < config.node_capacity || self.depth >= config.max_depth {
                self.points.push(entry);
                return;
            }
            self.subdivide(config);
        }

        let child_index = self.child_index(&entry.point);
        if let Some(children) = &mut self.children {
            children[child_index].insert(entry, config);
        }
    }

    /// Splits this leaf into four quadrants and redistributes its points
    fn subdivide(&mut self, config: &IndexConfig) {
        let BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        } = self.region;
        let mid_x = (min_x + max_x) / 2.0;
        let mid_y = (min_y + max_y) / 2.0;
        let child_depth = self.depth + 1;

        let quadrant = |min_x, min_y, max_x, max_y| {
            QuadNode::new(
                BoundingBox {
                    min_x,
                    min_y,
                    max_x,
                    max_y,
                },
                child_depth,
            )
        };

        self.children = Some(Box::new([
            // NW (0): top-left
            quadrant(min_x, mid_y, mid_x, max_y),
            // NE (1): top-right
            quadrant(mid_x, mid_y, max_x, max_y),
            // SW (2): bottom-left
            quadrant(min_x, min_y, mid_x, mid_y),
            // SE (3): bottom-right
            quadrant(mid_x, min_y, max_x, mid_y),
        ]));

        let points = std::mem::take(&mut self.points);
        for entry in points {
            let child_index = self.child_index(&entry.point);
            if let Some(children) = &mut self.children {
                children[child_index].insert(entry, config);
            }
        }
    }

    /// Gets the child index (0-3) for a point. Points on a split line go to
    /// the east / north side.
    fn child_index<P>(&self, point: &Point<P>) -> usize {
        let mid_x = (self.region.min_x + self.region.max_x) / 2.0;
        let mid_y = (self.region.min_y + self.region.max_y) / 2.0;

        let right = point.x >= mid_x;
        let top = point.y >= mid_y;

        match (top, right) {
            (true, false) => 0,  // NW
            (true, true) => 1,   // NE
            (false, false) => 2, // SW
            (false, true) => 3,  // SE
        }
    }

    /// Removes the entry with `id`, following the route `at` would take.
    fn remove<P>(&mut self, id: PointId, at: &Point<P>) -> Option<IndexedPoint<T>> {
        if self.children.is_none() {
            let position = self.points.iter().position(|entry| entry.id == id)?;
            return Some(self.points.remove(position));
        }

        let child_index = self.child_index(at);
        self.children
            .as_mut()
            .and_then(|children| children[child_index].remove(id, at))
    }

    /// Collects entries inside `window` accepted by `filter`, skipping
    /// subtrees whose region does not touch the window.
    fn collect_within<'a, F>(
        &'a self,
        window: &BoundingBox,
        filter: &F,
        out: &mut Vec<&'a IndexedPoint<T>>,
    ) where
        F: Fn(&Point<T>) -> bool,
    {
        if !self.region.intersects(window) {
            return;
        }

        for entry in &self.points {
            if window.contains(&entry.point) && filter(&entry.point) {
                out.push(entry);
            }
        }

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.collect_within(window, filter, out);
            }
        }
    }

    fn collect_all<'a>(&'a self, out: &mut Vec<&'a IndexedPoint<T>>) {
        out.extend(self.points.iter());
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.collect_all(out);
            }
        }
    }

    /// Gets statistics about this subtree
    pub fn get_stats(&self) -> NodeStats {
        let mut stats = NodeStats {
            total_points: self.points.len(),
            max_depth: self.depth,
            leaf_nodes: 0,
            internal_nodes: 0,
        };

        match &self.children {
            None => stats.leaf_nodes = 1,
            Some(children) => {
                stats.internal_nodes = 1;
                for child in children.iter() {
                    let child_stats = child.get_stats();
                    stats.total_points += child_stats.total_points;
                    stats.max_depth = stats.max_depth.max(child_stats.max_depth);
                    stats.leaf_nodes += child_stats.leaf_nodes;
                    stats.internal_nodes += child_stats.internal_nodes;
                }
            }
        }

        stats
    }
}

/// Shape of a subtree
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStats {
    pub total_points: usize,
    pub max_depth: u8,
    pub leaf_nodes: usize,
    pub internal_nodes: usize,
}

/// Counters and tree shape for monitoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_insertions: usize,
    pub total_updates: usize,
    pub total_queries: usize,
    pub last_query_result_count: usize,
    pub current_depth: u8,
    pub leaf_nodes: usize,
    pub internal_nodes: usize,
}

impl Default for IndexStats {
    fn default() -> Self {
        Self {
            total_insertions: 0,
            total_updates: 0,
            total_queries: 0,
            last_query_result_count: 0,
            current_depth: 0,
            leaf_nodes: 1, // root starts as a leaf
            internal_nodes: 0,
        }
    }
}

/// Point index over a fixed region.
///
/// Not synchronized: callers that share an index across threads must wrap
/// it in a lock.
pub struct SpatialIndex<T> {
    root: QuadNode<T>,
    config: IndexConfig,
    point_count: usize,
    next_id: u64,
    stats: IndexStats,
}

impl<T> SpatialIndex<T> {
    /// Creates an empty index over `region` with default tuning.
    pub fn new(region: BoundingBox) -> Self {
        Self::with_config(region, IndexConfig::default())
    }

    pub fn with_config(region: BoundingBox, config: IndexConfig) -> Self {
        Self {
            root: QuadNode::new(region, 0),
            config: IndexConfig {
                node_capacity: config.node_capacity.max(1),
                ..config
            },
            point_count: 0,
            next_id: 0,
            stats: IndexStats::default(),
        }
    }

    pub fn region(&self) -> BoundingBox {
        self.root.region
    }

    pub fn config(&self) -> IndexConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.point_count
    }

    pub fn is_empty(&self) -> bool {
        self.point_count == 0
    }

    pub fn root(&self) -> &QuadNode<T> {
        &self.root
    }

    /// Inserts a new point and returns the stored entry with its fresh id.
    ///
    /// Fails with [`IndexError::OutOfBounds`] if the point is outside the
    /// index region; the tree is left untouched in that case.
    pub fn insert(&mut self, point: Point<T>) -> Result<IndexedPoint<T>, IndexError>
    where
        T: Clone,
    {
        self.check_bounds(&point)?;

        let entry = IndexedPoint {
            id: PointId(self.next_id),
            point,
        };
        self.next_id += 1;

        self.root.insert(entry.clone(), &self.config);
        self.point_count += 1;
        self.stats.total_insertions += 1;
        Ok(entry)
    }

    /// Moves a previously inserted point to the position of `new`.
    ///
    /// Returns immediately if the coordinates are unchanged. Otherwise the
    /// old entry is taken out of its leaf and `new` is inserted under the
    /// same id. The target is bounds-checked before anything is removed, so
    /// an out-of-bounds move leaves the old entry where it was.
    pub fn update(
        &mut self,
        old: &IndexedPoint<T>,
        new: Point<T>,
    ) -> Result<IndexedPoint<T>, IndexError>
    where
        T: Clone,
    {
        if old.point.same_position(&new) {
            return Ok(old.clone());
        }

        self.check_bounds(&new)?;

        if self.root.remove(old.id, &old.point).is_none() {
            return Err(IndexError::NotFound(old.id));
        }

        let entry = IndexedPoint { id: old.id, point: new };
        self.root.insert(entry.clone(), &self.config);
        self.stats.total_updates += 1;
        Ok(entry)
    }

    /// Returns up to `k` points inside `window` accepted by `filter`, nearest
    /// to the window center first.
    ///
    /// The window is never grown: if fewer than `k` points qualify, fewer are
    /// returned. Equal distances keep traversal order (NW, NE, SW, SE, then
    /// insertion order within a leaf).
    pub fn k_nearest<F>(&mut self, window: &BoundingBox, k: usize, filter: F) -> Vec<IndexedPoint<T>>
    where
        T: Clone,
        F: Fn(&Point<T>) -> bool,
    {
        self.stats.total_queries += 1;

        if k == 0 {
            self.stats.last_query_result_count = 0;
            return Vec::new();
        }

        let mut candidates = Vec::new();
        self.root.collect_within(window, &filter, &mut candidates);

        let center = window.center();
        let mut ranked: Vec<(f64, &IndexedPoint<T>)> = candidates
            .into_iter()
            .map(|entry| (entry.point.squared_distance(&center), entry))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked.truncate(k);

        let results: Vec<IndexedPoint<T>> = ranked.into_iter().map(|(_, entry)| entry.clone()).collect();
        self.stats.last_query_result_count = results.len();
        results
    }

    /// Every stored entry, in traversal order.
    pub fn points(&self) -> Vec<&IndexedPoint<T>> {
        let mut out = Vec::with_capacity(self.point_count);
        self.root.collect_all(&mut out);
        out
    }

    /// Gets performance statistics
    pub fn stats(&self) -> IndexStats {
        let mut stats = self.stats.clone();
        let node_stats = self.root.get_stats();
        stats.current_depth = node_stats.max_depth;
        stats.leaf_nodes = node_stats.leaf_nodes;
        stats.internal_nodes = node_stats.internal_nodes;
        stats
    }

    fn check_bounds(&self, point: &Point<T>) -> Result<(), IndexError> {
        if self.root.region.contains(point) {
            Ok(())
        } else {
            Err(IndexError::OutOfBounds {
                x: point.x,
                y: point.y,
            })
        }
    }
}
