//! User registry and spatial index behind a single lock.
//!
//! The [`LocationManager`] owns one [`SpatialIndex`] and the map of known
//! users. Every operation, queries included, takes the same exclusive lock
//! for its whole duration: the index is not safe for concurrent reads and
//! writes, so access is fully serialized. No operation awaits or performs
//! I/O while holding the lock.

use crate::config::ServerConfig;
use crate::error::LocationError;
use parking_lot::Mutex;
use proximity_index::{BoundingBox, IndexError, IndexStats, IndexedPoint, Point, SpatialIndex};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, warn};

/// A tracked user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    /// Directional: listing someone does not make them list you back
    pub contacts: HashSet<String>,
    /// The user's single point in the index, once they have pinged
    pub location: Option<IndexedPoint<String>>,
}

impl User {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            contacts: HashSet::new(),
            location: None,
        }
    }
}

/// One row of a diagnostic `/_all` query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyPoint {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
}

struct LocationState {
    users: HashMap<String, User>,
    index: SpatialIndex<String>,
}

/// Tracks users, their contacts and their positions.
pub struct LocationManager {
    state: Mutex<LocationState>,
    world_bounds: BoundingBox,
    nearest_contacts: usize,
    nearest_distance: f64,
}

impl LocationManager {
    pub fn new(config: &ServerConfig) -> Self {
        let world_bounds = config.world_bounds.to_bounding_box();
        Self {
            state: Mutex::new(LocationState {
                users: HashMap::new(),
                index: SpatialIndex::with_config(world_bounds, config.index),
            }),
            world_bounds,
            nearest_contacts: config.nearest_contacts,
            nearest_distance: config.nearest_distance,
        }
    }

    pub fn world_bounds(&self) -> BoundingBox {
        self.world_bounds
    }

    /// Adds `contacts` to the contact set of `id`, creating the user if
    /// needed. Duplicates are ignored.
    pub fn add_contacts<I, S>(&self, id: &str, contacts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.lock();

        let user = state.users.entry(id.to_string()).or_insert_with(|| {
            info!("new user {} adding contacts", id);
            User::new(id)
        });

        let before = user.contacts.len();
        user.contacts.extend(contacts.into_iter().map(Into::into));
        debug!(
            "user {} now has {} contacts ({} new)",
            id,
            user.contacts.len(),
            user.contacts.len() - before
        );
    }

    /// Records a ping from `id` at `(lat, lon)`.
    ///
    /// The first ping inserts the user's point; later pings relocate that same
    /// point. A ping at the current position does not touch the index. Out of
    /// bounds pings are rejected before any state changes.
    pub fn update_location(&self, id: &str, lat: f64, lon: f64) -> Result<(), LocationError> {
        let target = Point::new(lat, lon, id.to_string());
        if !self.world_bounds.contains(&target) {
            warn!("rejecting location ({}, {}) for user {}: outside world bounds", lat, lon, id);
            return Err(LocationError::OutOfBounds { lat, lon });
        }

        let mut state = self.state.lock();
        let LocationState { users, index } = &mut *state;

        let user = users.entry(id.to_string()).or_insert_with(|| {
            info!("new user {} at {}, {}", id, lat, lon);
            User::new(id)
        });

        match &user.location {
            None => {
                let entry = index.insert(target).map_err(|e| index_error(id, e))?;
                user.location = Some(entry);
            }
            Some(current) => {
                if current.point.same_position(&target) {
                    return Ok(());
                }
                debug!("user {} at {}, {}", id, lat, lon);
                let moved = index.update(current, target).map_err(|e| index_error(id, e))?;
                user.location = Some(moved);
            }
        }

        Ok(())
    }

    /// Ids of `id`'s contacts located inside the query window around
    /// `(lat, lon)`, nearest first, at most `nearest_contacts` of them.
    ///
    /// Unknown users and users without contacts get an empty list without
    /// the index being queried. The caller never appears in its own result.
    pub fn near_contacts(&self, id: &str, lat: f64, lon: f64) -> Vec<String> {
        let mut state = self.state.lock();
        let LocationState { users, index } = &mut *state;

        let contacts = match users.get(id) {
            Some(user) if !user.contacts.is_empty() => &user.contacts,
            _ => return Vec::new(),
        };

        let window = BoundingBox::from_center(&Point::<()>::bare(lat, lon), self.nearest_distance);
        let found = index.k_nearest(&window, self.nearest_contacts, |point| {
            point
                .payload
                .as_ref()
                .is_some_and(|other| other != id && contacts.contains(other))
        });

        found
            .into_iter()
            .filter_map(|entry| entry.point.payload)
            .collect()
    }

    /// Up to `num_points` points of any user within `distance` of
    /// `(lat, lon)`, nearest first. No contact filtering.
    pub fn all_near(&self, lat: f64, lon: f64, distance: f64, num_points: usize) -> Vec<NearbyPoint> {
        let mut state = self.state.lock();

        let window = BoundingBox::from_center(&Point::<()>::bare(lat, lon), distance);
        state
            .index
            .k_nearest(&window, num_points, |point| point.payload.is_some())
            .into_iter()
            .filter_map(|entry| {
                let (lat, lon) = entry.point.coordinates();
                entry.point.payload.map(|id| NearbyPoint { id, lat, lon })
            })
            .collect()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().users.len()
    }

    /// Points held by the index, across all users.
    pub fn point_count(&self) -> usize {
        self.state.lock().index.len()
    }

    /// Points in the index whose payload is `id`.
    pub fn points_for(&self, id: &str) -> usize {
        self.state
            .lock()
            .index
            .points()
            .into_iter()
            .filter(|entry| entry.point.payload.as_deref() == Some(id))
            .count()
    }

    /// Sorted contact ids of `id`, if the user is known.
    pub fn contacts_of(&self, id: &str) -> Option<Vec<String>> {
        let state = self.state.lock();
        state.users.get(id).map(|user| {
            let mut contacts: Vec<String> = user.contacts.iter().cloned().collect();
            contacts.sort();
            contacts
        })
    }

    /// Last accepted position of `id`.
    pub fn location_of(&self, id: &str) -> Option<(f64, f64)> {
        let state = self.state.lock();
        state
            .users
            .get(id)
            .and_then(|user| user.location.as_ref())
            .map(|entry| entry.point.coordinates())
    }

    pub fn index_stats(&self) -> IndexStats {
        self.state.lock().index.stats()
    }
}

fn index_error(id: &str, err: IndexError) -> LocationError {
    match err {
        IndexError::OutOfBounds { x, y } => {
            warn!("location ({}, {}) for user {} rejected by index", x, y, id);
            LocationError::OutOfBounds { lat: x, lon: y }
        }
        IndexError::NotFound(point) => {
            error!("user {} references point {} missing from the index", id, point);
            LocationError::Inconsistent(format!("user {id} references missing point {point}"))
        }
    }
}
