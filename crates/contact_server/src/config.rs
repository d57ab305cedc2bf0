//! Server configuration types and defaults.

use proximity_index::{BoundingBox, IndexConfig, Point};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Contacts returned by a `/near` query at most
pub const DEFAULT_NEAREST_CONTACTS: usize = 5;
/// Half-extent of the `/near` query window, in coordinate units
pub const DEFAULT_NEAREST_DISTANCE: f64 = 10.0;
/// Default gateway port
pub const DEFAULT_PORT: u16 = 9999;

/// Latitude/longitude rectangle that every reported location must fall in.
///
/// Latitude maps to the index x axis and longitude to the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl WorldBounds {
    pub fn to_bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            &Point::<()>::bare(self.min_lat, self.min_lon),
            &Point::<()>::bare(self.max_lat, self.max_lon),
        )
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min_lat: -85.0,
            max_lat: 85.0,
            min_lon: -185.0,
            max_lon: 185.0,
        }
    }
}

/// Configuration structure for the contact server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The socket address to bind the HTTP gateway to
    pub bind_address: SocketAddr,

    /// Region covered by the spatial index
    pub world_bounds: WorldBounds,

    /// Cap on the number of contacts a `/near` query returns
    pub nearest_contacts: usize,

    /// Half-extent of the `/near` window. Degrees, despite historically being
    /// documented as metres.
    pub nearest_distance: f64,

    /// Quadtree tuning
    pub index: IndexConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            world_bounds: WorldBounds::default(),
            nearest_contacts: DEFAULT_NEAREST_CONTACTS,
            nearest_distance: DEFAULT_NEAREST_DISTANCE,
            index: IndexConfig::default(),
        }
    }
}
