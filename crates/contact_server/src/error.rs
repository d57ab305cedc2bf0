//! Error types for the contact server.

use thiserror::Error;

/// Failures of [`LocationManager`](crate::LocationManager) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    /// The reported location lies outside the configured world bounds.
    #[error("location ({lat}, {lon}) is outside the world bounds")]
    OutOfBounds { lat: f64, lon: f64 },

    /// The user registry and the spatial index disagree.
    #[error("internal consistency fault: {0}")]
    Inconsistent(String),
}

/// Failures while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
