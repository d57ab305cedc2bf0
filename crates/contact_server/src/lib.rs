//! # Contact Server
//!
//! Tracks where users are and answers "which of my contacts are near me".
//!
//! ## Architecture Overview
//!
//! * **[`LocationManager`]** - user registry (contacts and current point) plus
//!   the spatial index, both behind one exclusive lock
//! * **[`gateway`]** - axum router translating JSON requests into manager
//!   calls and manager results into JSON responses
//! * **[`ContactServer`]** - owns the manager and serves the gateway
//!
//! ### Request Flow
//!
//! 1. Client POSTs a JSON body to `/contacts`, `/ping`, `/near` or `/_all`
//! 2. The gateway validates fields one by one, rejecting bad input with 400
//! 3. The manager takes its lock, updates or queries the index and user map
//! 4. The gateway serializes the result
//!
//! ## Error Handling
//!
//! * [`LocationError`] - manager failures (out-of-bounds pings, consistency faults)
//! * [`GatewayError`] - request failures, rendered as 400 or 500
//! * [`ServerError`] - bind and serve failures
//!
//! ## Distances
//!
//! Query windows are squares in raw latitude/longitude units. The default
//! `nearest_distance` of 10 therefore spans degrees, not metres.

pub mod config;
pub mod error;
pub mod gateway;
pub mod manager;
pub mod server;

pub use config::{ServerConfig, WorldBounds, DEFAULT_NEAREST_CONTACTS, DEFAULT_NEAREST_DISTANCE};
pub use error::{LocationError, ServerError};
pub use gateway::GatewayError;
pub use manager::{LocationManager, NearbyPoint, User};
pub use server::ContactServer;
