//! JSON-over-HTTP gateway in front of the [`LocationManager`].
//!
//! | Endpoint    | Body                                             | Response                 |
//! |-------------|--------------------------------------------------|--------------------------|
//! | `/contacts` | `{id, contacts: [..]}`                           | empty                    |
//! | `/ping`     | `{id, location: {lat, lon}}`                     | empty                    |
//! | `/near`     | `{id, location: {lat, lon}}`                     | `{contacts: [..]}`       |
//! | `/_all`     | `{id, distance, num_points, location: {lat, lon}}` | `{id: {lat, lon}, ..}` |
//!
//! Routes accept every method so that non-POST requests get a 400 with a
//! reason instead of a bare 405.

mod error;
mod handlers;
mod request;

pub use error::GatewayError;
pub use handlers::{Coordinates, NearResponse};
pub use request::{AllRequest, ContactsRequest, LocationRequest};

use crate::manager::LocationManager;
use axum::routing::any;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by every handler
#[derive(Clone)]
pub struct GatewayState {
    pub manager: Arc<LocationManager>,
}

/// Builds the gateway router around `manager`.
pub fn router(manager: Arc<LocationManager>) -> Router {
    Router::new()
        .route("/contacts", any(handlers::contacts_handler))
        .route("/ping", any(handlers::ping_handler))
        .route("/near", any(handlers::near_handler))
        .route("/_all", any(handlers::all_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(GatewayState { manager })
}
