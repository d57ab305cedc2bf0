use crate::error::LocationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

/// A failed request, rendered as a plain-text body with the matching status.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("Bad Request. {0}")]
    BadRequest(String),
    #[error("Internal Server Error. {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::BadRequest(reason.into())
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LocationError> for GatewayError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::OutOfBounds { .. } => Self::BadRequest("Location out of bounds.".to_string()),
            LocationError::Inconsistent(_) => Self::Internal("Could not update location.".to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!("{} {}", status.as_u16(), self);
        (status, self.to_string()).into_response()
    }
}
