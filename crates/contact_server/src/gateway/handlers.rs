//! HTTP handlers for the four gateway endpoints.
//!
//! Each handler follows the same order: reject non-POST, read the body,
//! parse a JSON object, validate fields, call the manager, serialize.

use super::error::GatewayError;
use super::request::{parse_object, AllRequest, ContactsRequest, JsonObject, LocationRequest};
use super::GatewayState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::BTreeMap;

type BodyResult = Result<Bytes, BytesRejection>;

/// Response of `POST /near`
#[derive(Debug, Serialize)]
pub struct NearResponse {
    pub contacts: Vec<String>,
}

/// One entry of the `POST /_all` response map
#[derive(Debug, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// `POST /contacts`: add contacts to a user's contact list
pub async fn contacts_handler(
    State(state): State<GatewayState>,
    method: Method,
    body: BodyResult,
) -> Result<Response, GatewayError> {
    let data = read_object(&method, body)?;
    let request = ContactsRequest::try_from(&data)?;

    state.manager.add_contacts(&request.id, request.contacts);
    Ok(StatusCode::OK.into_response())
}

/// `POST /ping`: update a user's location
pub async fn ping_handler(
    State(state): State<GatewayState>,
    method: Method,
    body: BodyResult,
) -> Result<Response, GatewayError> {
    let data = read_object(&method, body)?;
    let request = LocationRequest::try_from(&data)?;

    state
        .manager
        .update_location(&request.id, request.lat, request.lon)?;
    Ok(StatusCode::OK.into_response())
}

/// `POST /near`: contacts of the caller near the given location
pub async fn near_handler(
    State(state): State<GatewayState>,
    method: Method,
    body: BodyResult,
) -> Result<Response, GatewayError> {
    let data = read_object(&method, body)?;
    let request = LocationRequest::try_from(&data)?;

    let contacts = state
        .manager
        .near_contacts(&request.id, request.lat, request.lon);

    json_response(&NearResponse { contacts }, "Could not marshal contacts.")
}

/// `POST /_all`: every tracked point near a location, for diagnostics
pub async fn all_handler(
    State(state): State<GatewayState>,
    method: Method,
    body: BodyResult,
) -> Result<Response, GatewayError> {
    let data = read_object(&method, body)?;
    let request = AllRequest::try_from(&data)?;

    let users: BTreeMap<String, Coordinates> = state
        .manager
        .all_near(request.lat, request.lon, request.distance, request.num_points)
        .into_iter()
        .map(|point| (point.id, Coordinates { lat: point.lat, lon: point.lon }))
        .collect();

    json_response(&users, "Could not marshal response.")
}

fn read_object(method: &Method, body: BodyResult) -> Result<JsonObject, GatewayError> {
    if *method != Method::POST {
        return Err(GatewayError::bad_request("Non POST"));
    }

    let body = body.map_err(|_| GatewayError::bad_request("Could not read body."))?;
    parse_object(&body)
}

fn json_response<T: Serialize>(value: &T, failure: &str) -> Result<Response, GatewayError> {
    let body = serde_json::to_vec(value).map_err(|_| GatewayError::internal(failure))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
