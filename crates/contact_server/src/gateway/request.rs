//! Request bodies and their field-by-field validation.
//!
//! Bodies are parsed into a generic JSON object first and then checked one
//! field at a time, so that the first missing or mistyped field decides the
//! error message.

use super::error::GatewayError;
use serde_json::{Map, Value};

pub type JsonObject = Map<String, Value>;

/// Body of `POST /contacts`
#[derive(Debug, Clone, PartialEq)]
pub struct ContactsRequest {
    pub id: String,
    pub contacts: Vec<String>,
}

/// Body of `POST /ping` and `POST /near`
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRequest {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
}

/// Body of `POST /_all`
#[derive(Debug, Clone, PartialEq)]
pub struct AllRequest {
    pub id: String,
    pub distance: f64,
    pub num_points: usize,
    pub lat: f64,
    pub lon: f64,
}

pub fn parse_object(body: &[u8]) -> Result<JsonObject, GatewayError> {
    serde_json::from_slice::<JsonObject>(body)
        .map_err(|_| GatewayError::bad_request("Failed to unmarshal request."))
}

impl TryFrom<&JsonObject> for ContactsRequest {
    type Error = GatewayError;

    fn try_from(data: &JsonObject) -> Result<Self, Self::Error> {
        let id = require_id(data)?;

        let raw = data
            .get("contacts")
            .and_then(Value::as_array)
            .ok_or_else(|| GatewayError::bad_request("Could not find contacts."))?;

        let contacts = raw
            .iter()
            .map(|contact| contact.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| GatewayError::bad_request("Failed to parse contacts."))?;

        Ok(Self { id, contacts })
    }
}

impl TryFrom<&JsonObject> for LocationRequest {
    type Error = GatewayError;

    fn try_from(data: &JsonObject) -> Result<Self, Self::Error> {
        let id = require_id(data)?;
        let (lat, lon) = require_location(data)?;
        Ok(Self { id, lat, lon })
    }
}

impl TryFrom<&JsonObject> for AllRequest {
    type Error = GatewayError;

    fn try_from(data: &JsonObject) -> Result<Self, Self::Error> {
        let id = require_id(data)?;

        let distance = require_number(data, "distance")?;
        if distance < 0.0 {
            return Err(GatewayError::bad_request("Invalid distance."));
        }

        let num_points = require_number(data, "num_points")?;
        if num_points < 0.0 {
            return Err(GatewayError::bad_request("Invalid num_points."));
        }

        let (lat, lon) = require_location(data)?;

        Ok(Self {
            id,
            distance,
            // fractional counts truncate, as an integer conversion would
            num_points: num_points as usize,
            lat,
            lon,
        })
    }
}

fn require_id(data: &JsonObject) -> Result<String, GatewayError> {
    data.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GatewayError::bad_request("Could not find id."))
}

fn require_number(data: &JsonObject, key: &str) -> Result<f64, GatewayError> {
    data.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| GatewayError::bad_request(format!("Could not find {key}.")))
}

fn require_location(data: &JsonObject) -> Result<(f64, f64), GatewayError> {
    let location = data
        .get("location")
        .and_then(Value::as_object)
        .ok_or_else(|| GatewayError::bad_request("Could not find location."))?;

    let lat = location
        .get("lat")
        .and_then(Value::as_f64)
        .ok_or_else(|| GatewayError::bad_request("Could not parse latitude."))?;

    let lon = location
        .get("lon")
        .and_then(Value::as_f64)
        .ok_or_else(|| GatewayError::bad_request("Could not parse longitude."))?;

    Ok((lat, lon))
}
