use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ModelError;

/// Column order of the backing file. The header names are the on-disk schema.
pub const RESORT_COLUMNS: [&str; 5] = ["Region", "State", "Name", "Latitude", "Longitude"];

/// Column holding the unique resort name.
pub const NAME_COLUMN: &str = "Name";

/// A named ski location with geographic coordinates.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Resort {
    pub name: String,
    pub region: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Case-folded form of a name used for uniqueness checks.
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

pub fn validate_latitude(lat: f64) -> Result<(), ModelError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ModelError::Validation("latitude must be within [-90, 90]".into()));
    }
    Ok(())
}

pub fn validate_longitude(lon: f64) -> Result<(), ModelError> {
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ModelError::Validation("longitude must be within [-180, 180]".into()));
    }
    Ok(())
}

/// One row of the backing file, serialized in `RESORT_COLUMNS` order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResortRow {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
}

impl From<&Resort> for ResortRow {
    fn from(r: &Resort) -> Self {
        Self {
            region: r.region.clone(),
            state: r.state.clone(),
            name: r.name.clone(),
            latitude: r.latitude,
            longitude: r.longitude,
        }
    }
}

impl TryFrom<ResortRow> for Resort {
    type Error = ModelError;

    /// Rows read back from disk go through the same coordinate checks as new input.
    fn try_from(row: ResortRow) -> Result<Self, Self::Error> {
        validate_latitude(row.latitude)?;
        validate_longitude(row.longitude)?;
        Ok(Resort {
            name: row.name,
            region: row.region,
            state: row.state,
            latitude: row.latitude,
            longitude: row.longitude,
        })
    }
}

/// Untyped create payload. Every field is optional here so that a missing field
/// and a field of the wrong type both surface as `ModelError::Validation`
/// instead of a deserializer rejection.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResortCandidate {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub region: Option<Value>,
    #[serde(default)]
    pub state: Option<Value>,
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
}

impl ResortCandidate {
    /// Accepts only JSON objects; arrays would otherwise bind positionally.
    pub fn from_json(value: Value) -> Result<Self, ModelError> {
        if !value.is_object() {
            return Err(ModelError::Validation("resort payload must be a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| ModelError::Validation(e.to_string()))
    }

    /// Check required fields, types and coordinate ranges; yields the resort on success.
    pub fn validate(&self) -> Result<Resort, ModelError> {
        let name = required_string("name", self.name.as_ref())?;
        let region = required_string("region", self.region.as_ref())?;
        let state = required_string("state", self.state.as_ref())?;
        let latitude = required_number("latitude", self.latitude.as_ref())?;
        let longitude = required_number("longitude", self.longitude.as_ref())?;
        validate_latitude(latitude)?;
        validate_longitude(longitude)?;
        Ok(Resort { name, region, state, latitude, longitude })
    }
}

impl From<&Resort> for ResortCandidate {
    fn from(r: &Resort) -> Self {
        Self {
            name: Some(Value::from(r.name.clone())),
            region: Some(Value::from(r.region.clone())),
            state: Some(Value::from(r.state.clone())),
            latitude: Some(Value::from(r.latitude)),
            longitude: Some(Value::from(r.longitude)),
        }
    }
}

fn required_string(field: &str, value: Option<&Value>) -> Result<String, ModelError> {
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ModelError::Validation(format!("{field} must be a string"))),
        None => Err(ModelError::Validation(format!("{field} is required"))),
    }
}

fn required_number(field: &str, value: Option<&Value>) -> Result<f64, ModelError> {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ModelError::Validation(format!("{field} must be a number"))),
        Some(_) => Err(ModelError::Validation(format!("{field} must be a number"))),
        None => Err(ModelError::Validation(format!("{field} is required"))),
    }
}
