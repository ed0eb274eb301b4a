//! Location report, validated location, and stored record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Coordinates, Identifier};

/// Untrusted report exactly as it arrived on the wire.
///
/// Every field is kept as raw JSON so the validator can tell a missing
/// field apart from one of the wrong type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocationReport {
    /// Reporter identifier; expected to be a non-empty string.
    #[serde(default)]
    pub id: Option<Value>,
    /// Object carrying numeric `latitude` and `longitude`.
    #[serde(default)]
    pub coordinates: Option<Value>,
    /// Caller-supplied timestamp string, stored verbatim.
    #[serde(default)]
    pub timestamp: Option<Value>,
}

/// Well-typed report as produced by a reporter client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    /// Reporter identifier.
    pub id: Identifier,
    /// Reported position.
    pub coordinates: Coordinates,
    /// Caller-supplied timestamp.
    pub timestamp: String,
}

impl From<LocationReport> for RawLocationReport {
    fn from(report: LocationReport) -> Self {
        Self {
            id: Some(Value::String(report.id)),
            coordinates: Some(serde_json::json!({
                "latitude": report.coordinates.latitude,
                "longitude": report.coordinates.longitude,
            })),
            timestamp: Some(Value::String(report.timestamp)),
        }
    }
}

/// Report that passed validation and is ready to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLocation {
    /// Reporter identifier.
    pub identifier: Identifier,
    /// Coordinates narrowed to latitude/longitude.
    pub coordinates: Coordinates,
    /// Caller-supplied timestamp, untouched.
    pub reported_at: String,
}

/// Immutable stored observation of one identifier's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Reporter identifier.
    #[serde(rename = "id")]
    pub identifier: Identifier,
    /// Reported position.
    pub coordinates: Coordinates,
    /// Caller-supplied timestamp.
    #[serde(rename = "timestamp")]
    pub reported_at: String,
    /// Time the store accepted the record.
    #[serde(rename = "createdAt")]
    pub received_at: DateTime<Utc>,
}

impl LocationRecord {
    /// Materializes a record from a validated location and receive time.
    pub fn from_validated(location: ValidatedLocation, received_at: DateTime<Utc>) -> Self {
        Self {
            identifier: location.identifier,
            coordinates: location.coordinates,
            reported_at: location.reported_at,
            received_at,
        }
    }
}
