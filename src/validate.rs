//! Ingestion validation of raw location reports.

use std::fmt;

use serde_json::Value;

use crate::{
    location::{RawLocationReport, ValidatedLocation},
    types::{Coordinates, MAX_LATITUDE, MAX_LONGITUDE},
};

/// Reasons a report is rejected before reaching the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Identifier, coordinates, or timestamp absent or empty.
    MissingFields,
    /// Latitude or longitude is not a number.
    InvalidCoordinateType,
    /// Latitude or longitude outside its inclusive bound.
    CoordinateOutOfRange {
        /// Rejected latitude.
        latitude: f64,
        /// Rejected longitude.
        longitude: f64,
    },
}

impl ValidationError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFields => "MissingFields",
            Self::InvalidCoordinateType => "InvalidCoordinateType",
            Self::CoordinateOutOfRange { .. } => "CoordinateOutOfRange",
        }
    }

    /// Short human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingFields => "Invalid data",
            Self::InvalidCoordinateType => "Invalid coordinates",
            Self::CoordinateOutOfRange { .. } => "Coordinates out of valid range",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => f.write_str("id, coordinates and timestamp are required"),
            Self::InvalidCoordinateType => f.write_str("latitude and longitude must be numbers"),
            Self::CoordinateOutOfRange { .. } => write!(
                f,
                "latitude must be between -{MAX_LATITUDE} and {MAX_LATITUDE}, \
                 longitude between -{MAX_LONGITUDE} and {MAX_LONGITUDE}"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks presence, then coordinate type, then coordinate range.
pub fn validate(report: RawLocationReport) -> Result<ValidatedLocation, ValidationError> {
    let identifier = non_empty_string(report.id);
    let coordinates = report.coordinates.filter(is_present);
    let reported_at = non_empty_string(report.timestamp);

    let (Some(identifier), Some(coordinates), Some(reported_at)) =
        (identifier, coordinates, reported_at)
    else {
        return Err(ValidationError::MissingFields);
    };

    let latitude = coordinates.get("latitude").and_then(Value::as_f64);
    let longitude = coordinates.get("longitude").and_then(Value::as_f64);
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(ValidationError::InvalidCoordinateType);
    };

    let coordinates = Coordinates::new(latitude, longitude);
    if !coordinates.in_range() {
        return Err(ValidationError::CoordinateOutOfRange {
            latitude,
            longitude,
        });
    }

    Ok(ValidatedLocation {
        identifier,
        coordinates,
        reported_at,
    })
}

/// Null, `false`, zero and `""` count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_empty_string(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn report(value: Value) -> RawLocationReport {
        serde_json::from_value(value).expect("raw report")
    }

    #[test]
    fn accepts_well_formed_report_and_drops_extra_coordinate_fields() {
        let out = validate(report(json!({
            "id": "u1",
            "coordinates": {"latitude": -22.9, "longitude": -43.2, "altitude": 12.0},
            "timestamp": "2024-01-01T00:00:00Z",
        })))
        .expect("valid");

        assert_eq!(out.identifier, "u1");
        assert_eq!(out.coordinates, Coordinates::new(-22.9, -43.2));
        assert_eq!(out.reported_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn missing_or_empty_fields_are_rejected_first() {
        let cases = [
            json!({"coordinates": {"latitude": 1.0, "longitude": 1.0}, "timestamp": "t"}),
            json!({"id": "", "coordinates": {"latitude": 1.0, "longitude": 1.0}, "timestamp": "t"}),
            json!({"id": "u1", "coordinates": null, "timestamp": "t"}),
            json!({"id": "u1", "coordinates": "", "timestamp": "t"}),
            json!({"id": "u1", "coordinates": false, "timestamp": "t"}),
            json!({"id": "u1", "coordinates": 0, "timestamp": "t"}),
            json!({"id": "u1", "coordinates": 0.0, "timestamp": "t"}),
            json!({"id": "u1", "coordinates": {"latitude": 1.0, "longitude": 1.0}}),
            // presence wins over a bad latitude
            json!({
                "id": "u1",
                "coordinates": {"latitude": "x", "longitude": 1.0},
                "timestamp": "",
            }),
        ];
        for case in cases {
            assert_eq!(validate(report(case)), Err(ValidationError::MissingFields));
        }
    }

    #[test]
    fn non_numeric_coordinates_are_rejected() {
        let cases = [
            json!({
                "id": "u1",
                "coordinates": {"latitude": "10", "longitude": 1.0},
                "timestamp": "t",
            }),
            json!({"id": "u1", "coordinates": {"latitude": 10.0}, "timestamp": "t"}),
            json!({"id": "u1", "coordinates": "somewhere", "timestamp": "t"}),
            json!({"id": "u1", "coordinates": true, "timestamp": "t"}),
            json!({"id": "u1", "coordinates": 42, "timestamp": "t"}),
            json!({"id": "u1", "coordinates": [], "timestamp": "t"}),
        ];
        for case in cases {
            assert_eq!(
                validate(report(case)),
                Err(ValidationError::InvalidCoordinateType)
            );
        }
    }

    #[test]
    fn range_check_is_inclusive() {
        for (lat, lon) in [(-90.0, -180.0), (90.0, 180.0), (0.0, 0.0)] {
            let out = validate(report(json!({
                "id": "u1",
                "coordinates": {"latitude": lat, "longitude": lon},
                "timestamp": "t",
            })));
            assert!(out.is_ok(), "({lat}, {lon}) should be accepted");
        }

        for (lat, lon) in [(95.0, 0.0), (-90.5, 0.0), (0.0, 180.01), (0.0, -181.0)] {
            let out = validate(report(json!({
                "id": "u1",
                "coordinates": {"latitude": lat, "longitude": lon},
                "timestamp": "t",
            })));
            assert_eq!(
                out,
                Err(ValidationError::CoordinateOutOfRange {
                    latitude: lat,
                    longitude: lon
                })
            );
        }
    }

    #[test]
    fn integer_coordinates_count_as_numbers() {
        let out = validate(report(json!({
            "id": "u1",
            "coordinates": {"latitude": 10, "longitude": -20},
            "timestamp": "t",
        })))
        .expect("valid");
        assert_eq!(out.coordinates, Coordinates::new(10.0, -20.0));
    }
}
