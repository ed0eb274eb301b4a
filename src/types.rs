//! Shared primitive identifiers, coordinates, and range constants.

use serde::{Deserialize, Serialize};

/// Opaque name of a tracked subject (user or device).
pub type Identifier = String;

/// Inclusive latitude bound in degrees.
pub const MAX_LATITUDE: f64 = 90.0;
/// Inclusive longitude bound in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// A single latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in [-90, 90].
    pub latitude: f64,
    /// Longitude in [-180, 180].
    pub longitude: f64,
}

impl Coordinates {
    /// Builds a coordinate pair without range checking.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true when both components lie within their inclusive bounds.
    pub fn in_range(&self) -> bool {
        (-MAX_LATITUDE..=MAX_LATITUDE).contains(&self.latitude)
            && (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&self.longitude)
    }
}
