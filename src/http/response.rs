//! JSON envelopes returned by every route.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Successful response wrapping an optional payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Human-readable outcome.
    pub message: String,
    /// Payload, omitted when there is none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Server time of the response.
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }
}

/// Failed request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short title.
    pub error: String,
    /// Stable machine-readable kind, e.g. `CoordinateOutOfRange`.
    pub kind: String,
    /// Human-readable detail.
    pub message: String,
    /// Server time of the response.
    pub timestamp: DateTime<Utc>,
}

/// Liveness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Process uptime in seconds.
    pub uptime: f64,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
}
