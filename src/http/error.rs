//! HTTP error mapping for core failures.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use thiserror::Error;
use tracing::{error, warn};

use crate::{runtime::handle::RuntimeError, validate::ValidationError};

use super::response::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no location found for id: {identifier}")]
    NotFound {
        title: &'static str,
        identifier: String,
    },
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("cannot {method} {path}")]
    RouteNotFound { method: String, path: String },
    /// Detail is logged, never returned to the caller.
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } | Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.kind(),
            Self::NotFound { .. } => "NotFound",
            Self::MalformedBody(_) => "MalformedBody",
            Self::RouteNotFound { .. } => "RouteNotFound",
            Self::Internal(_) => "InternalFailure",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.title(),
            Self::NotFound { title, .. } => *title,
            Self::MalformedBody(_) => "Invalid data",
            Self::RouteNotFound { .. } => "Route not found",
            Self::Internal(_) => "Internal server error",
        }
    }
}

impl From<RuntimeError> for ApiError {
    fn from(value: RuntimeError) -> Self {
        match value {
            RuntimeError::Validation(err) => Self::Validation(err),
            other @ RuntimeError::ChannelClosed => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::MalformedBody(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Internal(detail) => error!(detail = %detail, "request failed"),
            Self::Validation(_) | Self::MalformedBody(_) => {
                warn!(kind = self.kind(), message = %self, "rejected location report")
            }
            Self::NotFound { .. } | Self::RouteNotFound { .. } => {}
        }

        let body = ErrorResponse {
            error: self.title().to_string(),
            kind: self.kind().to_string(),
            message: self.to_string(),
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}
