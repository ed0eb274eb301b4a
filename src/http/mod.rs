//! Thin axum layer over the tracker runtime.
//!
//! | Route                           | Operation                       |
//! |---------------------------------|---------------------------------|
//! | `POST /api/location`            | validate and append a report    |
//! | `GET  /api/location`            | latest record of every id       |
//! | `GET  /api/location/:id`        | latest record of one id         |
//! | `GET  /api/location/:id/history`| full ordered history            |
//! | `GET  /api/location/:id/stream` | server-sent events of the latest|
//! | `GET  /health`                  | liveness, uptime, environment   |

use std::{sync::Arc, time::Instant};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::runtime::handle::TrackerHandle;

/// Error type and its JSON rendering.
pub mod error;
/// Response envelopes.
pub mod response;
mod routes;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub tracker: TrackerHandle,
    pub environment: Arc<str>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(tracker: TrackerHandle, environment: impl Into<String>) -> Self {
        Self {
            tracker,
            environment: Arc::from(environment.into()),
            started_at: Instant::now(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/location",
            post(routes::create_location).get(routes::latest_all_locations),
        )
        .route("/api/location/:id", get(routes::latest_location))
        .route("/api/location/:id/history", get(routes::location_history))
        .route("/api/location/:id/stream", get(routes::location_stream))
        .route("/health", get(routes::health))
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
