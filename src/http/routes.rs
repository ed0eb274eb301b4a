use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::{Method, StatusCode, Uri},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::Utc;
use futures::{Stream, StreamExt};
use tracing::info;

use crate::location::{LocationRecord, RawLocationReport};

use super::{
    error::ApiError,
    response::{ApiResponse, HealthResponse},
    AppState,
};

pub(super) async fn create_location(
    State(state): State<AppState>,
    payload: Result<Json<RawLocationReport>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<LocationRecord>>), ApiError> {
    let Json(report) = payload?;
    let record = state.tracker.ingest(report).await?;

    info!(
        identifier = %record.identifier,
        latitude = record.coordinates.latitude,
        longitude = record.coordinates.longitude,
        reported_at = %record.reported_at,
        "new location received"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Location recorded successfully", record)),
    ))
}

pub(super) async fn latest_all_locations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LocationRecord>>>, ApiError> {
    let records = state.tracker.latest_all().await?;
    Ok(Json(ApiResponse::new(
        format!("{} locations found", records.len()),
        records,
    )))
}

pub(super) async fn latest_location(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<ApiResponse<LocationRecord>>, ApiError> {
    let Some(record) = state.tracker.latest(identifier.clone()).await? else {
        return Err(ApiError::NotFound {
            title: "Location not found",
            identifier,
        });
    };

    Ok(Json(ApiResponse::new(
        format!("Latest location found for {identifier}"),
        record,
    )))
}

pub(super) async fn location_history(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<ApiResponse<Vec<LocationRecord>>>, ApiError> {
    let Some(history) = state.tracker.history(identifier.clone()).await? else {
        return Err(ApiError::NotFound {
            title: "History not found",
            identifier,
        });
    };

    Ok(Json(ApiResponse::new(
        format!("History of {} locations for {identifier}", history.len()),
        history,
    )))
}

pub(super) async fn location_stream(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = state.tracker.subscribe(identifier);
    Sse::new(stream.map(|record| Event::default().json_data(record)))
        .keep_alive(KeepAlive::default())
}

pub(super) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: Utc::now(),
        environment: state.environment.to_string(),
    })
}

pub(super) async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::RouteNotFound {
        method: method.to_string(),
        path: uri.to_string(),
    }
}
