//! Trajectory queries, manual samples, statistics and exports.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use skytrail_core::{
    download_file_name, GeoJsonFeature, GeoJsonFeatureCollection, PositionSnapshot,
    TrajectoryStatistics, Waypoint,
};
use std::sync::Arc;

use crate::api::validate_id;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AddPositionResponse {
    pub id: String,
    pub appended: bool,
    pub waypoint_count: usize,
}

pub async fn get_trajectory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Waypoint>>, StatusCode> {
    let id = validate_id(&id)?;
    Ok(Json(state.tracker().trajectory(&id)))
}

/// Record a sample without going through the position source.
pub async fn add_position(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(snapshot): Json<PositionSnapshot>,
) -> Result<(StatusCode, Json<AddPositionResponse>), StatusCode> {
    let id = validate_id(&id)?;
    let position = snapshot.position;
    if !(-90.0..=90.0).contains(&position.lat) || !(-180.0..=180.0).contains(&position.lon) {
        tracing::warn!(aircraft = %id, lat = position.lat, lon = position.lon, "Rejected out-of-range position");
        return Err(StatusCode::BAD_REQUEST);
    }

    let tracker = state.tracker();
    let outcome = tracker.add_position(&id, position, snapshot.metadata);
    let appended = outcome.is_appended();
    let status = if appended { StatusCode::CREATED } else { StatusCode::OK };

    Ok((
        status,
        Json(AddPositionResponse {
            waypoint_count: tracker.waypoint_count(&id),
            appended,
            id,
        }),
    ))
}

pub async fn clear_trajectory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let id = validate_id(&id)?;
    if state.tracker().clear_trajectory(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

pub async fn clear_all_trajectories(State(state): State<Arc<AppState>>) -> StatusCode {
    state.tracker().clear_all_trajectories();
    StatusCode::NO_CONTENT
}

pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrajectoryStatistics>, StatusCode> {
    let id = validate_id(&id)?;
    state
        .tracker()
        .statistics(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn list_statistics(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<TrajectoryStatistics>> {
    Json(state.tracker().all_statistics())
}

pub async fn get_geojson(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GeoJsonFeature>, StatusCode> {
    let id = validate_id(&id)?;
    Ok(Json(state.tracker().export_geojson(&id)))
}

pub async fn get_all_geojson(State(state): State<Arc<AppState>>) -> Json<GeoJsonFeatureCollection> {
    Json(state.tracker().export_all_geojson())
}

/// Flat JSON export, served as a file attachment.
///
/// The id ends up in the `Content-Disposition` header, so only validated ids
/// get this far.
pub async fn export_trajectory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let id = validate_id(&id)?;
    let export = state.tracker().export_json(&id);
    let file_name = download_file_name(&id, "json", export.exported_at);
    Ok((
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )],
        Json(export),
    ))
}
