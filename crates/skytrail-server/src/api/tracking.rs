//! Polling session control.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::api::validate_id;
use crate::state::AppState;
use crate::tracker::TrackingStatus;

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub id: String,
    pub stopped: bool,
}

#[derive(Debug, Serialize)]
pub struct StopAllResponse {
    pub stopped: usize,
}

/// List every id with a trajectory or an active session.
pub async fn list_tracking(State(state): State<Arc<AppState>>) -> Json<Vec<TrackingStatus>> {
    Json(state.tracker().tracking_overview())
}

/// Start (or restart) polling an aircraft. Returns after the first fetch.
pub async fn start_tracking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrackingStatus>, StatusCode> {
    let id = validate_id(&id)?;
    let tracker = state.tracker();
    tracker.start_tracking(&id).await;

    Ok(Json(TrackingStatus {
        tracking: tracker.is_tracking(&id),
        waypoint_count: tracker.waypoint_count(&id),
        id,
    }))
}

pub async fn stop_tracking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StopResponse>, StatusCode> {
    let id = validate_id(&id)?;
    let stopped = state.tracker().stop_tracking(&id);
    Ok(Json(StopResponse { id, stopped }))
}

pub async fn stop_all_tracking(State(state): State<Arc<AppState>>) -> Json<StopAllResponse> {
    let stopped = state.tracker().stop_all_tracking();
    tracing::info!("Stopped {} tracking session(s)", stopped);
    Json(StopAllResponse { stopped })
}
