//! REST API routes.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::{tracking, trajectories};
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    let tracking_routes = Router::new()
        .route(
            "/v1/tracking",
            get(tracking::list_tracking).delete(tracking::stop_all_tracking),
        )
        .route(
            "/v1/tracking/:id",
            post(tracking::start_tracking).delete(tracking::stop_tracking),
        );

    let trajectory_routes = Router::new()
        .route(
            "/v1/trajectories",
            axum::routing::delete(trajectories::clear_all_trajectories),
        )
        .route(
            "/v1/trajectories/:id",
            get(trajectories::get_trajectory).delete(trajectories::clear_trajectory),
        )
        .route(
            "/v1/trajectories/:id/positions",
            post(trajectories::add_position),
        )
        .route(
            "/v1/trajectories/:id/statistics",
            get(trajectories::get_statistics),
        )
        .route("/v1/trajectories/:id/geojson", get(trajectories::get_geojson))
        .route("/v1/trajectories/:id/export", get(trajectories::export_trajectory))
        .route("/v1/statistics", get(trajectories::list_statistics))
        .route("/v1/geojson", get(trajectories::get_all_geojson));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(tracking_routes)
        .merge(trajectory_routes)
}
