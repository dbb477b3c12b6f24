//! API routes for the trajectory server.

pub mod request_id;
mod routes;
pub mod tracking;
pub mod trajectories;

use axum::{http::StatusCode, middleware, Router};
use std::sync::Arc;

use crate::state::AppState;

/// Longest accepted entity id. ICAO24 addresses are six hex digits; other
/// sources use registrations or internal keys.
const MAX_ID_LEN: usize = 64;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router().layer(middleware::from_fn(request_id::ensure_request_id))
}

/// Trimmed id, or 400 when empty, too long or containing unsafe characters.
pub(crate) fn validate_id(raw: &str) -> Result<String, StatusCode> {
    let id = raw.trim();
    let valid = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(id.to_string())
    } else {
        Err(StatusCode::BAD_REQUEST)
    }
}

#[cfg(test)]
mod tests;
