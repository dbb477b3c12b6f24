//! Position sources consumed by the tracker.
//!
//! The production source queries the flight-state backend
//! (`GET /api/v1/states/aircraft?icao24=<id>`), which answers with a GeoJSON
//! FeatureCollection of aircraft points.

use futures::future::{BoxFuture, FutureExt};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use skytrail_core::{Position, PositionSnapshot, WaypointMetadata};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("position backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("position backend returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("position backend rate limited{}: {detail}", retry_hint(.retry_after_secs))]
    RateLimited {
        retry_after_secs: Option<f64>,
        detail: String,
    },

    #[error("malformed position data: {0}")]
    Malformed(String),
}

fn retry_hint(retry_after_secs: &Option<f64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(" (retry after {:.0}s)", secs),
        None => String::new(),
    }
}

/// Anything that can report the current position of an entity.
///
/// `Ok(None)` means the source answered but has no data for the id. The
/// tracker treats it the same as an error: the tick is skipped.
pub trait PositionSource: Send + Sync {
    fn fetch<'a>(&'a self, id: &'a str)
        -> BoxFuture<'a, Result<Option<PositionSnapshot>, SourceError>>;
}

/// HTTP client for the flight-state backend.
pub struct HttpPositionSource {
    client: Client,
    base_url: String,
}

impl HttpPositionSource {
    /// Create a new source. `timeout` bounds each request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_state(&self, icao24: &str) -> Result<Option<PositionSnapshot>, SourceError> {
        let url = format!("{}/api/v1/states/aircraft", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("icao24", icao24)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_header = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<f64>().ok());
            let body = response.json::<ApiErrorBody>().await.ok();
            return Err(status_error(status, retry_after_header, body));
        }

        let states: StatesResponse = response.json().await?;
        states.into_snapshot()
    }
}

impl PositionSource for HttpPositionSource {
    fn fetch<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<PositionSnapshot>, SourceError>> {
        self.fetch_state(id).boxed()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    rate_limit: Option<RateLimitInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct RateLimitInfo {
    #[serde(default)]
    retry_after_seconds: Option<f64>,
}

/// Map a non-2xx answer to an error. A 429 keeps the backend's retry hint,
/// taken from the body's `rate_limit` or else the `Retry-After` header.
fn status_error(
    status: StatusCode,
    retry_after_header: Option<f64>,
    body: Option<ApiErrorBody>,
) -> SourceError {
    let body = body.unwrap_or_default();
    let retry_after_body = body.rate_limit.and_then(|r| r.retry_after_seconds);
    let detail = body
        .detail
        .or(body.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        SourceError::RateLimited {
            retry_after_secs: retry_after_body.or(retry_after_header),
            detail,
        }
    } else {
        SourceError::Status {
            status: status.as_u16(),
            detail,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatesResponse {
    #[serde(default)]
    features: Vec<StateFeature>,
}

#[derive(Debug, Deserialize)]
struct StateFeature {
    geometry: PointGeometry,
    #[serde(default)]
    properties: StateProperties,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    /// `[longitude, latitude]`
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct StateProperties {
    altitude: Option<f64>,
    heading: Option<f64>,
    velocity: Option<f64>,
    vertical_rate: Option<f64>,
    on_ground: Option<bool>,
    callsign: Option<String>,
}

impl StatesResponse {
    /// Convert the first feature into a snapshot. No features means no data.
    pub(crate) fn into_snapshot(self) -> Result<Option<PositionSnapshot>, SourceError> {
        let Some(feature) = self.features.into_iter().next() else {
            return Ok(None);
        };

        let (lon, lat) = match feature.geometry.coordinates.as_slice() {
            [lon, lat, ..] => (*lon, *lat),
            other => {
                return Err(SourceError::Malformed(format!(
                    "expected [lon, lat] coordinates, got {} value(s)",
                    other.len()
                )))
            }
        };
        if !lat.is_finite() || !lon.is_finite() {
            return Err(SourceError::Malformed("non-finite coordinates".to_string()));
        }

        let props = feature.properties;
        // Callsigns arrive space-padded to eight characters
        let label = props
            .callsign
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(Some(PositionSnapshot::new(
            Position::new(lat, lon),
            WaypointMetadata {
                altitude: props.altitude,
                heading: props.heading,
                ground_speed: props.velocity,
                vertical_rate: props.vertical_rate,
                on_ground: props.on_ground,
                label,
            },
        )))
    }
}
