//! Skytrail SDK client for the trajectory tracking API.

use anyhow::Result;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use skytrail_core::{
    GeoJsonFeature, GeoJsonFeatureCollection, PositionSnapshot, TrajectoryExport,
    TrajectoryStatistics, Waypoint,
};

/// Client for connecting to a Skytrail server.
pub struct SkytrailClient {
    pub(crate) base_url: String,
    pub(crate) client: reqwest::Client,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingStatus {
    pub id: String,
    pub tracking: bool,
    pub waypoint_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddPositionResponse {
    pub id: String,
    pub appended: bool,
    pub waypoint_count: usize,
}

#[derive(Debug, Deserialize)]
struct StopResponse {
    stopped: bool,
}

#[derive(Debug, Deserialize)]
struct StopAllResponse {
    stopped: usize,
}

impl SkytrailClient {
    /// Create a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// True if the server answers its health check.
    pub async fn health(&self) -> Result<bool> {
        let response = self.client.get(self.url("/health")).send().await?;
        Ok(response.status().is_success())
    }

    /// Start tracking an aircraft. Returns once the first fetch is done.
    pub async fn start_tracking(&self, id: &str) -> Result<TrackingStatus> {
        let response = self
            .client
            .post(self.url(&format!("/v1/tracking/{}", id)))
            .send()
            .await?;
        decode(response, "start tracking").await
    }

    /// Stop tracking an aircraft. False if it was not being tracked.
    pub async fn stop_tracking(&self, id: &str) -> Result<bool> {
        let response = self
            .client
            .delete(self.url(&format!("/v1/tracking/{}", id)))
            .send()
            .await?;
        let body: StopResponse = decode(response, "stop tracking").await?;
        Ok(body.stopped)
    }

    /// Stop every session. Returns how many were active.
    pub async fn stop_all_tracking(&self) -> Result<usize> {
        let response = self.client.delete(self.url("/v1/tracking")).send().await?;
        let body: StopAllResponse = decode(response, "stop all tracking").await?;
        Ok(body.stopped)
    }

    pub async fn tracking_status(&self) -> Result<Vec<TrackingStatus>> {
        self.get_json("/v1/tracking", "list tracking").await
    }

    pub async fn trajectory(&self, id: &str) -> Result<Vec<Waypoint>> {
        self.get_json(&format!("/v1/trajectories/{}", id), "fetch trajectory")
            .await
    }

    /// Push a sample directly, bypassing the server's position source.
    pub async fn add_position(
        &self,
        id: &str,
        snapshot: &PositionSnapshot,
    ) -> Result<AddPositionResponse> {
        let response = self
            .client
            .post(self.url(&format!("/v1/trajectories/{}/positions", id)))
            .json(snapshot)
            .send()
            .await?;
        decode(response, "add position").await
    }

    /// `None` when the server has no waypoints for `id`.
    pub async fn statistics(&self, id: &str) -> Result<Option<TrajectoryStatistics>> {
        let response = self
            .client
            .get(self.url(&format!("/v1/trajectories/{}/statistics", id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(response, "fetch statistics").await.map(Some)
    }

    pub async fn all_statistics(&self) -> Result<Vec<TrajectoryStatistics>> {
        self.get_json("/v1/statistics", "fetch statistics").await
    }

    pub async fn geojson(&self, id: &str) -> Result<GeoJsonFeature> {
        self.get_json(&format!("/v1/trajectories/{}/geojson", id), "fetch GeoJSON")
            .await
    }

    pub async fn all_geojson(&self) -> Result<GeoJsonFeatureCollection> {
        self.get_json("/v1/geojson", "fetch GeoJSON").await
    }

    pub async fn export(&self, id: &str) -> Result<TrajectoryExport> {
        self.get_json(&format!("/v1/trajectories/{}/export", id), "export trajectory")
            .await
    }

    /// False if there was nothing to clear.
    pub async fn clear_trajectory(&self, id: &str) -> Result<bool> {
        let response = self
            .client
            .delete(self.url(&format!("/v1/trajectories/{}", id)))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => anyhow::bail!("Failed to clear trajectory: {}", status),
        }
    }

    pub async fn clear_all_trajectories(&self) -> Result<()> {
        let response = self.client.delete(self.url("/v1/trajectories")).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Failed to clear trajectories: {}", response.status());
        }
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, action: &str) -> Result<T> {
        let response = self.client.get(self.url(path)).send().await?;
        decode(response, action).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, action: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        tracing::debug!("{} failed with {}", action, status);
        anyhow::bail!("Failed to {}: {}", action, status);
    }
    Ok(response.json().await?)
}
