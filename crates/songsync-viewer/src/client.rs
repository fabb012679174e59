use reqwest::StatusCode;
use tracing::warn;

use songsync_core::{NewTrack, Track, TrackPatch};

use crate::error::ViewerError;

/// HTTP client for the catalog endpoints.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The current catalog, or an empty list if it cannot be fetched.
    pub async fn fetch_catalog(&self) -> Vec<Track> {
        match self.try_fetch_catalog().await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!("Failed to fetch catalog from {}: {}", self.base_url, e);
                Vec::new()
            }
        }
    }

    pub async fn try_fetch_catalog(&self) -> Result<Vec<Track>, ViewerError> {
        let response = self.client.get(self.url("/music")).send().await?;
        if !response.status().is_success() {
            return Err(ViewerError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    pub async fn create(&self, new: &NewTrack) -> Result<Track, ViewerError> {
        let response = self
            .client
            .post(self.url("/music"))
            .json(new)
            .send()
            .await?;
        if response.status() != StatusCode::CREATED {
            return Err(ViewerError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    pub async fn update(&self, id: u64, patch: &TrackPatch) -> Result<Track, ViewerError> {
        let response = self
            .client
            .put(self.url(&format!("/music/{}", id)))
            .json(patch)
            .send()
            .await?;
        Self::track_or_not_found(id, response).await
    }

    pub async fn delete(&self, id: u64) -> Result<Track, ViewerError> {
        let response = self
            .client
            .delete(self.url(&format!("/music/{}", id)))
            .send()
            .await?;
        Self::track_or_not_found(id, response).await
    }

    async fn track_or_not_found(
        id: u64,
        response: reqwest::Response,
    ) -> Result<Track, ViewerError> {
        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(ViewerError::NotFound(id)),
            status => Err(ViewerError::Status(status)),
        }
    }
}
