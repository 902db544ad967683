//! HTTP resource fetcher
//!
//! Fetches locations from an origin, the way a browser resolves a
//! root-relative script path against the page's origin.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use tracing::trace;

use crate::module::traits::{FetchError, ResourceFetcher};

/// Fetcher issuing GET requests against an origin
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    origin: String,
}

impl HttpFetcher {
    /// Create a fetcher for `origin` (e.g. `https://crawl.example.org`)
    pub fn new(origin: impl Into<String>) -> Result<Self, FetchError> {
        let origin = origin.into();
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::Failed {
                location: origin.clone(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self::with_client(client, origin))
    }

    pub fn with_client(client: reqwest::Client, origin: impl Into<String>) -> Self {
        Self {
            client,
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for a location
    ///
    /// Locations that already carry a scheme are used as they are.
    pub fn url_for(&self, location: &str) -> String {
        if location.contains("://") {
            location.to_string()
        } else if location.starts_with('/') {
            format!("{}{}", self.origin, location)
        } else {
            format!("{}/{}", self.origin, location)
        }
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Bytes, FetchError> {
        let url = self.url_for(location);
        trace!("GET {}", url);

        let failed = |reason: String| FetchError::Failed {
            location: location.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(FetchError::NotFound(url)),
            status if !status.is_success() => Err(failed(format!("HTTP {}", status))),
            _ => response.bytes().await.map_err(|e| failed(e.to_string())),
        }
    }
}
