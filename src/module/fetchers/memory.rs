//! In-memory resource fetcher
//!
//! Serves a fixed set of resources, each with an optional artificial latency.
//! Every fetch is recorded so callers can inspect what was requested.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::module::traits::{FetchError, ResourceFetcher};

#[derive(Debug, Clone)]
struct StaticResource {
    body: Bytes,
    delay: Duration,
}

/// Fetcher backed by an in-memory map of location -> body
#[derive(Debug, Default)]
pub struct StaticFetcher {
    resources: HashMap<String, StaticResource>,
    log: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `location` immediately
    pub fn with_resource(self, location: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.with_delayed_resource(location, body, Duration::ZERO)
    }

    /// Serve `body` at `location` after `delay`
    pub fn with_delayed_resource(
        mut self,
        location: impl Into<String>,
        body: impl Into<Bytes>,
        delay: Duration,
    ) -> Self {
        self.resources.insert(
            location.into(),
            StaticResource {
                body: body.into(),
                delay,
            },
        );
        self
    }

    /// Locations requested so far, in request order
    pub async fn fetched(&self) -> Vec<String> {
        self.log.lock().await.clone()
    }
}

#[async_trait]
impl ResourceFetcher for StaticFetcher {
    async fn fetch(&self, location: &str) -> Result<Bytes, FetchError> {
        self.log.lock().await.push(location.to_string());

        let resource = self
            .resources
            .get(location)
            .ok_or_else(|| FetchError::NotFound(location.to_string()))?;

        if !resource.delay.is_zero() {
            tokio::time::sleep(resource.delay).await;
        }
        Ok(resource.body.clone())
    }
}
