//! Filesystem resource fetcher
//!
//! Serves locations from a static-file directory, the way a web server maps
//! request paths onto its document root.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::module::traits::{FetchError, ResourceFetcher};

/// Fetcher reading files under a root directory
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
    /// Location prefix that corresponds to `root`
    mount: String,
}

impl FsFetcher {
    /// Serve locations relative to `root` (location `/a/b.js` -> `root/a/b.js`)
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            mount: String::new(),
        }
    }

    /// Only serve locations under `mount`, with `mount` mapped to the root
    ///
    /// With mount `/crawl/static`, location `/crawl/static/scripts/client.js`
    /// reads `root/scripts/client.js`.
    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into().trim_end_matches('/').to_string();
        self
    }

    /// Map a location onto a path under the root
    pub fn path_for(&self, location: &str) -> Result<PathBuf, FetchError> {
        let relative = if self.mount.is_empty() {
            location
        } else {
            match location.strip_prefix(self.mount.as_str()) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
                _ => return Err(FetchError::NotFound(location.to_string())),
            }
        };

        let mut path = self.root.clone();
        for segment in relative.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(FetchError::Failed {
                        location: location.to_string(),
                        reason: "location escapes the served directory".to_string(),
                    })
                }
                segment => path.push(segment),
            }
        }
        Ok(path)
    }
}

#[async_trait]
impl ResourceFetcher for FsFetcher {
    async fn fetch(&self, location: &str) -> Result<Bytes, FetchError> {
        let path = self.path_for(location)?;
        trace!("Reading {} from {:?}", location, path);

        match tokio::fs::read(&path).await {
            Ok(contents) => Ok(Bytes::from(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(location.to_string()))
            }
            Err(e) => Err(FetchError::Failed {
                location: location.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
