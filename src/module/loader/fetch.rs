//! Concurrent fetch stage
//!
//! Every resource of a request is fetched in its own task so that fetches
//! overlap while execution stays ordered. Each fetch is bounded by the wait
//! policy; nothing is retried or cancelled.
//!
//! Fetches are tracked per identifier across requests: a request that needs a
//! module already being fetched awaits that fetch instead of issuing another.

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::config::WaitPolicy;
use crate::module::loader::plan::PlannedModule;
use crate::module::traits::{FetchError, LoaderError, ModuleId, ResourceFetcher};
use crate::utils::with_wait_policy;

type SharedFetch = Shared<BoxFuture<'static, Result<Bytes, LoaderError>>>;

/// Fetches in flight for a loader, keyed by module
///
/// An entry lives until the module is registered or its fetch fails. Bodies of
/// modules that could not execute stay here for the next request.
#[derive(Clone, Default)]
pub(crate) struct InFlight {
    fetches: Arc<Mutex<HashMap<ModuleId, SharedFetch>>>,
}

impl InFlight {
    /// Start or join the fetch of every step
    pub(crate) async fn join<'a, I>(
        &self,
        fetcher: &Arc<dyn ResourceFetcher>,
        steps: I,
        wait: WaitPolicy,
    ) -> FetchSet
    where
        I: IntoIterator<Item = &'a PlannedModule>,
    {
        let mut fetches = self.fetches.lock().await;
        let mut handles = HashMap::new();

        for step in steps {
            if let Some(existing) = fetches.get(&step.module) {
                debug!("Joining in-flight fetch of {}", step.module);
                handles.insert(step.module.clone(), existing.clone());
                continue;
            }

            debug!("Fetching {} from {}", step.module, step.location);
            let fetch = self.spawn(Arc::clone(fetcher), step, wait);
            fetches.insert(step.module.clone(), fetch.clone());
            handles.insert(step.module.clone(), fetch);
        }

        FetchSet { handles }
    }

    /// Drop the entry for a module that has been registered
    pub(crate) async fn forget(&self, module: &ModuleId) {
        self.fetches.lock().await.remove(module);
    }

    fn spawn(
        &self,
        fetcher: Arc<dyn ResourceFetcher>,
        step: &PlannedModule,
        wait: WaitPolicy,
    ) -> SharedFetch {
        let module = step.module.clone();
        let location = step.location.clone();
        let handle = tokio::spawn(fetch_one(fetcher, module.clone(), location.clone(), wait));
        let fetches = Arc::clone(&self.fetches);

        async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(LoaderError::Fetch {
                    module: module.clone(),
                    location,
                    reason: format!("fetch task failed: {}", e),
                }),
            };
            // A failed fetch is not reused; a later request fetches again
            if result.is_err() {
                fetches.lock().await.remove(&module);
            }
            result
        }
        .boxed()
        .shared()
    }
}

/// Fetches a single request is waiting on
pub(crate) struct FetchSet {
    handles: HashMap<ModuleId, SharedFetch>,
}

impl FetchSet {
    /// Wait for the fetch of `module`
    ///
    /// Each module's result can be taken once.
    pub(crate) async fn take(&mut self, module: &ModuleId) -> Result<Bytes, LoaderError> {
        let fetch = self.handles.remove(module).ok_or_else(|| LoaderError::Fetch {
            module: module.clone(),
            location: String::new(),
            reason: "no fetch was issued for this module".to_string(),
        })?;
        fetch.await
    }
}

async fn fetch_one(
    fetcher: Arc<dyn ResourceFetcher>,
    module: ModuleId,
    location: String,
    wait: WaitPolicy,
) -> Result<Bytes, LoaderError> {
    match with_wait_policy(wait, fetcher.fetch(&location)).await {
        Ok(Ok(body)) => {
            trace!("Fetched {} ({} bytes)", location, body.len());
            Ok(body)
        }
        Ok(Err(FetchError::NotFound(_))) => Err(LoaderError::UnresolvedDependency {
            module,
            reason: format!("no resource at {}", location),
        }),
        Ok(Err(FetchError::Failed { reason, .. })) => Err(LoaderError::Fetch {
            module,
            location,
            reason,
        }),
        Err(_) => Err(LoaderError::Timeout {
            module,
            location,
            waited: wait.limit().unwrap_or_default(),
        }),
    }
}
