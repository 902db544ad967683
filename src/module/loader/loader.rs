//! Bootstrap loader implementation
//!
//! Handles configuration, resolution, fetching and ordered execution of
//! modules.

use bytes::Bytes;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::ResolutionConfig;
use crate::module::loader::fetch::InFlight;
use crate::module::loader::plan::{LoadPlan, PlannedModule};
use crate::module::registry::{ModuleRegistry, ModuleResolver, ShimGraph};
use crate::module::shim::ShimAdapter;
use crate::module::traits::{
    Imports, LoaderError, LoaderPhase, ModuleEvaluator, ModuleId, ModuleUnit, ModuleValue,
    ResourceFetcher,
};

/// Configuration fixed by `configure`
struct Configured {
    config: ResolutionConfig,
    resolver: ModuleResolver,
    graph: ShimGraph,
}

/// Loader context
///
/// Owned by the process entry point and passed to whatever needs it. A loader
/// is configured exactly once; requests are rejected until then.
pub struct BootstrapLoader {
    fetcher: Arc<dyn ResourceFetcher>,
    evaluator: Arc<dyn ModuleEvaluator>,
    configured: OnceLock<Configured>,
    registry: Arc<ModuleRegistry>,
    /// Fetches shared by overlapping requests
    in_flight: InFlight,
    /// Serializes module execution
    exec_lock: Mutex<()>,
    running: AtomicBool,
}

impl BootstrapLoader {
    /// Create an unconfigured loader
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, evaluator: Arc<dyn ModuleEvaluator>) -> Self {
        Self {
            fetcher,
            evaluator,
            configured: OnceLock::new(),
            registry: Arc::new(ModuleRegistry::new()),
            in_flight: InFlight::default(),
            exec_lock: Mutex::new(()),
            running: AtomicBool::new(false),
        }
    }

    /// Establish the resolution configuration
    ///
    /// Fails if the loader is already configured or the configuration is
    /// invalid.
    pub fn configure(&self, config: ResolutionConfig) -> Result<(), LoaderError> {
        if self.configured.get().is_some() {
            return Err(already_configured());
        }
        config.validate()?;

        let summary = format!(
            "baseUrl={}, {} shim(s), {} path override(s), wait={:?}",
            config.base_url,
            config.shim.len(),
            config.paths.len(),
            config.wait_seconds
        );
        let configured = Configured {
            resolver: ModuleResolver::new(&config),
            graph: ShimGraph::from_config(&config.shim),
            config,
        };
        self.configured
            .set(configured)
            .map_err(|_| already_configured())?;

        info!("Loader configured: {}", summary);
        Ok(())
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> LoaderPhase {
        if self.configured.get().is_none() {
            LoaderPhase::Configuring
        } else if self.running.load(Ordering::Acquire) {
            LoaderPhase::Running
        } else {
            LoaderPhase::Configured
        }
    }

    /// The established configuration, if any
    pub fn config(&self) -> Option<&ResolutionConfig> {
        self.configured.get().map(|c| &c.config)
    }

    /// Registry of executed modules
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Resolve and order `entries` without fetching anything
    pub fn plan(&self, entries: &[ModuleId]) -> Result<LoadPlan, LoaderError> {
        let configured = self.configured()?;
        LoadPlan::build(&configured.resolver, &configured.graph, entries)
    }

    /// Issue the configuration's own `deps` as an entry request
    pub async fn start(&self) -> Result<(), LoaderError> {
        let deps = self.configured()?.config.deps.clone();
        if deps.is_empty() {
            debug!("No configured deps to start");
            self.running.store(true, Ordering::Release);
            return Ok(());
        }
        self.request(&deps).await
    }

    /// Load and execute `entries` and their prerequisites
    pub async fn request(&self, entries: &[ModuleId]) -> Result<(), LoaderError> {
        let configured = self.configured()?;
        self.running.store(true, Ordering::Release);
        info!("Requesting {:?}", entries);

        let plan = LoadPlan::build(&configured.resolver, &configured.graph, entries)?;

        let mut pending: Vec<&PlannedModule> = Vec::with_capacity(plan.len());
        for step in &plan.steps {
            if self.registry.contains(&step.module).await {
                debug!("Module {} already loaded", step.module);
            } else {
                pending.push(step);
            }
        }

        let mut fetches = self
            .in_flight
            .join(
                &self.fetcher,
                pending.iter().copied(),
                configured.config.wait_seconds,
            )
            .await;

        let mut failed: HashSet<ModuleId> = HashSet::new();
        let mut failures = Vec::new();
        let mut skipped = Vec::new();

        for step in pending {
            let fetched = fetches.take(&step.module).await;
            if fetched.is_err() && self.registry.contains(&step.module).await {
                debug!("Module {} loaded by another request", step.module);
                continue;
            }

            if let Some(blocker) = step.prerequisites.iter().find(|p| failed.contains(*p)) {
                failed.insert(step.module.clone());
                match fetched {
                    Err(e) => {
                        error!("{}", e);
                        failures.push(e);
                    }
                    Ok(_) => {
                        warn!(
                            "Not executing {}: prerequisite {} did not load",
                            step.module, blocker
                        );
                        skipped.push(step.module.clone());
                    }
                }
                continue;
            }

            let outcome = match fetched {
                Ok(body) => self.execute(configured, step, body).await,
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                error!("{}", e);
                failed.insert(step.module.clone());
                failures.push(e);
            }
        }

        finish(failures, skipped)
    }

    /// Load `entries`, then hand their values to `callback` in request order
    pub async fn request_with<F, R>(
        &self,
        entries: &[ModuleId],
        callback: F,
    ) -> Result<R, LoaderError>
    where
        F: FnOnce(Vec<Arc<ModuleValue>>) -> R,
    {
        self.request(entries).await?;

        let mut values = Vec::with_capacity(entries.len());
        for entry in entries {
            let value = self.registry.get(entry).await.ok_or_else(|| LoaderError::Execution {
                module: entry.clone(),
                reason: "module finished loading but has no registered value".to_string(),
            })?;
            values.push(value);
        }
        Ok(callback(values))
    }

    fn configured(&self) -> Result<&Configured, LoaderError> {
        self.configured.get().ok_or_else(|| {
            LoaderError::Configuration("loader has not been configured".to_string())
        })
    }

    async fn execute(
        &self,
        configured: &Configured,
        step: &PlannedModule,
        body: Bytes,
    ) -> Result<(), LoaderError> {
        let _guard = self.exec_lock.lock().await;

        // A concurrent request may have executed it while this one was fetching
        if self.registry.contains(&step.module).await {
            debug!("Module {} executed by another request", step.module);
            self.in_flight.forget(&step.module).await;
            return Ok(());
        }

        let mut imports = Imports::new();
        for dep in &step.prerequisites {
            let value = self.registry.get(dep).await.ok_or_else(|| LoaderError::Execution {
                module: step.module.clone(),
                reason: format!("prerequisite `{}` has not executed", dep),
            })?;
            imports.insert(dep.clone(), value);
        }

        let unit = ModuleUnit {
            id: step.module.clone(),
            location: step.location.clone(),
            body,
            imports,
        };

        let value = self
            .evaluator
            .evaluate(&unit)
            .await
            .map_err(|e| LoaderError::Execution {
                module: step.module.clone(),
                reason: format!("{:#}", e),
            })?;
        let shim = configured.config.shim.get(&step.module);
        let value = ShimAdapter::bind(&step.module, shim, value)?;

        self.registry.register(step.module.clone(), value).await;
        self.in_flight.forget(&step.module).await;
        info!("Executed module {} ({})", step.module, step.location);
        Ok(())
    }
}

fn already_configured() -> LoaderError {
    LoaderError::Configuration("loader is already configured".to_string())
}

fn finish(mut failures: Vec<LoaderError>, skipped: Vec<ModuleId>) -> Result<(), LoaderError> {
    match (failures.len(), skipped.is_empty()) {
        (0, true) => Ok(()),
        (1, true) => Err(failures.remove(0)),
        _ => Err(LoaderError::Incomplete { failures, skipped }),
    }
}
