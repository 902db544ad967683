//! Shared helpers for loader integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use module_bootstrap::module::{ModuleEvaluator, ModuleId, ModuleUnit, ModuleValue};
use module_bootstrap::{BootstrapLoader, ResolutionConfig, StaticFetcher};
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Location of the vendored library in the client scenario
pub const JQUERY_PATH: &str = "/x/contrib/jquery";
/// Location of the entry module in the client scenario
pub const CLIENT_PATH: &str = "/x/client.js";

/// One recorded evaluation
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub module: String,
    pub imports: Vec<String>,
    pub at: tokio::time::Instant,
}

/// Evaluator that records every call and can be told to fail modules
#[derive(Default)]
pub struct RecordingEvaluator {
    log: Mutex<Vec<Evaluation>>,
    failing: HashSet<String>,
}

impl RecordingEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, module: &str) -> Self {
        self.failing.insert(module.to_string());
        self
    }

    pub fn evaluations(&self) -> Vec<Evaluation> {
        self.log.lock().unwrap().clone()
    }

    pub fn order(&self) -> Vec<String> {
        self.evaluations().into_iter().map(|e| e.module).collect()
    }
}

#[async_trait]
impl ModuleEvaluator for RecordingEvaluator {
    async fn evaluate(&self, unit: &ModuleUnit) -> anyhow::Result<ModuleValue> {
        let imports: Vec<String> = unit.imports.keys().map(|k| k.to_string()).collect();
        self.log.lock().unwrap().push(Evaluation {
            module: unit.id.to_string(),
            imports: imports.clone(),
            at: tokio::time::Instant::now(),
        });

        if self.failing.contains(unit.id.as_str()) {
            anyhow::bail!("{} threw during initialization", unit.id);
        }
        Ok(json!({
            "id": unit.id.as_str(),
            "body": String::from_utf8_lossy(&unit.body),
            "imports": imports,
        }))
    }
}

/// `{baseUrl: "/x", shim: {client: [jquery]}, paths: {jquery: "/x/contrib/jquery"}}`
pub fn client_config() -> ResolutionConfig {
    ResolutionConfig::new("/x")
        .with_shim("client", ["jquery"])
        .with_path("jquery", JQUERY_PATH)
}

/// Fetcher serving the client scenario, with `jquery` delayed by `jquery_delay`
pub fn client_fetcher(jquery_delay: Duration) -> StaticFetcher {
    StaticFetcher::new()
        .with_delayed_resource(JQUERY_PATH, "window.jQuery = {}", jquery_delay)
        .with_resource(CLIENT_PATH, "client()")
}

/// Build a configured loader, keeping handles on its collaborators
pub fn configured_loader(
    config: ResolutionConfig,
    fetcher: StaticFetcher,
    evaluator: RecordingEvaluator,
) -> (BootstrapLoader, Arc<StaticFetcher>, Arc<RecordingEvaluator>) {
    let fetcher = Arc::new(fetcher);
    let evaluator = Arc::new(evaluator);
    let loader = BootstrapLoader::new(fetcher.clone(), evaluator.clone());
    loader.configure(config).unwrap();
    (loader, fetcher, evaluator)
}

pub fn ids(names: &[&str]) -> Vec<ModuleId> {
    names.iter().map(|n| ModuleId::from(*n)).collect()
}
