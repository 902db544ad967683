//! Process-wide module registry
//!
//! Holds the value bound to each executed module. Each identifier is written
//! at most once; the first write wins. The registry also records the order in
//! which modules finished executing.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::module::traits::{ModuleId, ModuleValue};

#[derive(Debug, Default)]
struct RegistryState {
    values: HashMap<ModuleId, Arc<ModuleValue>>,
    timeline: Vec<ModuleId>,
}

/// Registry of executed modules
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    state: RwLock<RegistryState>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `module` unless it is already bound
    ///
    /// Returns the bound value and whether this call performed the write.
    pub async fn register(&self, module: ModuleId, value: ModuleValue) -> (Arc<ModuleValue>, bool) {
        let mut state = self.state.write().await;
        if let Some(existing) = state.values.get(&module) {
            debug!("Module {} already registered, keeping first value", module);
            return (Arc::clone(existing), false);
        }

        let value = Arc::new(value);
        state.values.insert(module.clone(), Arc::clone(&value));
        state.timeline.push(module);
        (value, true)
    }

    pub async fn get(&self, module: &ModuleId) -> Option<Arc<ModuleValue>> {
        self.state.read().await.values.get(module).cloned()
    }

    pub async fn contains(&self, module: &ModuleId) -> bool {
        self.state.read().await.values.contains_key(module)
    }

    /// Modules in the order they finished executing
    pub async fn timeline(&self) -> Vec<ModuleId> {
        self.state.read().await.timeline.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.values.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
