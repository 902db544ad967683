//! Load plans
//!
//! A plan is the resolved, execution-ordered list of modules an entry request
//! needs. Building it checks every identifier before anything is fetched.

use serde::Serialize;
use tracing::error;

use crate::module::registry::{ModuleResolver, ResolutionSource, ShimGraph};
use crate::module::traits::{LoaderError, ModuleId};

/// One module in a load plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedModule {
    pub module: ModuleId,
    pub location: String,
    #[serde(serialize_with = "serialize_source")]
    pub source: ResolutionSource,
    /// Shim prerequisites that must execute first
    pub prerequisites: Vec<ModuleId>,
}

fn serialize_source<S: serde::Serializer>(
    source: &ResolutionSource,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(match source {
        ResolutionSource::Override => "override",
        ResolutionSource::BasePath => "base-path",
    })
}

/// Resolved, dependency-ordered modules for an entry request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadPlan {
    pub steps: Vec<PlannedModule>,
}

impl LoadPlan {
    /// Build a plan for `entries`
    ///
    /// Fails on the first identifier, direct or reached through shim
    /// prerequisites, that cannot be mapped to a resource.
    pub fn build(
        resolver: &ModuleResolver,
        graph: &ShimGraph,
        entries: &[ModuleId],
    ) -> Result<Self, LoaderError> {
        let order = graph.load_order(entries)?;

        let mut steps = Vec::with_capacity(order.len());
        for module in order {
            let resolution = resolver.resolve(&module).map_err(|e| {
                error!("{}", e);
                e
            })?;
            steps.push(PlannedModule {
                prerequisites: graph.prerequisites(&module).to_vec(),
                module,
                location: resolution.location,
                source: resolution.source,
            });
        }

        Ok(Self { steps })
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleId> {
        self.steps.iter().map(|s| &s.module)
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.location.as_str())
    }

    pub fn get(&self, module: &ModuleId) -> Option<&PlannedModule> {
        self.steps.iter().find(|s| &s.module == module)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
