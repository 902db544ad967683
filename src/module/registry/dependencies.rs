//! Shim dependency graph
//!
//! Handles cycle detection and load ordering for shim prerequisites.

use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::debug;

use crate::module::shim::Shim;
use crate::module::traits::{LoaderError, ModuleId};

/// Prerequisite graph built from the `shim` section
#[derive(Debug, Clone, Default)]
pub struct ShimGraph {
    /// Module -> prerequisites, in declaration order
    dependencies: BTreeMap<ModuleId, Vec<ModuleId>>,
}

impl ShimGraph {
    pub fn from_config(shim: &BTreeMap<ModuleId, Shim>) -> Self {
        let dependencies = shim
            .iter()
            .map(|(module, shim)| (module.clone(), shim.deps.clone()))
            .collect();
        Self { dependencies }
    }

    /// Declared prerequisites of `module` (empty if it has no shim)
    pub fn prerequisites(&self, module: &ModuleId) -> &[ModuleId] {
        self.dependencies
            .get(module)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Reject cycles anywhere in the graph
    pub fn check_acyclic(&self) -> Result<(), LoaderError> {
        let mut in_degree: BTreeMap<&ModuleId, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&ModuleId, Vec<&ModuleId>> = BTreeMap::new();

        for (module, deps) in &self.dependencies {
            in_degree.entry(module).or_insert(0);
            for dep in deps {
                in_degree.entry(dep).or_insert(0);
                dependents.entry(dep).or_default().push(module);
                *in_degree.entry(module).or_insert(0) += 1;
            }
        }

        // Kahn's algorithm
        let mut queue: VecDeque<&ModuleId> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(module, _)| *module)
            .collect();

        let mut count = 0;
        while let Some(module) = queue.pop_front() {
            count += 1;
            for dependent in dependents.get(module).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }

        if count != in_degree.len() {
            let stuck: Vec<&str> = in_degree
                .iter()
                .filter(|(_, &degree)| degree > 0)
                .map(|(module, _)| module.as_str())
                .collect();
            return Err(LoaderError::Configuration(format!(
                "shim dependency cycle involving: {}",
                stuck.join(", ")
            )));
        }

        Ok(())
    }

    /// Order `entries` and their transitive prerequisites for execution
    ///
    /// Prerequisites always come before their dependents. Otherwise the order
    /// follows request order, depth first through each module's declared
    /// prerequisites. Duplicates are dropped.
    pub fn load_order(&self, entries: &[ModuleId]) -> Result<Vec<ModuleId>, LoaderError> {
        let mut order = Vec::new();
        let mut done: HashSet<&ModuleId> = HashSet::new();
        let mut visiting: HashSet<&ModuleId> = HashSet::new();
        // (module, index of the next prerequisite to visit)
        let mut stack: Vec<(&ModuleId, usize)> = Vec::new();

        for entry in entries {
            if done.contains(entry) {
                continue;
            }
            visiting.insert(entry);
            stack.push((entry, 0));

            while let Some(top) = stack.last_mut() {
                let (module, next) = *top;
                let deps = self.prerequisites(module);

                if let Some(dep) = deps.get(next) {
                    top.1 += 1;
                    if done.contains(dep) {
                        continue;
                    }
                    if !visiting.insert(dep) {
                        return Err(LoaderError::Configuration(format!(
                            "shim dependency cycle through `{}`",
                            dep
                        )));
                    }
                    stack.push((dep, 0));
                } else {
                    stack.pop();
                    visiting.remove(module);
                    done.insert(module);
                    order.push(module.clone());
                }
            }
        }

        debug!("Load order for {:?}: {:?}", entries, order);
        Ok(order)
    }
}
