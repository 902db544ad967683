//! Module evaluators
//!
//! The loader treats module code as opaque. These evaluators cover the two
//! common cases: plugging in a closure, and verifying a deployment by
//! recording what each module's resource contained.

use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::module::traits::{ModuleEvaluator, ModuleId, ModuleUnit, ModuleValue};

/// Evaluator backed by a closure
pub struct FnEvaluator<F> {
    f: F,
}

impl<F> FnEvaluator<F>
where
    F: Fn(&ModuleUnit) -> anyhow::Result<ModuleValue> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> ModuleEvaluator for FnEvaluator<F>
where
    F: Fn(&ModuleUnit) -> anyhow::Result<ModuleValue> + Send + Sync,
{
    async fn evaluate(&self, unit: &ModuleUnit) -> anyhow::Result<ModuleValue> {
        (self.f)(unit)
    }
}

/// Evaluator that records a digest of each module instead of running it
///
/// The value bound to each module is
/// `{ "location", "bytes", "sha256", "imports" }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestEvaluator;

#[async_trait]
impl ModuleEvaluator for DigestEvaluator {
    async fn evaluate(&self, unit: &ModuleUnit) -> anyhow::Result<ModuleValue> {
        let digest = Sha256::digest(&unit.body);
        let imports: Vec<&str> = unit.imports.keys().map(ModuleId::as_str).collect();

        Ok(json!({
            "location": unit.location,
            "bytes": unit.body.len(),
            "sha256": hex::encode(digest),
            "imports": imports,
        }))
    }
}
