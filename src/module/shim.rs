//! Shim adapter
//!
//! Libraries that do not register themselves as modules publish their API as
//! global state. Here that global state is made explicit: a shimmed module
//! receives its prerequisites' values as imports, and its own result is bound
//! to its identifier like any other module value.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::module::traits::{LoaderError, ModuleId, ModuleValue};

/// Shim declaration for one module
///
/// Deserializes from either a bare prerequisite list (`["jquery"]`) or the
/// object form (`{ "deps": ["jquery"], "exports": "jQuery" }`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ShimForm")]
pub struct Shim {
    /// Modules that must finish executing first, in declaration order
    #[serde(default)]
    pub deps: Vec<ModuleId>,
    /// Name of the capability the module publishes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<String>,
}

impl Shim {
    pub fn new(deps: Vec<ModuleId>) -> Self {
        Self { deps, exports: None }
    }

    pub fn with_exports(mut self, exports: impl Into<String>) -> Self {
        self.exports = Some(exports.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ShimForm {
    Deps(Vec<ModuleId>),
    Full {
        #[serde(default)]
        deps: Vec<ModuleId>,
        #[serde(default)]
        exports: Option<String>,
    },
}

impl From<ShimForm> for Shim {
    fn from(form: ShimForm) -> Self {
        match form {
            ShimForm::Deps(deps) => Shim { deps, exports: None },
            ShimForm::Full { deps, exports } => Shim { deps, exports },
        }
    }
}

/// Binds a shimmed module's published surface to its identifier
pub struct ShimAdapter;

impl ShimAdapter {
    /// Produce the value registered for `module`
    ///
    /// Without an `exports` name the evaluated value is bound as is. With one,
    /// a surface object carrying that key is narrowed to the member, any other
    /// non-null value is bound whole, and `null` means the library never
    /// registered the capability.
    pub fn bind(
        module: &ModuleId,
        shim: Option<&Shim>,
        value: ModuleValue,
    ) -> Result<ModuleValue, LoaderError> {
        let Some(exports) = shim.and_then(|s| s.exports.as_deref()) else {
            return Ok(value);
        };

        match value {
            ModuleValue::Null => Err(LoaderError::Execution {
                module: module.clone(),
                reason: format!("shimmed module did not register `{}`", exports),
            }),
            ModuleValue::Object(mut surface) if surface.contains_key(exports) => {
                debug!("Binding `{}` from shimmed module {}", exports, module);
                Ok(surface.remove(exports).unwrap_or(ModuleValue::Null))
            }
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shim_accepts_both_forms() {
        let short: Shim = serde_json::from_value(json!(["jquery", "underscore"])).unwrap();
        assert_eq!(short.deps, vec![ModuleId::from("jquery"), ModuleId::from("underscore")]);
        assert_eq!(short.exports, None);

        let full: Shim =
            serde_json::from_value(json!({ "deps": ["jquery"], "exports": "Backbone" })).unwrap();
        assert_eq!(full.deps, vec![ModuleId::from("jquery")]);
        assert_eq!(full.exports.as_deref(), Some("Backbone"));

        let exports_only: Shim = serde_json::from_value(json!({ "exports": "_" })).unwrap();
        assert!(exports_only.deps.is_empty());
    }

    #[test]
    fn test_bind_without_exports_is_identity() {
        let id = ModuleId::from("client");
        let shim = Shim::new(vec!["jquery".into()]);
        let value = json!({ "started": true });
        assert_eq!(ShimAdapter::bind(&id, Some(&shim), value.clone()).unwrap(), value);
        assert_eq!(ShimAdapter::bind(&id, None, ModuleValue::Null).unwrap(), ModuleValue::Null);
    }

    #[test]
    fn test_bind_narrows_to_exported_capability() {
        let id = ModuleId::from("jquery");
        let shim = Shim::default().with_exports("jQuery");
        let surface = json!({ "jQuery": { "fn": "1.8.3" }, "$": "alias" });
        let bound = ShimAdapter::bind(&id, Some(&shim), surface).unwrap();
        assert_eq!(bound, json!({ "fn": "1.8.3" }));
    }

    #[test]
    fn test_bind_rejects_missing_registration() {
        let id = ModuleId::from("jquery");
        let shim = Shim::default().with_exports("jQuery");
        let err = ShimAdapter::bind(&id, Some(&shim), ModuleValue::Null).unwrap_err();
        assert!(matches!(err, LoaderError::Execution { ref module, .. } if module == &id));
    }

    #[test]
    fn test_shim_serializes_object_form() {
        let shim = Shim::new(vec!["jquery".into()]);
        assert_eq!(serde_json::to_value(&shim).unwrap(), json!({ "deps": ["jquery"] }));
    }
}
