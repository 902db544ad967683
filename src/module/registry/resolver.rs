//! Module identifier resolution
//!
//! Maps identifiers to resource locations: an override path is used verbatim,
//! anything else is joined onto the base path with the configured extension.

use std::collections::BTreeMap;

use crate::config::ResolutionConfig;
use crate::module::traits::{LoaderError, ModuleId};

/// Where a resolved location came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// `paths` override
    Override,
    /// Base path concatenation
    BasePath,
}

/// A resolved module location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub module: ModuleId,
    pub location: String,
    pub source: ResolutionSource,
}

/// Resolves identifiers against a fixed configuration
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    /// Base path without trailing separators
    base_url: String,
    extension: String,
    overrides: BTreeMap<ModuleId, String>,
}

impl ModuleResolver {
    /// Create a resolver from a validated configuration
    pub fn new(config: &ResolutionConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            extension: config.extension.clone(),
            overrides: config.paths.clone(),
        }
    }

    /// Resolve a module identifier to a resource location
    pub fn resolve(&self, module: &ModuleId) -> Result<Resolution, LoaderError> {
        if let Some(target) = self.overrides.get(module) {
            return Ok(Resolution {
                module: module.clone(),
                location: target.clone(),
                source: ResolutionSource::Override,
            });
        }

        if !module.is_path_safe() {
            return Err(LoaderError::UnresolvedDependency {
                module: module.clone(),
                reason: "identifier has no path override and cannot be joined onto the base path"
                    .to_string(),
            });
        }

        Ok(Resolution {
            module: module.clone(),
            location: format!("{}/{}{}", self.base_url, module, self.extension),
            source: ResolutionSource::BasePath,
        })
    }

    /// Base path used for concatenation (trailing `/` removed)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ModuleResolver {
        ModuleResolver::new(
            &ResolutionConfig::new("/x")
                .with_shim("client", ["jquery"])
                .with_path("jquery", "/x/contrib/jquery"),
        )
    }

    #[test]
    fn test_override_used_verbatim() {
        let resolution = resolver().resolve(&"jquery".into()).unwrap();
        assert_eq!(resolution.location, "/x/contrib/jquery");
        assert_eq!(resolution.source, ResolutionSource::Override);
    }

    #[test]
    fn test_base_path_concatenation() {
        let resolution = resolver().resolve(&"client".into()).unwrap();
        assert_eq!(resolution.location, "/x/client.js");
        assert_eq!(resolution.source, ResolutionSource::BasePath);

        let nested = resolver().resolve(&"ui/panel".into()).unwrap();
        assert_eq!(nested.location, "/x/ui/panel.js");
    }

    #[test]
    fn test_trailing_slash_on_base_is_not_doubled() {
        let resolver = ModuleResolver::new(&ResolutionConfig::new("/static/scripts/"));
        assert_eq!(resolver.base_url(), "/static/scripts");
        assert_eq!(
            resolver.resolve(&"main".into()).unwrap().location,
            "/static/scripts/main.js"
        );
    }

    #[test]
    fn test_empty_extension() {
        let mut config = ResolutionConfig::new("https://cdn.example.org/js");
        config.extension = String::new();
        let resolver = ModuleResolver::new(&config);
        assert_eq!(
            resolver.resolve(&"app".into()).unwrap().location,
            "https://cdn.example.org/js/app"
        );
    }

    #[test]
    fn test_unsafe_identifier_is_unresolved() {
        let err = resolver().resolve(&"../etc/passwd".into()).unwrap_err();
        assert!(matches!(err, LoaderError::UnresolvedDependency { .. }));
        assert!(resolver().resolve(&"".into()).is_err());
    }

    #[test]
    fn test_override_makes_any_identifier_resolvable() {
        let config = ResolutionConfig::new("/x").with_path("odd name", "/vendor/odd");
        let resolver = ModuleResolver::new(&config);
        assert_eq!(resolver.resolve(&"odd name".into()).unwrap().location, "/vendor/odd");
    }
}
