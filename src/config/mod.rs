//! Configuration management for module-bootstrap
//!
//! Handles the resolution configuration record, its validation, named presets,
//! and the file-backed bootstrap configuration.

pub mod presets;

pub use presets::Preset;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::module::registry::dependencies::ShimGraph;
use crate::module::shim::Shim;
use crate::module::traits::{LoaderError, ModuleId};

/// Wait limit applied when `waitSeconds` is absent
pub const DEFAULT_WAIT_SECONDS: u64 = 7;

/// Suffix appended to identifiers resolved against the base path
pub const DEFAULT_EXTENSION: &str = ".js";

/// Maximum time a single resource fetch may take
///
/// Serialized as a whole number of seconds, where `0` disables the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub enum WaitPolicy {
    /// Fetches never time out
    Disabled,
    /// A fetch slower than this fails with a timeout
    Limit(Duration),
}

impl WaitPolicy {
    /// Build a policy from whole seconds (`0` disables the limit)
    pub fn seconds(secs: u64) -> Self {
        if secs == 0 {
            WaitPolicy::Disabled
        } else {
            WaitPolicy::Limit(Duration::from_secs(secs))
        }
    }

    /// The configured limit, if any
    pub fn limit(&self) -> Option<Duration> {
        match self {
            WaitPolicy::Disabled => None,
            WaitPolicy::Limit(d) if d.is_zero() => None,
            WaitPolicy::Limit(d) => Some(*d),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.limit().is_none()
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitPolicy::seconds(DEFAULT_WAIT_SECONDS)
    }
}

impl From<u64> for WaitPolicy {
    fn from(secs: u64) -> Self {
        WaitPolicy::seconds(secs)
    }
}

impl From<WaitPolicy> for u64 {
    fn from(policy: WaitPolicy) -> Self {
        policy.limit().map(|d| d.as_secs().max(1)).unwrap_or(0)
    }
}

/// Resolution configuration
///
/// Field names follow the loader's declarative form (`baseUrl`, `shim`,
/// `paths`, `waitSeconds`, `deps`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionConfig {
    /// Default prefix for identifiers without an override
    pub base_url: String,

    /// Prerequisites for modules that register through global state
    #[serde(default)]
    pub shim: BTreeMap<ModuleId, Shim>,

    /// Identifier to resource path overrides, used verbatim
    #[serde(default)]
    pub paths: BTreeMap<ModuleId, String>,

    /// Per-fetch wait limit in seconds (0 = disabled)
    #[serde(default)]
    pub wait_seconds: WaitPolicy,

    /// Entry request issued by `start()`
    #[serde(default)]
    pub deps: Vec<ModuleId>,

    /// Suffix appended to base-path resolutions
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl ResolutionConfig {
    /// Create a configuration with only a base path
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            shim: BTreeMap::new(),
            paths: BTreeMap::new(),
            wait_seconds: WaitPolicy::default(),
            deps: Vec::new(),
            extension: default_extension(),
        }
    }

    /// Declare shim prerequisites for `module`
    pub fn with_shim<I, D>(mut self, module: impl Into<ModuleId>, deps: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<ModuleId>,
    {
        self.shim
            .insert(module.into(), Shim::new(deps.into_iter().map(Into::into).collect()));
        self
    }

    /// Map `module` to an override resource path
    pub fn with_path(mut self, module: impl Into<ModuleId>, target: impl Into<String>) -> Self {
        self.paths.insert(module.into(), target.into());
        self
    }

    pub fn with_wait(mut self, policy: WaitPolicy) -> Self {
        self.wait_seconds = policy;
        self
    }

    pub fn with_deps<I, D>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<ModuleId>,
    {
        self.deps = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Parse from JSON (the declarative `require.config` shape)
    pub fn from_json_str(contents: &str) -> Result<Self, LoaderError> {
        serde_json::from_str(contents)
            .map_err(|e| LoaderError::Configuration(format!("Invalid JSON configuration: {}", e)))
    }

    /// Parse from TOML
    pub fn from_toml_str(contents: &str) -> Result<Self, LoaderError> {
        toml::from_str(contents)
            .map_err(|e| LoaderError::Configuration(format!("Invalid TOML configuration: {}", e)))
    }

    /// Validate configuration
    ///
    /// Identifier resolvability is checked per request, not here.
    pub fn validate(&self) -> Result<(), LoaderError> {
        if self.base_url.trim().is_empty() {
            return Err(LoaderError::Configuration(
                "baseUrl must not be empty".to_string(),
            ));
        }
        if self.base_url.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(LoaderError::Configuration(format!(
                "baseUrl {:?} contains whitespace or control characters",
                self.base_url
            )));
        }

        for (module, target) in &self.paths {
            if let Some(problem) = override_target_problem(target) {
                return Err(LoaderError::Configuration(format!(
                    "Malformed path override for `{}` ({:?}): {}",
                    module, target, problem
                )));
            }
        }

        if !self.extension.is_empty()
            && (!self.extension.starts_with('.')
                || self.extension.len() == 1
                || self.extension.contains('/'))
        {
            return Err(LoaderError::Configuration(format!(
                "extension {:?} must be empty or look like \".js\"",
                self.extension
            )));
        }

        ShimGraph::from_config(&self.shim).check_acyclic()?;

        Ok(())
    }
}

/// Why an override target cannot be used as a resource path
fn override_target_problem(target: &str) -> Option<&'static str> {
    if target.is_empty() {
        Some("target is empty")
    } else if target.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("target contains whitespace or control characters")
    } else if target.contains('?') || target.contains('#') {
        Some("target contains a query or fragment")
    } else if target.ends_with('/') {
        Some("target names a directory")
    } else {
        None
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "module_bootstrap=debug"); RUST_LOG takes precedence
    #[serde(default)]
    pub filter: Option<String>,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,
}

/// Bootstrap configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Named preset used when `loader` is absent
    #[serde(default)]
    pub preset: Option<Preset>,

    /// Explicit resolution configuration
    #[serde(default)]
    pub loader: Option<ResolutionConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

impl BootstrapConfig {
    /// Load configuration from a file (JSON if the extension is `.json`, TOML otherwise)
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BootstrapConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => toml::from_str(&content)?,
        };
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Effective resolution configuration
    ///
    /// An explicit `loader` section wins, then the `preset` field, then the
    /// `BOOTSTRAP_PRESET` environment variable, then [`Preset::Standard`].
    pub fn resolution(&self) -> ResolutionConfig {
        if let Some(ref loader) = self.loader {
            return loader.clone();
        }
        self.preset
            .or_else(Preset::from_env)
            .unwrap_or_default()
            .config()
    }

    /// Effective resolution configuration, validated
    ///
    /// The environment is read once; the returned value is the one that was
    /// validated.
    pub fn validated_resolution(&self) -> anyhow::Result<ResolutionConfig> {
        let resolution = self.resolution();
        resolution.validate()?;
        Ok(resolution)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validated_resolution().map(|_| ())
    }
}
