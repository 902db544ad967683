//! Module system traits and interfaces
//!
//! Defines module identifiers, the loader error taxonomy, and the two seams
//! the loader talks through: [`ResourceFetcher`] to obtain a module's bytes
//! and [`ModuleEvaluator`] to execute them.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Logical name of a loadable unit (e.g. `client`, `contrib/jquery`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Create a module identifier
    ///
    /// No validation happens here; whether an identifier can be mapped to a
    /// resource is decided by the resolver.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this identifier can be concatenated onto a base path
    ///
    /// Rejects empty identifiers, whitespace or control characters, leading or
    /// trailing `/`, and empty, `.` or `..` segments.
    pub fn is_path_safe(&self) -> bool {
        let id = self.0.as_str();
        if id.is_empty() || id.starts_with('/') || id.ends_with('/') {
            return false;
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return false;
        }
        id.split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Value a module yields when executed, bound to its identifier
pub type ModuleValue = serde_json::Value;

/// Prerequisite values handed to a module when it executes
pub type Imports = BTreeMap<ModuleId, Arc<ModuleValue>>;

/// Loader lifecycle phase
///
/// Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoaderPhase {
    /// `configure` has not succeeded yet
    Configuring,
    /// Configuration established, no request issued yet
    Configured,
    /// At least one request has been issued
    Running,
}

/// A fetched module ready for execution
#[derive(Debug, Clone)]
pub struct ModuleUnit {
    /// Module identifier
    pub id: ModuleId,
    /// Resource location the body was fetched from
    pub location: String,
    /// Raw resource body
    pub body: Bytes,
    /// Values of the module's shim prerequisites, in identifier order
    pub imports: Imports,
}

/// Fetches resource bodies by location
///
/// Implementations may be called concurrently for different locations.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the resource at `location`
    async fn fetch(&self, location: &str) -> Result<Bytes, FetchError>;
}

/// Executes fetched modules
///
/// The loader never calls `evaluate` concurrently and never calls it for a
/// module whose prerequisites have not completed.
#[async_trait]
pub trait ModuleEvaluator: Send + Sync {
    /// Execute a module and return the value bound to its identifier
    async fn evaluate(&self, unit: &ModuleUnit) -> anyhow::Result<ModuleValue>;
}

/// Resource fetch errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to fetch {location}: {reason}")]
    Failed { location: String, reason: String },
}

/// Loader errors
#[derive(Debug, Clone, Error)]
pub enum LoaderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unresolved dependency `{module}`: {reason}")]
    UnresolvedDependency { module: ModuleId, reason: String },

    #[error("Timed out after {waited:?} loading `{module}` from {location}")]
    Timeout {
        module: ModuleId,
        location: String,
        waited: Duration,
    },

    #[error("Failed to fetch `{module}` from {location}: {reason}")]
    Fetch {
        module: ModuleId,
        location: String,
        reason: String,
    },

    #[error("Module `{module}` failed to execute: {reason}")]
    Execution { module: ModuleId, reason: String },

    #[error(
        "Bootstrap incomplete: {} module(s) failed, {} module(s) not executed",
        failures.len(),
        skipped.len()
    )]
    Incomplete {
        /// One entry per offending resource
        failures: Vec<LoaderError>,
        /// Modules not executed because a prerequisite failed
        skipped: Vec<ModuleId>,
    },
}

impl LoaderError {
    /// Individual failures carried by this error
    ///
    /// Returns the nested failures for `Incomplete`, otherwise the error itself.
    pub fn failures(&self) -> Vec<&LoaderError> {
        match self {
            LoaderError::Incomplete { failures, .. } => failures.iter().collect(),
            other => vec![other],
        }
    }

    /// Module the error is about, if it concerns a single module
    pub fn module(&self) -> Option<&ModuleId> {
        match self {
            LoaderError::UnresolvedDependency { module, .. }
            | LoaderError::Timeout { module, .. }
            | LoaderError::Fetch { module, .. }
            | LoaderError::Execution { module, .. } => Some(module),
            LoaderError::Configuration(_) | LoaderError::Incomplete { .. } => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LoaderError::Timeout { .. })
    }
}
