//! Module Bootstrap - deterministic, dependency-ordered module loading
//!
//! This crate implements the bootstrap step of a script-based client: a
//! resolution configuration (base path, shim prerequisites, path overrides,
//! load timeout) is established once, then an entry request loads the entry
//! module and everything it needs.
//!
//! ## Design Principles
//!
//! 1. **Explicit loader context**: a [`BootstrapLoader`] value owned by the caller,
//!    configured exactly once, never a hidden global
//! 2. **Strict ordering**: a module never executes before its shim prerequisites
//! 3. **Explicit capabilities**: shimmed libraries hand their surface to dependents
//!    as values instead of through ambient globals
//! 4. **Opaque collaborators**: fetching and executing module code go through the
//!    [`ResourceFetcher`] and [`ModuleEvaluator`] traits
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use module_bootstrap::{BootstrapLoader, DigestEvaluator, FsFetcher, Preset};
//!
//! # async fn run() -> Result<(), module_bootstrap::LoaderError> {
//! let loader = BootstrapLoader::new(
//!     Arc::new(FsFetcher::new("webserver/static").with_mount("/crawl/static")),
//!     Arc::new(DigestEvaluator),
//! );
//! loader.configure(Preset::NoTimeout.config())?;
//! loader.start().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod module;
pub mod utils;

pub use config::{BootstrapConfig, LoggingConfig, Preset, ResolutionConfig, WaitPolicy};
pub use module::fetchers::{FsFetcher, StaticFetcher};
#[cfg(feature = "http")]
pub use module::fetchers::HttpFetcher;
pub use module::{
    BootstrapLoader, DigestEvaluator, FetchError, FnEvaluator, LoadPlan, LoaderError,
    LoaderPhase, ModuleEvaluator, ModuleId, ModuleUnit, ModuleValue, ResourceFetcher, Shim,
};
