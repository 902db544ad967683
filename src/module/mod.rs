//! Module system for module-bootstrap
//!
//! ## Architecture
//!
//! - **Resolution**: identifiers map to an override path or to the base path
//! - **Shim prerequisites**: modules that depend on global state declare what
//!   must run first; the values those modules produce are passed in explicitly
//! - **Concurrent fetch, serialized execution**: resources download in
//!   parallel, modules execute one at a time in dependency order
//! - **Single registry**: each identifier executes at most once per loader

pub mod evaluators;
pub mod fetchers;
pub mod loader;
pub mod registry;
pub mod shim;
pub mod traits;

pub use evaluators::{DigestEvaluator, FnEvaluator};
pub use loader::{BootstrapLoader, LoadPlan, PlannedModule};
pub use registry::{ModuleRegistry, ModuleResolver, Resolution, ResolutionSource, ShimGraph};
pub use shim::{Shim, ShimAdapter};
pub use traits::{
    FetchError, Imports, LoaderError, LoaderPhase, ModuleEvaluator, ModuleId, ModuleUnit,
    ModuleValue, ResourceFetcher,
};
