//! Module registry and resolution
//!
//! Handles identifier resolution, shim dependency ordering, and the registry
//! of executed modules.

pub mod dependencies;
pub mod resolver;
pub mod store;

pub use dependencies::ShimGraph;
pub use resolver::{ModuleResolver, Resolution, ResolutionSource};
pub use store::ModuleRegistry;
