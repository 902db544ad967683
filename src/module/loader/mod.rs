//! Module loading system
//!
//! Configuration, load planning, concurrent fetching and ordered execution.

mod fetch;
pub mod loader;
pub mod plan;

pub use loader::BootstrapLoader;
pub use plan::{LoadPlan, PlannedModule};
