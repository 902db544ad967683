//! Utility modules: logging setup, environment access, fetch timeouts

pub mod env;
pub mod logging;
pub mod timeout;

// Re-export commonly used items
pub use env::{env_is_set, env_opt, env_or_default};
#[cfg(feature = "json-logging")]
pub use logging::init_json_logging;
pub use logging::{init_logging, init_logging_from_config};
pub use timeout::with_wait_policy;
