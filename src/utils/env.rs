//! Environment variable utilities
//!
//! Provides helpers for reading environment variables with defaults.

/// Get environment variable or return default value
///
/// # Example
/// ```rust
/// use module_bootstrap::utils::env_or_default;
///
/// let filter = env_or_default("BOOTSTRAP_LOG", "info");
/// ```
pub fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get environment variable as Option
///
/// Returns `Some(value)` if set and non-empty, `None` otherwise.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Check whether an environment variable is set at all
pub fn env_is_set(key: &str) -> bool {
    std::env::var_os(key).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_helpers() {
        std::env::set_var("MODULE_BOOTSTRAP_TEST_VAR", "value");
        assert_eq!(env_opt("MODULE_BOOTSTRAP_TEST_VAR").as_deref(), Some("value"));
        assert_eq!(env_or_default("MODULE_BOOTSTRAP_TEST_VAR", "x"), "value");
        assert!(env_is_set("MODULE_BOOTSTRAP_TEST_VAR"));

        std::env::set_var("MODULE_BOOTSTRAP_TEST_VAR", "");
        assert_eq!(env_opt("MODULE_BOOTSTRAP_TEST_VAR"), None);

        std::env::remove_var("MODULE_BOOTSTRAP_TEST_VAR");
        assert_eq!(env_or_default("MODULE_BOOTSTRAP_TEST_VAR", "x"), "x");
        assert!(!env_is_set("MODULE_BOOTSTRAP_TEST_VAR"));
    }
}
