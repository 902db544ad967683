//! Named configuration presets
//!
//! The web client ships the same bootstrap in two variants that differ only in
//! the wait policy. Both are kept as presets; the environment selects one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use super::{ResolutionConfig, WaitPolicy};
use crate::utils::env_opt;

/// Environment variable selecting a preset
pub const PRESET_ENV_VAR: &str = "BOOTSTRAP_PRESET";

/// Script directory of the web client
pub const WEBTILES_BASE_URL: &str = "/crawl/static/scripts";

/// Vendored copy of the DOM utility library
pub const WEBTILES_JQUERY_PATH: &str = "/crawl/static/scripts/contrib/jquery";

/// Entry-point module of the web client
pub const WEBTILES_ENTRY: &str = "client";

/// Named bootstrap preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Default wait limit on every fetch
    #[default]
    Standard,
    /// Timeouts disabled (`waitSeconds = 0`)
    NoTimeout,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Standard, Preset::NoTimeout];

    /// Build the resolution configuration for this preset
    pub fn config(self) -> ResolutionConfig {
        let wait = match self {
            Preset::Standard => WaitPolicy::default(),
            Preset::NoTimeout => WaitPolicy::Disabled,
        };

        ResolutionConfig::new(WEBTILES_BASE_URL)
            .with_shim(WEBTILES_ENTRY, ["jquery"])
            .with_path("jquery", WEBTILES_JQUERY_PATH)
            .with_wait(wait)
            .with_deps([WEBTILES_ENTRY])
    }

    /// Read the preset named by `BOOTSTRAP_PRESET`
    ///
    /// Unknown names are logged and ignored.
    pub fn from_env() -> Option<Preset> {
        let name = env_opt(PRESET_ENV_VAR)?;
        match name.parse() {
            Ok(preset) => Some(preset),
            Err(e) => {
                warn!("Ignoring {}: {}", PRESET_ENV_VAR, e);
                None
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Standard => "standard",
            Preset::NoTimeout => "no-timeout",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Preset::Standard),
            "no-timeout" | "no_timeout" | "notimeout" => Ok(Preset::NoTimeout),
            other => Err(format!(
                "unknown preset {:?} (expected one of: standard, no-timeout)",
                other
            )),
        }
    }
}
