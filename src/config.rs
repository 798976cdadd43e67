//! Diagram generation settings from the environment.
//!
//! All variables are optional. Unparsable values fall back to the default
//! rather than failing startup; only values that parse but make no sense
//! are rejected.

use std::time::Duration;

use crate::ErrorCode;
use crate::mermaid::LayoutOverrides;

pub const DEFAULT_CREATE_CONCURRENCY: usize = 1;
pub const DEFAULT_CREATE_TIMEOUT_SECS: u64 = 0;

const CONCURRENCY_VAR: &str = "DIAGRAM_CREATE_CONCURRENCY";
const TIMEOUT_VAR: &str = "DIAGRAM_CREATE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be at least 1")]
    ZeroConcurrency { var: &'static str },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        "E_CONFIG"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramConfig {
    /// Creation calls in flight at once within a phase.
    pub create_concurrency: usize,
    /// Wall-clock budget for the creation phases; `None` means unbounded.
    pub create_timeout: Option<Duration>,
    /// Deployment-wide geometry; per-request overrides are layered on top.
    pub layout: LayoutOverrides,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            create_concurrency: DEFAULT_CREATE_CONCURRENCY,
            create_timeout: timeout_from_secs(DEFAULT_CREATE_TIMEOUT_SECS),
            layout: LayoutOverrides::default(),
        }
    }
}

impl DiagramConfig {
    /// Read configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroConcurrency`] if `DIAGRAM_CREATE_CONCURRENCY` is 0.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroConcurrency`] if the concurrency variable is 0.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let create_concurrency = env_parse(&lookup, CONCURRENCY_VAR, DEFAULT_CREATE_CONCURRENCY);
        if create_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency { var: CONCURRENCY_VAR });
        }
        let create_timeout = timeout_from_secs(env_parse(&lookup, TIMEOUT_VAR, DEFAULT_CREATE_TIMEOUT_SECS));

        let layout = LayoutOverrides {
            node_width: env_f64(&lookup, "DIAGRAM_NODE_WIDTH"),
            node_height: env_f64(&lookup, "DIAGRAM_NODE_HEIGHT"),
            spacing_x: env_f64(&lookup, "DIAGRAM_SPACING_X"),
            spacing_y: env_f64(&lookup, "DIAGRAM_SPACING_Y"),
            ..LayoutOverrides::default()
        };

        Ok(Self { create_concurrency, create_timeout, layout })
    }
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn env_parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_f64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<f64> {
    lookup(key).and_then(|v| v.trim().parse::<f64>().ok())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
