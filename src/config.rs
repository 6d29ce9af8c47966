use std::fs;
use std::path::Path;
use serde::Deserialize;
use crate::error::Error;

/// Session limits and simulation switches, loadable from TOML:
///
/// ```toml
/// max_iterations = 500
/// max_call_depth = 32
/// realtime_delay = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Body executions one loop may perform before it aborts.
    pub max_iterations: usize,
    /// Nested user function calls allowed before evaluation aborts.
    pub max_call_depth: usize,
    /// Whether `delay(ms)` blocks the calling thread.
    pub realtime_delay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_iterations: 100,
            max_call_depth: 64,
            realtime_delay: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}
