#![forbid(unsafe_code)]

//! Runtime defaults overridable from the environment.
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `CQ_RANGE_VALIDATION` | `off`, `warn`, `reject` | `off` |
//! | `CQ_IGNORE_DIMENSIONS` | bool (`1/0/true/false/yes/no/on/off`) | `false` |
//! | `CQ_HOST_LAYOUT_PHASE` | bool | `true` |
//!
//! Invalid values keep the default and are reported through
//! [`RuntimeConfig::from_env_with_diagnostics`].

use std::env;
use std::fmt;

use cq_layout::ValidationMode;
use tracing::warn;

use crate::effect::HostEnvironment;

pub const ENV_RANGE_VALIDATION: &str = "CQ_RANGE_VALIDATION";
pub const ENV_IGNORE_DIMENSIONS: &str = "CQ_IGNORE_DIMENSIONS";
pub const ENV_HOST_LAYOUT_PHASE: &str = "CQ_HOST_LAYOUT_PHASE";

/// Process-wide defaults for coordinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeConfig {
    pub validation: ValidationMode,
    pub ignore_dimensions: bool,
    pub host: HostEnvironment,
}

/// Parsed config plus every rejected value.
#[derive(Debug, Clone)]
pub struct RuntimeConfigParse {
    pub config: RuntimeConfig,
    pub errors: Vec<ConfigError>,
}

/// A rejected environment value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl RuntimeConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().config
    }

    /// Parse the environment and keep diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> RuntimeConfigParse {
        let parsed = from_env_with(|key| env::var(key).ok());
        for error in &parsed.errors {
            warn!(%error, "ignoring invalid runtime config value");
        }
        parsed
    }
}

fn from_env_with<F>(mut get: F) -> RuntimeConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = RuntimeConfig::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_RANGE_VALIDATION) {
        match ValidationMode::parse(&value) {
            Some(parsed) => config.validation = parsed,
            None => errors.push(ConfigError::new(
                "validation",
                value,
                "expected off|warn|reject",
            )),
        }
    }

    if let Some(value) = get(ENV_IGNORE_DIMENSIONS) {
        match parse_bool(&value) {
            Some(parsed) => config.ignore_dimensions = parsed,
            None => errors.push(ConfigError::new(
                "ignore_dimensions",
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }

    if let Some(value) = get(ENV_HOST_LAYOUT_PHASE) {
        match parse_bool(&value) {
            Some(parsed) => config.host.layout_phase = parsed,
            None => errors.push(ConfigError::new(
                "host_layout_phase",
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }

    RuntimeConfigParse { config, errors }
}

#[inline]
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
