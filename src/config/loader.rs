//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `auth.api_key`.
pub const ENV_API_KEY: &str = "API_KEY";
/// Environment variable overriding `rate_limit.max_requests`.
pub const ENV_MAX_REQUESTS: &str = "GATE_MAX_REQUESTS";
/// Environment variable overriding `rate_limit.window_secs`.
pub const ENV_WINDOW_SECS: &str = "GATE_WINDOW_SECS";
/// Environment variable overriding `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "GATE_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GateConfig, ConfigError> {
    let config: GateConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Apply overrides from the process environment, then re-validate.
pub fn apply_env_overrides(config: GateConfig) -> Result<GateConfig, ConfigError> {
    apply_overrides(config, |var| std::env::var(var).ok())
}

/// Apply overrides from an arbitrary variable lookup, then re-validate.
pub fn apply_overrides<F>(mut config: GateConfig, lookup: F) -> Result<GateConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(ENV_API_KEY) {
        config.auth.api_key = key;
    }
    if let Some(value) = lookup(ENV_MAX_REQUESTS) {
        config.rate_limit.max_requests = value
            .parse()
            .map_err(|_| ConfigError::Env { var: ENV_MAX_REQUESTS, value })?;
    }
    if let Some(value) = lookup(ENV_WINDOW_SECS) {
        config.rate_limit.window_secs = value
            .parse()
            .map_err(|_| ConfigError::Env { var: ENV_WINDOW_SECS, value })?;
    }
    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
