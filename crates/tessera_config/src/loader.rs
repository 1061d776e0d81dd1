//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::RunConfig;
use std::path::Path;

/// Loads and validates a run configuration from `config_path`.
pub fn load_config(config_path: &Path) -> Result<RunConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a run configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<RunConfig, ConfigError> {
    let config: RunConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
fn validate_config(config: &RunConfig) -> Result<(), ConfigError> {
    if config.design.name.is_empty() {
        return Err(ConfigError::MissingField("design.name".to_string()));
    }
    let inputs = &config.inputs;
    for (field, value) in [
        ("inputs.arch", &inputs.arch),
        ("inputs.circuit", &inputs.circuit),
        ("inputs.rrg", &inputs.rrg),
        ("inputs.packed", &inputs.packed),
        ("inputs.place", &inputs.place),
        ("inputs.route", &inputs.route),
    ] {
        if value.is_empty() {
            return Err(ConfigError::MissingField(field.to_string()));
        }
    }
    if !matches!(config.engine.clock_mux_default, '0' | '1') {
        return Err(ConfigError::ValidationError(format!(
            "engine.clock_mux_default must be '0' or '1', got '{}'",
            config.engine.clock_mux_default
        )));
    }
    Ok(())
}
