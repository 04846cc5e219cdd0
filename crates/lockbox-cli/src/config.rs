//! Loading the controller configuration from TOML.

use std::path::Path;

use anyhow::Context;
use lockbox_core::LockerConfig;

/// Read `path`, or use the defaults when no path is given.
pub fn load(path: Option<&Path>) -> anyhow::Result<LockerConfig> {
    let Some(path) = path else {
        return Ok(LockerConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid config file {}", path.display()))
}

/// Parse and validate a TOML document. Missing tables and keys take defaults.
pub fn parse(text: &str) -> anyhow::Result<LockerConfig> {
    let config: LockerConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}
