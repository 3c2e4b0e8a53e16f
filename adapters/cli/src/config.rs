//! Loading of session configuration files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use trio_tiles_system_bootstrap::GameConfig;

/// Loads and validates the configuration at `path`, or the defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid configuration in {}", path.display()))
}

fn parse(contents: &str) -> Result<GameConfig> {
    let config: GameConfig =
        toml::from_str(contents).context("failed to parse configuration toml contents")?;
    config.validate()?;
    Ok(config)
}

/// Serializes the configuration back into TOML.
pub(crate) fn render(config: &GameConfig) -> Result<String> {
    toml::to_string_pretty(config).context("failed to serialize configuration")
}
