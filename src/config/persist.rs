//! Writing configuration files.

use super::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Render a config as TOML.
pub fn to_toml(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).with_context(|| "Failed to serialize config")
}

/// Write `config` to `path`, creating parent directories.
///
/// Refuses to replace an existing file unless `overwrite` is set.
pub fn save_config(path: &Path, config: &Config, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        anyhow::bail!("Config file already exists: {:?}", path);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    std::fs::write(path, to_toml(config)?)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}
