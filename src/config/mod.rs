mod defaults;
pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default search locations, in order.
pub const DEFAULT_PATHS: &[&str] = &[
    "./sidbroker.toml",
    "~/.config/sidbroker/config.toml",
    "/etc/sidbroker/config.toml",
];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config).with_context(|| format!("Invalid config file: {:?}", path))?;

    prepare_config(&mut config);

    Ok(config)
}

/// Load config from default locations or return the built-in catalog
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    if let Some(path) = find_config() {
        tracing::debug!("Using config file {:?}", path);
        return load_config(&path);
    }

    tracing::debug!("No config file found, using built-in catalog");
    let mut config = Config::default();
    prepare_config(&mut config);
    Ok(config)
}

/// The first default location that exists.
pub fn find_config() -> Option<PathBuf> {
    DEFAULT_PATHS.iter().find_map(|path_str| {
        let path = PathBuf::from(shellexpand::tilde(path_str).as_ref());
        path.exists().then_some(path)
    })
}

fn prepare_config(config: &mut Config) {
    let root = config.broker.sid_root.to_string_lossy().to_string();
    config.broker.sid_root = PathBuf::from(shellexpand::tilde(&root).as_ref());
}

/// Validate configuration
fn validate_config(config: &Config) -> sidbroker_common::Result<()> {
    config.catalogs()?;

    config
        .package_set()
        .validate()
        .map_err(sidbroker_common::Error::from)?;

    for job in &config.jobs {
        if job.batch.is_none() {
            continue;
        }
        for req in &job.requires {
            if !config.packages.contains_key(req) {
                tracing::warn!("Job '{}' requires undefined package '{}'", job.name, req);
            }
        }
    }

    if !config.broker.sid_root.exists() {
        tracing::warn!("Sid root does not exist: {:?}", config.broker.sid_root);
    }

    Ok(())
}
