//! Helpers shared by subcommands

use anyhow::{Context, Result};
use sas_core::config::SasConfig;
use sas_core::RegistryConfig;
use std::path::Path;

/// Load a config file, apply `SAS_` overrides and validate
pub fn load_config(path: &Path) -> Result<RegistryConfig> {
    let mut config = RegistryConfig::load_from_file(path)?;
    config
        .merge_with_env()
        .context("Failed to apply environment overrides")?;
    config
        .validate()
        .with_context(|| format!("Config {} failed validation", path.display()))?;
    Ok(config)
}
