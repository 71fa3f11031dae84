// Configuration loader
// Loads settings from ~/.vigil/config.toml, falling back to built-in defaults

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;
use crate::crisis::KeywordTables;
use crate::errors::{config_parse_error, keywords_file_error};

/// Default config location, if a home directory exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".vigil/config.toml"))
}

/// Load configuration from the Vigil config file, or defaults when absent
pub fn load_config() -> Result<Config> {
    match default_config_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => {
            tracing::debug!("No config file found, using built-in defaults");
            Ok(Config::default())
        }
    }
}

/// Load configuration from an explicit path
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow!(config_parse_error(&path.display().to_string(), &e.to_string())))?;

    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    tracing::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolve the keyword tables named by the config, or the built-in ones
pub fn load_keywords(config: &Config) -> Result<KeywordTables> {
    match &config.keywords_path {
        Some(path) => KeywordTables::load_from_file(path).map_err(|e| {
            anyhow!(keywords_file_error(
                &path.display().to_string(),
                &format!("{:#}", e)
            ))
        }),
        None => Ok(KeywordTables::default()),
    }
}
