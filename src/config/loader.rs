// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;

/// Load a configuration file from a given path and return the raw `ConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    Ok(config)
}

/// Load a configuration file if it exists, otherwise use built-in defaults.
///
/// The built-in defaults reproduce the Jekyll + live-reload loop, so running
/// `siteloop` in a Jekyll project without a `Siteloop.toml` works out of the
/// box.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if path.exists() {
        load_from_path(path)
    } else {
        info!("no config file at {:?}; using built-in defaults", path);
        Ok(ConfigFile::default())
    }
}

/// Load a configuration (file or defaults) and run basic validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML (or falls back to defaults when the file is absent).
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for a usable generator invocation and bind address.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_or_default(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Helper to resolve a default config path.
///
/// Currently this just returns `Siteloop.toml` in the current working
/// directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Siteloop.toml")
}
