// src/config/validate.rs

use std::net::SocketAddr;

use anyhow::{anyhow, Context, Result};
use globset::Glob;

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `generator` is non-empty
/// - at least one generator config file is listed
/// - `output_dir` is non-empty
/// - `host:port` parses as a socket address
/// - all serve watch/exclude globs compile
///
/// It does **not** check that the generator binary exists or that the output
/// directory is present; the former is a spawn-time failure, the latter is a
/// serve-start failure with its own message.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_build(cfg)?;
    validate_serve(cfg)?;
    Ok(())
}

fn validate_build(cfg: &ConfigFile) -> Result<()> {
    if cfg.build.generator.trim().is_empty() {
        return Err(anyhow!("[build].generator must not be empty"));
    }

    if cfg.build.config_files.is_empty() {
        return Err(anyhow!(
            "[build].config_files must list at least one generator config file"
        ));
    }

    if cfg.build.output_dir.as_os_str().is_empty() {
        return Err(anyhow!("[build].output_dir must not be empty"));
    }

    Ok(())
}

fn validate_serve(cfg: &ConfigFile) -> Result<()> {
    let addr = format!("{}:{}", cfg.serve.host, cfg.serve.port);
    addr.parse::<SocketAddr>()
        .with_context(|| format!("invalid [serve] bind address '{addr}'"))?;

    if cfg.serve.watch.is_empty() {
        return Err(anyhow!(
            "[serve].watch must list at least one glob pattern"
        ));
    }

    for pat in cfg.serve.watch.iter().chain(cfg.serve.exclude.iter()) {
        Glob::new(pat).with_context(|| format!("invalid [serve] glob pattern: {pat}"))?;
    }

    Ok(())
}
