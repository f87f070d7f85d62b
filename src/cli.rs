// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `siteloop`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "siteloop",
    version,
    about = "Run a static-site generator in watch mode and serve its output with live reload.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run: `default`, `build`, or `serve`.
    ///
    /// `default` starts both `build` and `serve`.
    #[arg(value_name = "TASK", default_value = "default")]
    pub task: String,

    /// Path to the config file (TOML).
    ///
    /// Default: `Siteloop.toml` in the current working directory. If the
    /// default path does not exist, built-in defaults are used.
    #[arg(long, value_name = "PATH", default_value = "Siteloop.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITELOOP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task plan, but don't start anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
