// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// All sections and fields are optional; the defaults reproduce the classic
/// Jekyll + live-reload development loop:
///
/// ```toml
/// [build]
/// generator = "jekyll"
/// args = ["build"]
/// watch = true
/// force_polling = true
/// config_files = ["_config.yml", "_app/localhost_config.yml"]
/// output_dir = "_site"
///
/// [serve]
/// host = "127.0.0.1"
/// port = 4000
/// watch = ["**/*"]
/// exclude = []
/// debounce_ms = 0
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Generator invocation from `[build]`.
    #[serde(default)]
    pub build: BuildSection,

    /// Dev server + reload behaviour from `[serve]`.
    #[serde(default)]
    pub serve: ServeSection,
}

/// `[build]` section: how to invoke the external site generator.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Generator binary to run (e.g. `jekyll`).
    #[serde(default = "default_generator")]
    pub generator: String,

    /// Leading arguments passed before any flags (e.g. `["build"]`).
    #[serde(default = "default_build_args")]
    pub args: Vec<String>,

    /// Pass the generator's watch-mode flag so it keeps rebuilding on source
    /// changes.
    #[serde(default = "default_true")]
    pub watch: bool,

    /// Pass the generator's forced-polling flag, for file systems where
    /// native change notifications are unreliable.
    #[serde(default = "default_true")]
    pub force_polling: bool,

    /// Generator configuration files, merged by the generator in listed
    /// order (base config first, local override last).
    #[serde(default = "default_config_files")]
    pub config_files: Vec<PathBuf>,

    /// Directory the generator writes the built site into. This is also the
    /// document root of the `serve` task.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_generator() -> String {
    "jekyll".to_string()
}

fn default_build_args() -> Vec<String> {
    vec!["build".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_config_files() -> Vec<PathBuf> {
    vec![
        PathBuf::from("_config.yml"),
        PathBuf::from("_app/localhost_config.yml"),
    ]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("_site")
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            generator: default_generator(),
            args: default_build_args(),
            watch: default_true(),
            force_polling: default_true(),
            config_files: default_config_files(),
            output_dir: default_output_dir(),
        }
    }
}

/// `[serve]` section: dev server bind address and reload behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ServeSection {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Glob patterns (relative to the output directory) whose changes
    /// trigger a browser reload.
    #[serde(default = "default_serve_watch")]
    pub watch: Vec<String>,

    /// Glob patterns excluded from reload triggering.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Quiet window in milliseconds used to coalesce a burst of file changes
    /// into a single reload. `0` means one reload broadcast per change
    /// event.
    #[serde(default)]
    pub debounce_ms: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_serve_watch() -> Vec<String> {
    vec!["**/*".to_string()]
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            watch: default_serve_watch(),
            exclude: Vec::new(),
            debounce_ms: 0,
        }
    }
}
