// src/config/mod.rs

//! Configuration loading and validation for siteloop.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, falling back to defaults (`loader.rs`).
//! - Validate basic invariants like a usable bind address (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{BuildSection, ConfigFile, ServeSection};
pub use validate::validate_config;
