// src/errors.rs

//! Crate-wide error aliases.
//!
//! At the moment this is just a thin wrapper around `anyhow`, but the module
//! gives a single place to add more structured error types later.

pub use anyhow::{Error, Result};
