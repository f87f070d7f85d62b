// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the external site
//! generator, using `tokio::process::Command`, and reporting back to the
//! runner via `RunnerEvent`s.
//!
//! - [`generator`] owns the typed [`generator::BuildCommand`] invocation and
//!   the process monitor that turns its exit status into a task outcome.

pub mod generator;

pub use generator::{spawn_generator, BuildCommand};
