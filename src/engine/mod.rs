// src/engine/mod.rs

//! Orchestration engine for siteloop.
//!
//! This module ties together:
//! - the runner event loop that reacts to:
//!   - task exit events from the generator / dev server
//!   - shutdown signals
//! - the pluggable launcher that starts each task's action

pub mod launcher;
pub mod runtime;

pub use launcher::{ProcessLauncher, TaskLauncher};
pub use runtime::{RunFailure, Runner, RunnerEvent, TaskName, TaskOutcome};
