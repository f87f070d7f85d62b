// src/registry/mod.rs

//! Explicit task registry.
//!
//! The registry is a plain value constructed once at startup and passed to
//! the runner; there is no ambient global task registration.
//!
//! - [`model`] defines [`TaskSpec`], [`TaskAction`], [`TaskState`] and the
//!   [`TaskRegistry`] map itself.
//! - [`resolve`] validates the dependency graph and computes the
//!   dependencies-first launch plan for a named task.

pub mod model;
pub mod resolve;

pub use model::{TaskAction, TaskRegistry, TaskSpec, TaskState};
pub use resolve::{resolve_plan, validate_registry};
