// src/watch/mod.rs

//! Output-directory watching.
//!
//! This module is responsible for:
//! - Compiling the `[serve]` `watch` / `exclude` glob patterns.
//! - Wiring up a cross-platform filesystem watcher (`notify`) over the
//!   generator's output directory.
//!
//! It does **not** know about tasks or browsers; it only turns filesystem
//! changes into a stream of [`ChangeEvent`]s. The reload side consumes that
//! stream in `serve::reload`.

pub mod patterns;
pub mod watcher;

pub use patterns::WatchProfile;
pub use watcher::{changes_for_paths, spawn_output_watcher, ChangeEvent, WatcherHandle};
