// src/serve/mod.rs

//! Dev server with live reload.
//!
//! This module ties together:
//! - a static file server rooted at the generator's output directory
//!   (`axum` + `tower-http`'s `ServeDir`)
//! - a WebSocket endpoint that pushes a reload message to connected
//!   browsers
//! - the bridge that consumes output-directory change events and turns
//!   each one into a reload broadcast
//!
//! The integration point with the build side is the file system only: the
//! generator writes the output directory, the watcher in [`crate::watch`]
//! observes it.

pub mod reload;
pub mod server;

pub use reload::{spawn_reload_bridge, ReloadHub, ReloadMessage};
pub use server::{build_router, ensure_document_root, spawn_server, ServeConfig};
