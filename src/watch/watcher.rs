// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::watch::patterns::WatchProfile;

/// A single filesystem change under the watch root.
///
/// The watcher emits one event per matching path of each underlying
/// filesystem notification; the reload bridge issues one broadcast per
/// event (unless debouncing is configured).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Changed path, relative to the watch root, with forward slashes.
    pub path: String,
}

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher that observes the given `root` directory
/// recursively and sends a [`ChangeEvent`] for every changed path matching
/// the profile.
///
/// Registration failures (e.g. the root does not exist) are returned
/// directly so serve startup can surface them.
pub fn spawn_output_watcher(
    root: impl Into<PathBuf>,
    profile: WatchProfile,
    changes_tx: mpsc::Sender<ChangeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone()); // best-effort

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        {
            let event_tx = event_tx.clone();
            move |res: notify::Result<Event>| {
                match res {
                    Ok(event) => {
                        if let Err(err) = event_tx.send(event) {
                            // We can't log via tracing here easily, so fallback to stderr.
                            eprintln!("siteloop: failed to forward notify event: {err}");
                        }
                    }
                    Err(err) => {
                        eprintln!("siteloop: file watch error: {err}");
                    }
                }
            }
        },
        Config::default(),
    )?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("registering watch on output directory {:?}", root))?;

    info!("output watcher started on {:?}", root);

    // Async task that consumes notify events and forwards matching changes.
    let async_root = root.clone();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!("received notify event: {:?}", event);

            for change in changes_for_paths(&async_root, &event.paths, &profile) {
                debug!(path = %change.path, "output change matched watch profile");
                if let Err(err) = changes_tx.send(change).await {
                    warn!("failed to send ChangeEvent: {err}");
                    // If the reload side is gone, there's no point keeping
                    // the watcher loop alive.
                    return;
                }
            }
        }

        debug!("output watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Turn the paths of a single filesystem event into change events: one per
/// matching path, relativized against the watch root.
///
/// Paths outside the root or filtered out by the profile produce nothing.
pub fn changes_for_paths(
    root: &Path,
    paths: &[PathBuf],
    profile: &WatchProfile,
) -> Vec<ChangeEvent> {
    let mut changes = Vec::new();

    for path in paths {
        let Some(rel_str) = relative_str(root, path) else {
            warn!("could not relativize path {:?} against root {:?}", path, root);
            continue;
        };

        if profile.matches(&rel_str) {
            changes.push(ChangeEvent { path: rel_str });
        }
    }

    changes
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root` and cannot be relativized.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let s = rel.to_string_lossy().replace('\\', "/");
    Some(s)
}
