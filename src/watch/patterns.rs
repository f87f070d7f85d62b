// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled watch/exclude glob patterns for the output directory.
///
/// Patterns are relative to the watch root (the output directory). The
/// watcher passes relative paths (e.g. `"posts/index.html"`) into
/// [`WatchProfile::matches`].
#[derive(Clone)]
pub struct WatchProfile {
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for WatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchProfile").finish_non_exhaustive()
    }
}

impl WatchProfile {
    /// Compile a profile from watch and exclude pattern lists.
    pub fn from_patterns(watch: &[String], exclude: &[String]) -> Result<Self> {
        let watch_set =
            build_globset(watch).context("building watch globset for the output directory")?;

        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(
                build_globset(exclude)
                    .context("building exclude globset for the output directory")?,
            )
        };

        Ok(Self {
            watch_set,
            exclude_set,
        })
    }

    /// Returns true if a change to the given path (relative to the watch
    /// root) should trigger a reload.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
