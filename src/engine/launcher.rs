// src/engine/launcher.rs

//! Pluggable task launcher abstraction.
//!
//! The run loop talks to a `TaskLauncher` instead of spawning processes and
//! servers directly. This keeps the launch plan testable: tests can provide a
//! launcher that records which tasks were started and emits `TaskExited`
//! events without touching the OS.
//!
//! - [`ProcessLauncher`] is the production implementation. It spawns the
//!   generator process for `Build` actions and the dev server (plus its
//!   output watcher) for `Serve` actions.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::{RunnerEvent, TaskOutcome};
use crate::errors::{Error, Result};
use crate::exec::spawn_generator;
use crate::registry::{TaskAction, TaskSpec};
use crate::serve::spawn_server;

/// Trait abstracting how a task's action is started.
///
/// Launch errors (e.g. a missing output directory or an occupied port) are
/// returned directly so startup can fail fast; exits of successfully
/// launched tasks are reported later via `RunnerEvent::TaskExited`.
pub trait TaskLauncher: Send {
    /// Start the action of the given task.
    fn launch(
        &mut self,
        spec: TaskSpec,
        events: mpsc::Sender<RunnerEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real launcher used in production.
#[derive(Debug, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl TaskLauncher for ProcessLauncher {
    fn launch(
        &mut self,
        spec: TaskSpec,
        events: mpsc::Sender<RunnerEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            match spec.action {
                TaskAction::Build(command) => {
                    spawn_generator(spec.name, command, events);
                    Ok(())
                }
                TaskAction::Serve(config) => spawn_server(spec.name, config, events).await,
                TaskAction::Composite => {
                    // Nothing to run; the composite's dependencies were
                    // launched before it in the plan.
                    debug!(task = %spec.name, "composite task; no action of its own");
                    events
                        .send(RunnerEvent::TaskExited {
                            task: spec.name,
                            outcome: TaskOutcome::Success,
                        })
                        .await
                        .map_err(Error::from)?;
                    Ok(())
                }
            }
        })
    }
}
