// src/engine/runtime.rs

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::registry::TaskState;

/// Public type alias for task names throughout the engine.
pub type TaskName = String;

/// Result of a task's process / handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(i32), // exit code
}

/// Events sent into the runner from launched tasks or external signals.
///
/// - `launch_plan` sends `TaskStarted` as each task is launched
/// - the generator monitor and the dev server send `TaskExited`
/// - Ctrl-C handling sends `ShutdownRequested`
#[derive(Debug, Clone)]
pub enum RunnerEvent {
    TaskStarted {
        task: TaskName,
    },
    TaskExited {
        task: TaskName,
        outcome: TaskOutcome,
    },
    ShutdownRequested,
}

/// Overall run failure: the tasks that exited with a non-success outcome.
///
/// Carrying the exit codes lets `main` inherit the failed task's exit code
/// as the process exit code.
#[derive(Debug, Clone)]
pub struct RunFailure {
    failed: Vec<(TaskName, i32)>,
}

impl RunFailure {
    /// The failed tasks with their exit codes, in task-name order.
    pub fn failed(&self) -> &[(TaskName, i32)] {
        &self.failed
    }

    /// Process exit code to use: the first failed task's exit code, mapped
    /// to 1 when the process died without a usable code (e.g. killed).
    pub fn exit_code(&self) -> i32 {
        self.failed
            .first()
            .map(|(_, code)| if *code > 0 { *code } else { 1 })
            .unwrap_or(1)
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .failed
            .iter()
            .map(|(name, code)| format!("{name} (exit code {code})"))
            .collect();
        write!(f, "task(s) failed: {}", parts.join(", "))
    }
}

impl std::error::Error for RunFailure {}

/// The orchestration runner.
///
/// Responsibilities:
/// - Track the lifecycle state of every launched task
///   (`Running -> Exited(outcome)`, never back).
/// - Consume `RunnerEvent`s until every task has exited or shutdown is
///   requested.
/// - Report an overall error if any task failed; task statuses stay
///   independent, so a failed `build` never marks `serve` successful.
pub struct Runner {
    states: BTreeMap<TaskName, TaskState>,
    events_rx: mpsc::Receiver<RunnerEvent>,
}

impl Runner {
    /// Create a runner tracking the given tasks, all `NotStarted`.
    ///
    /// Tasks transition to `Running` when their `TaskStarted` event arrives
    /// from `launch_plan`.
    pub fn new(
        tasks: impl IntoIterator<Item = TaskName>,
        events_rx: mpsc::Receiver<RunnerEvent>,
    ) -> Self {
        let states = tasks
            .into_iter()
            .map(|name| (name, TaskState::NotStarted))
            .collect();

        Self { states, events_rx }
    }

    /// Main event loop.
    ///
    /// Both `build` and `serve` are long-running, so in the usual case this
    /// loop only ends on Ctrl-C or when a task dies. The returned result is
    /// `Err` (a [`RunFailure`]) if any tracked task exited with failure.
    pub async fn run(mut self) -> Result<()> {
        info!("siteloop runner started");

        while !self.all_exited() {
            let Some(event) = self.events_rx.recv().await else {
                warn!("runner event channel closed with tasks still running");
                break;
            };

            debug!(?event, "runner received event");

            match event {
                RunnerEvent::TaskStarted { task } => {
                    self.handle_task_start(task);
                }
                RunnerEvent::TaskExited { task, outcome } => {
                    self.handle_task_exit(task, outcome);
                }
                RunnerEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping runner");
                    break;
                }
            }
        }

        info!("siteloop runner exiting");
        self.report()
    }

    /// Current state of a task, if tracked.
    pub fn state_of(&self, task: &str) -> Option<TaskState> {
        self.states.get(task).copied()
    }

    fn all_exited(&self) -> bool {
        self.states
            .values()
            .all(|state| matches!(state, TaskState::Exited(_)))
    }

    fn handle_task_start(&mut self, task: TaskName) {
        match self.states.get_mut(&task) {
            Some(state @ TaskState::NotStarted) => {
                debug!(task = %task, "task started");
                *state = TaskState::Running;
            }
            Some(_) => {
                warn!(task = %task, "start event for task that already started; ignoring");
            }
            None => {
                warn!(task = %task, "start event for unknown task; ignoring");
            }
        }
    }

    fn handle_task_exit(&mut self, task: TaskName, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Success => info!(task = %task, "task exited successfully"),
            TaskOutcome::Failed(code) => {
                warn!(task = %task, exit_code = code, "task failed");
            }
        }

        match self.states.get_mut(&task) {
            Some(state @ (TaskState::NotStarted | TaskState::Running)) => {
                if matches!(*state, TaskState::NotStarted) {
                    warn!(task = %task, "exit event for task that never reported a start");
                }
                *state = TaskState::Exited(outcome);
            }
            Some(TaskState::Exited(_)) => {
                warn!(task = %task, "exit event for task that already exited; ignoring");
            }
            None => {
                warn!(task = %task, "exit event for unknown task; ignoring");
            }
        }
    }

    /// Summarize per-task outcomes into the overall result.
    fn report(&self) -> Result<()> {
        let failed: Vec<(TaskName, i32)> = self
            .states
            .iter()
            .filter_map(|(name, state)| match state {
                TaskState::Exited(TaskOutcome::Failed(code)) => Some((name.clone(), *code)),
                _ => None,
            })
            .collect();

        if failed.is_empty() {
            Ok(())
        } else {
            Err(RunFailure { failed }.into())
        }
    }
}
