// src/registry/model.rs

use std::collections::BTreeMap;

use crate::config::model::ConfigFile;
use crate::engine::{TaskName, TaskOutcome};
use crate::exec::BuildCommand;
use crate::serve::ServeConfig;

/// What a task does when launched.
#[derive(Debug, Clone)]
pub enum TaskAction {
    /// Run the external site generator (long-running in watch mode).
    Build(BuildCommand),
    /// Serve the output directory with live reload (long-running).
    Serve(ServeConfig),
    /// No action of its own; exists only to pull in its dependencies.
    Composite,
}

/// A named task: an action plus the names of tasks that must be started
/// before or alongside it.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub name: TaskName,
    pub action: TaskAction,
    pub deps: Vec<TaskName>,
}

/// Lifecycle of a launched task. There are no transitions back to
/// `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    NotStarted,
    Running,
    Exited(TaskOutcome),
}

/// Mapping from task name to [`TaskSpec`], write-once at startup.
///
/// `BTreeMap` keeps iteration (and thus dry-run output and launch plans)
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, TaskSpec>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard three-task registry from a validated config:
    ///
    /// - `build`: the generator invocation
    /// - `serve`: the dev server rooted at the generator's output directory
    /// - `default`: composite of `build` + `serve`
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let mut registry = Self::new();

        registry.insert(TaskSpec {
            name: "build".to_string(),
            action: TaskAction::Build(BuildCommand::from_config(&cfg.build)),
            deps: Vec::new(),
        });

        registry.insert(TaskSpec {
            name: "serve".to_string(),
            action: TaskAction::Serve(ServeConfig::from_config(cfg)),
            deps: Vec::new(),
        });

        registry.insert(TaskSpec {
            name: "default".to_string(),
            action: TaskAction::Composite,
            deps: vec!["build".to_string(), "serve".to_string()],
        });

        registry
    }

    /// Insert (or replace) a task spec.
    pub fn insert(&mut self, spec: TaskSpec) {
        self.tasks.insert(spec.name.clone(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// All task names, in deterministic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    /// All task specs, in deterministic order.
    pub fn specs(&self) -> impl Iterator<Item = &TaskSpec> {
        self.tasks.values()
    }
}
