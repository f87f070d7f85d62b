// src/exec/generator.rs

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::model::BuildSection;
use crate::engine::{RunnerEvent, TaskName, TaskOutcome};

/// Typed invocation of the external site generator.
///
/// This is the whole "build" step: a binary, its leading arguments, the
/// watch/polling flags and the ordered list of generator config files. The
/// generator owns the output directory; siteloop only reads/watches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    /// Generator binary, e.g. `jekyll`.
    pub program: String,
    /// Leading arguments, e.g. `["build"]`.
    pub args: Vec<String>,
    /// Whether to request continuous rebuild on source changes.
    pub watch: bool,
    /// Whether to request polling-based change detection.
    pub force_polling: bool,
    /// Config files merged by the generator in listed order.
    pub config_files: Vec<PathBuf>,
    /// Directory the generator writes output into.
    pub output_dir: PathBuf,
}

impl BuildCommand {
    /// Build the command from the `[build]` config section.
    pub fn from_config(build: &BuildSection) -> Self {
        Self {
            program: build.generator.clone(),
            args: build.args.clone(),
            watch: build.watch,
            force_polling: build.force_polling,
            config_files: build.config_files.clone(),
            output_dir: build.output_dir.clone(),
        }
    }

    /// The full argument vector passed to [`Self::program`], in fixed order:
    /// leading args, `--watch`, `--force_polling`, then `--config` with the
    /// comma-joined config file list.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.args.clone();
        if self.watch {
            argv.push("--watch".to_string());
        }
        if self.force_polling {
            argv.push("--force_polling".to_string());
        }
        if !self.config_files.is_empty() {
            argv.push("--config".to_string());
            argv.push(self.config_file_list());
        }
        argv
    }

    /// Comma-joined config file list, in listed (merge) order.
    pub fn config_file_list(&self) -> String {
        self.config_files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// One-line rendering for logs and `--dry-run` output.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.argv());
        parts.join(" ")
    }
}

/// Spawn the generator process for a task and monitor it in the background.
///
/// The process is spawned directly (no shell); the argument list is exactly
/// [`BuildCommand::argv`]. The monitor drains stdout/stderr into logs and
/// emits a single `TaskExited` event when the process ends.
///
/// Spawn or wait errors are converted into a failed exit with code -1, so
/// the runner always observes a terminal state for the task.
pub fn spawn_generator(
    task: TaskName,
    command: BuildCommand,
    runtime_tx: mpsc::Sender<RunnerEvent>,
) {
    tokio::spawn(async move {
        let task_name = task.clone();
        if let Err(err) = run_generator(task, command, &runtime_tx).await {
            error!(task = %task_name, error = %err, "generator execution error");
            let _ = runtime_tx
                .send(RunnerEvent::TaskExited {
                    task: task_name,
                    outcome: TaskOutcome::Failed(-1),
                })
                .await;
        }
    });
}

async fn run_generator(
    task: TaskName,
    command: BuildCommand,
    runtime_tx: &mpsc::Sender<RunnerEvent>,
) -> Result<()> {
    info!(task = %task, cmd = %command.display(), "starting generator process");

    let mut cmd = Command::new(&command.program);
    cmd.args(command.argv())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning generator '{}' for task '{task}'", command.program))?;

    // Drain both pipes so OS buffers don't fill; generator output is useful
    // at debug level while iterating on a site.
    if let Some(stdout) = child.stdout.take() {
        let task_name = task.clone();
        tokio::spawn(async move {
            let reader = BufReader::new(stdout);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stdout: {}", line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let task_name = task.clone();
        tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for generator process of task '{task}'"))?;

    let code = status.code().unwrap_or(-1);
    let outcome = if status.success() {
        TaskOutcome::Success
    } else {
        TaskOutcome::Failed(code)
    };

    info!(
        task = %task,
        exit_code = code,
        success = status.success(),
        "generator process exited"
    );

    runtime_tx
        .send(RunnerEvent::TaskExited { task: task.clone(), outcome })
        .await
        .with_context(|| format!("sending TaskExited event for task '{task}' to runner"))?;

    Ok(())
}
