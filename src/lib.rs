// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod registry;
pub mod serve;
pub mod watch;

use std::path::PathBuf;

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader;
use crate::engine::{ProcessLauncher, Runner, RunnerEvent, TaskLauncher};
use crate::registry::{resolve_plan, TaskAction, TaskRegistry, TaskSpec};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the task registry and launch plan
/// - the launcher (generator process / dev server)
/// - the runner event loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    if !config_path.exists() && config_path != loader::default_config_path() {
        bail!("config file {:?} does not exist", config_path);
    }

    let cfg = loader::load_and_validate(&config_path)?;

    let registry = TaskRegistry::from_config(&cfg);
    let plan = resolve_plan(&registry, &args.task)?;

    if args.dry_run {
        print_dry_run(&plan);
        return Ok(());
    }

    // Runner event channel.
    let (runner_tx, runner_rx) = mpsc::channel::<RunnerEvent>(64);

    // Ctrl-C -> graceful shutdown.
    {
        let tx = runner_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RunnerEvent::ShutdownRequested).await;
        });
    }

    let mut launcher = ProcessLauncher::new();
    launch_plan(&mut launcher, &plan, &runner_tx).await?;

    let names = plan.iter().map(|spec| spec.name.clone());
    let runner = Runner::new(names, runner_rx);
    runner.run().await
}

/// Launch every task in the plan, dependencies first.
///
/// Each task's `TaskStarted` event is sent before its action is launched,
/// so the runner observes `NotStarted -> Running` before any exit. All
/// launched actions run concurrently; launching only guarantees a task's
/// dependencies have been *started* before it. A launch error (e.g. missing
/// output directory, occupied port) aborts startup.
pub async fn launch_plan(
    launcher: &mut dyn TaskLauncher,
    plan: &[&TaskSpec],
    events: &mpsc::Sender<RunnerEvent>,
) -> Result<()> {
    for spec in plan {
        info!(task = %spec.name, "launching task");
        events
            .send(RunnerEvent::TaskStarted {
                task: spec.name.clone(),
            })
            .await?;
        launcher.launch((*spec).clone(), events.clone()).await?;
    }
    Ok(())
}

/// Simple dry-run output: print the resolved plan and what each task would do.
fn print_dry_run(plan: &[&TaskSpec]) {
    println!("siteloop dry-run");
    println!();

    println!("plan ({} task(s)):", plan.len());
    for spec in plan {
        println!("  - {}", spec.name);
        if !spec.deps.is_empty() {
            println!("      deps: {:?}", spec.deps);
        }
        match &spec.action {
            TaskAction::Build(command) => {
                println!("      cmd: {}", command.display());
                println!("      output_dir: {:?}", command.output_dir);
            }
            TaskAction::Serve(config) => {
                println!("      addr: {}:{}", config.host, config.port);
                println!("      root: {:?}", config.root);
                if config.debounce_ms > 0 {
                    println!("      debounce_ms: {}", config.debounce_ms);
                }
            }
            TaskAction::Composite => {
                println!("      (composite; no action of its own)");
            }
        }
    }
}
