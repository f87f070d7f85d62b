use std::error::Error;

use tokio::sync::mpsc;

use siteloop::engine::{RunFailure, Runner, RunnerEvent, TaskOutcome};
use siteloop::registry::TaskState;

type TestResult = Result<(), Box<dyn Error>>;

fn tracked_tasks() -> Vec<String> {
    vec![
        "build".to_string(),
        "serve".to_string(),
        "default".to_string(),
    ]
}

async fn start(tx: &mpsc::Sender<RunnerEvent>, task: &str) -> TestResult {
    tx.send(RunnerEvent::TaskStarted {
        task: task.to_string(),
    })
    .await?;
    Ok(())
}

async fn exit(tx: &mpsc::Sender<RunnerEvent>, task: &str, outcome: TaskOutcome) -> TestResult {
    tx.send(RunnerEvent::TaskExited {
        task: task.to_string(),
        outcome,
    })
    .await?;
    Ok(())
}

#[test]
fn tasks_begin_not_started() {
    let (_tx, rx) = mpsc::channel::<RunnerEvent>(8);
    let runner = Runner::new(tracked_tasks(), rx);

    assert_eq!(runner.state_of("build"), Some(TaskState::NotStarted));
    assert_eq!(runner.state_of("serve"), Some(TaskState::NotStarted));
    assert_eq!(runner.state_of("default"), Some(TaskState::NotStarted));
    assert_eq!(runner.state_of("deploy"), None);
}

#[tokio::test]
async fn failed_build_fails_the_overall_run() -> TestResult {
    let (tx, rx) = mpsc::channel::<RunnerEvent>(8);
    let runner = Runner::new(tracked_tasks(), rx);

    for task in ["build", "serve", "default"] {
        start(&tx, task).await?;
    }
    exit(&tx, "default", TaskOutcome::Success).await?;
    exit(&tx, "build", TaskOutcome::Failed(1)).await?;
    // Serve is still running; shut down as Ctrl-C would.
    tx.send(RunnerEvent::ShutdownRequested).await?;

    let err = runner.run().await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("build"));
    assert!(msg.contains("exit code 1"));
    Ok(())
}

#[tokio::test]
async fn failure_carries_the_task_exit_code() -> TestResult {
    let (tx, rx) = mpsc::channel::<RunnerEvent>(8);
    let runner = Runner::new(vec!["build".to_string()], rx);

    start(&tx, "build").await?;
    exit(&tx, "build", TaskOutcome::Failed(3)).await?;

    let err = runner.run().await.unwrap_err();
    let failure = err
        .downcast_ref::<RunFailure>()
        .ok_or("expected a RunFailure")?;
    assert_eq!(failure.exit_code(), 3);
    assert_eq!(failure.failed(), &[("build".to_string(), 3)]);
    Ok(())
}

#[tokio::test]
async fn failure_without_a_usable_code_maps_to_one() -> TestResult {
    // A task killed by a signal reports -1; the process exit code must
    // still be a conventional failure code.
    let (tx, rx) = mpsc::channel::<RunnerEvent>(8);
    let runner = Runner::new(vec!["serve".to_string()], rx);

    start(&tx, "serve").await?;
    exit(&tx, "serve", TaskOutcome::Failed(-1)).await?;

    let err = runner.run().await.unwrap_err();
    let failure = err
        .downcast_ref::<RunFailure>()
        .ok_or("expected a RunFailure")?;
    assert_eq!(failure.exit_code(), 1);
    Ok(())
}

#[tokio::test]
async fn all_tasks_succeeding_yields_ok() -> TestResult {
    let (tx, rx) = mpsc::channel::<RunnerEvent>(8);
    let runner = Runner::new(tracked_tasks(), rx);

    for task in ["build", "serve", "default"] {
        start(&tx, task).await?;
        exit(&tx, task, TaskOutcome::Success).await?;
    }

    // The loop ends on its own once every task has exited.
    runner.run().await?;
    Ok(())
}

#[tokio::test]
async fn shutdown_with_tasks_still_running_is_not_a_failure() -> TestResult {
    let (tx, rx) = mpsc::channel::<RunnerEvent>(8);
    let runner = Runner::new(tracked_tasks(), rx);

    start(&tx, "build").await?;
    start(&tx, "serve").await?;
    tx.send(RunnerEvent::ShutdownRequested).await?;

    runner.run().await?;
    Ok(())
}

#[tokio::test]
async fn failures_are_remembered_across_shutdown() -> TestResult {
    let (tx, rx) = mpsc::channel::<RunnerEvent>(8);
    let runner = Runner::new(tracked_tasks(), rx);

    start(&tx, "serve").await?;
    exit(&tx, "serve", TaskOutcome::Failed(-1)).await?;
    tx.send(RunnerEvent::ShutdownRequested).await?;

    assert!(runner.run().await.is_err());
    Ok(())
}
