use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use siteloop::serve::{spawn_reload_bridge, ReloadHub};
use siteloop::watch::{changes_for_paths, spawn_output_watcher, ChangeEvent, WatchProfile};

type TestResult = Result<(), Box<dyn Error>>;

fn profile(watch: &[&str], exclude: &[&str]) -> Result<WatchProfile, Box<dyn Error>> {
    let watch: Vec<String> = watch.iter().map(|s| s.to_string()).collect();
    let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
    Ok(WatchProfile::from_patterns(&watch, &exclude)?)
}

#[test]
fn one_change_event_per_matching_path() -> TestResult {
    let profile = profile(&["**/*"], &[])?;
    let root = Path::new("/srv/site/_site");

    let paths = vec![
        PathBuf::from("/srv/site/_site/index.html"),
        PathBuf::from("/srv/site/_site/css/site.css"),
        // Outside the watch root; must produce nothing.
        PathBuf::from("/srv/site/_config.yml"),
    ];

    let changes = changes_for_paths(root, &paths, &profile);
    assert_eq!(
        changes,
        vec![
            ChangeEvent {
                path: "index.html".to_string()
            },
            ChangeEvent {
                path: "css/site.css".to_string()
            },
        ]
    );
    Ok(())
}

#[test]
fn excluded_paths_yield_no_change_events() -> TestResult {
    let profile = profile(&["**/*"], &["**/*.tmp"])?;
    let root = Path::new("/srv/site/_site");

    assert!(profile.matches("index.html"));
    assert!(!profile.matches("drafts/skip.tmp"));
    assert!(!profile.matches("skip.tmp"));

    let paths = vec![PathBuf::from("/srv/site/_site/drafts/skip.tmp")];
    let changes = changes_for_paths(root, &paths, &profile);
    assert!(changes.is_empty());
    Ok(())
}

#[tokio::test]
async fn file_write_under_watch_root_triggers_a_reload() -> TestResult {
    let root = tempfile::tempdir()?;

    let profile = profile(&["**/*"], &[])?;
    let (changes_tx, changes_rx) = mpsc::channel::<ChangeEvent>(64);
    let _watcher = spawn_output_watcher(root.path(), profile, changes_tx)?;

    let hub = ReloadHub::new(32);
    let mut reloads = hub.subscribe();
    let _bridge = spawn_reload_bridge(changes_rx, hub.clone(), None);

    // Give the backend a moment to finish registering the watch.
    tokio::time::sleep(Duration::from_millis(250)).await;

    fs::write(root.path().join("index.html"), "<html></html>")?;

    // One write can surface as several notify events (create + data change),
    // so only the first reload is asserted.
    let msg = timeout(Duration::from_secs(5), reloads.recv()).await??;
    assert_eq!(msg.path, "index.html");
    Ok(())
}

#[tokio::test]
async fn excluded_file_write_triggers_no_change_event() -> TestResult {
    let root = tempfile::tempdir()?;

    let profile = profile(&["**/*"], &["**/*.tmp"])?;
    let (changes_tx, mut changes_rx) = mpsc::channel::<ChangeEvent>(64);
    let _watcher = spawn_output_watcher(root.path(), profile, changes_tx)?;

    tokio::time::sleep(Duration::from_millis(250)).await;

    fs::write(root.path().join("skip.tmp"), "scratch")?;

    assert!(
        timeout(Duration::from_millis(500), changes_rx.recv())
            .await
            .is_err()
    );
    Ok(())
}
