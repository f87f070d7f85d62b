use std::error::Error;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use siteloop::serve::{spawn_reload_bridge, ReloadHub};
use siteloop::watch::ChangeEvent;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn one_broadcast_per_change_event_without_debounce() -> TestResult {
    let hub = ReloadHub::new(8);
    let mut reloads = hub.subscribe();
    assert_eq!(hub.client_count(), 1);

    let (changes_tx, changes_rx) = mpsc::channel::<ChangeEvent>(8);
    let _bridge = spawn_reload_bridge(changes_rx, hub.clone(), None);

    for path in ["index.html", "about.html", "css/site.css"] {
        changes_tx
            .send(ChangeEvent {
                path: path.to_string(),
            })
            .await?;
    }

    for expected in ["index.html", "about.html", "css/site.css"] {
        let msg = timeout(Duration::from_secs(1), reloads.recv()).await??;
        assert_eq!(msg.path, expected);
    }

    // No further broadcasts without further change events.
    assert!(
        timeout(Duration::from_millis(100), reloads.recv())
            .await
            .is_err()
    );
    Ok(())
}

#[tokio::test]
async fn debounce_coalesces_a_burst_into_one_broadcast() -> TestResult {
    let hub = ReloadHub::new(8);
    let mut reloads = hub.subscribe();

    let (changes_tx, changes_rx) = mpsc::channel::<ChangeEvent>(8);
    let _bridge = spawn_reload_bridge(changes_rx, hub.clone(), Some(Duration::from_millis(50)));

    // A generator rebuild touches many output files at once.
    for path in ["a.html", "b.html", "c.html"] {
        changes_tx
            .send(ChangeEvent {
                path: path.to_string(),
            })
            .await?;
    }

    let msg = timeout(Duration::from_secs(1), reloads.recv()).await??;
    assert_eq!(msg.path, "c.html");

    assert!(
        timeout(Duration::from_millis(100), reloads.recv())
            .await
            .is_err()
    );

    // A later change after the quiet window triggers its own reload.
    changes_tx
        .send(ChangeEvent {
            path: "d.html".to_string(),
        })
        .await?;
    let msg = timeout(Duration::from_secs(1), reloads.recv()).await??;
    assert_eq!(msg.path, "d.html");
    Ok(())
}

#[tokio::test]
async fn broadcast_without_clients_is_not_an_error() -> TestResult {
    let hub = ReloadHub::new(8);
    assert_eq!(hub.client_count(), 0);

    let (changes_tx, changes_rx) = mpsc::channel::<ChangeEvent>(8);
    let bridge = spawn_reload_bridge(changes_rx, hub.clone(), None);

    changes_tx
        .send(ChangeEvent {
            path: "index.html".to_string(),
        })
        .await?;
    drop(changes_tx);

    // The bridge drains the stream and exits cleanly.
    timeout(Duration::from_secs(1), bridge).await??;
    Ok(())
}
