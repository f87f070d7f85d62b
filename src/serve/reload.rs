// src/serve/reload.rs

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::debug;

use crate::watch::ChangeEvent;

/// A reload instruction for connected browser clients.
#[derive(Debug, Clone)]
pub struct ReloadMessage {
    /// The changed path that triggered this reload (informational).
    pub path: String,
}

/// Fan-out point for reload messages.
///
/// Every connected WebSocket client holds a subscription; one broadcast
/// reaches all of them.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.tx.subscribe()
    }

    /// Number of currently subscribed clients.
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Broadcast a reload to all subscribed clients.
    ///
    /// A broadcast with no connected clients is not an error; the message is
    /// simply dropped.
    pub fn broadcast(&self, msg: ReloadMessage) {
        match self.tx.send(msg) {
            Ok(receivers) => {
                debug!(clients = receivers, "reload broadcast sent");
            }
            Err(_) => {
                debug!("reload broadcast with no connected clients; dropped");
            }
        }
    }
}

/// Consume the change-event stream and issue reload broadcasts.
///
/// With `debounce = None`, every change event produces exactly one
/// broadcast. With `Some(window)`, a burst of events is coalesced: after the
/// first event, further events keep extending the quiet window, and a single
/// broadcast (carrying the last changed path) is issued once the window
/// elapses.
pub async fn run_reload_bridge(
    mut changes_rx: mpsc::Receiver<ChangeEvent>,
    hub: ReloadHub,
    debounce: Option<Duration>,
) {
    match debounce {
        None => {
            while let Some(change) = changes_rx.recv().await {
                debug!(path = %change.path, "change event -> reload");
                hub.broadcast(ReloadMessage { path: change.path });
            }
        }
        Some(window) => {
            while let Some(change) = changes_rx.recv().await {
                let mut last = change;
                loop {
                    match timeout(window, changes_rx.recv()).await {
                        Ok(Some(next)) => last = next,
                        // Quiet window elapsed, or the producer is gone; in
                        // both cases flush what we have.
                        Ok(None) | Err(_) => break,
                    }
                }
                debug!(path = %last.path, "coalesced change burst -> reload");
                hub.broadcast(ReloadMessage { path: last.path });
            }
        }
    }

    debug!("reload bridge loop ended");
}

/// Spawn [`run_reload_bridge`] as a background task.
pub fn spawn_reload_bridge(
    changes_rx: mpsc::Receiver<ChangeEvent>,
    hub: ReloadHub,
    debounce: Option<Duration>,
) -> JoinHandle<()> {
    tokio::spawn(run_reload_bridge(changes_rx, hub, debounce))
}
