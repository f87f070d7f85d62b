// src/serve/server.rs

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::model::ConfigFile;
use crate::engine::{RunnerEvent, TaskName, TaskOutcome};
use crate::serve::reload::{spawn_reload_bridge, ReloadHub, ReloadMessage};
use crate::watch::{spawn_output_watcher, WatchProfile};

/// Client script served at `/__livereload.js`.
///
/// Pages that include it reconnect to the WebSocket endpoint and reload on
/// every message.
const LIVERELOAD_JS: &str = r#"(() => {
  const proto = location.protocol === "https:" ? "wss" : "ws";
  const sock = new WebSocket(`${proto}://${location.host}/__livereload`);
  sock.onmessage = () => location.reload();
})();
"#;

/// Dev server configuration for the `serve` task.
///
/// The document root is always the build task's output directory; the two
/// sides of the loop only meet on disk.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    /// Document root; equals `[build].output_dir`.
    pub root: PathBuf,
    /// Reload-trigger globs, relative to `root`.
    pub watch: Vec<String>,
    pub exclude: Vec<String>,
    pub debounce_ms: u64,
}

impl ServeConfig {
    /// Build the serve config from the whole config file.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            host: cfg.serve.host.clone(),
            port: cfg.serve.port,
            root: cfg.build.output_dir.clone(),
            watch: cfg.serve.watch.clone(),
            exclude: cfg.serve.exclude.clone(),
            debounce_ms: cfg.serve.debounce_ms,
        }
    }

    /// The socket address to bind to.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .with_context(|| format!("invalid dev server bind address '{addr}'"))
    }

    /// The coalescing window, or `None` for one reload per change event.
    pub fn debounce(&self) -> Option<Duration> {
        match self.debounce_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

/// Check that the document root exists before starting the server.
///
/// Starting `serve` before any build has completed must fail clearly rather
/// than serve 404s against a missing directory or hang.
pub fn ensure_document_root(root: &Path) -> Result<()> {
    if !root.is_dir() {
        bail!(
            "output directory {:?} does not exist; run the `build` task first (or create it) before `serve`",
            root
        );
    }
    Ok(())
}

/// Build the dev server router: the live-reload endpoints plus static file
/// serving for everything else.
pub fn build_router(root: &Path, hub: ReloadHub) -> Router {
    Router::new()
        .route("/__livereload", get(livereload_ws))
        .route("/__livereload.js", get(livereload_script))
        .fallback_service(ServeDir::new(root))
        .layer(TraceLayer::new_for_http())
        .with_state(hub)
}

/// Start the dev server for a task and monitor it in the background.
///
/// This wires together, in order:
/// - the document-root preflight check
/// - the output-directory watcher
/// - the change-event -> reload bridge
/// - the HTTP listener
///
/// Setup failures (missing root, bad watch registration, occupied port) are
/// returned directly so startup fails fast. Once running, a server exit is
/// reported to the runner as a `TaskExited` event.
pub async fn spawn_server(
    task: TaskName,
    config: ServeConfig,
    runtime_tx: mpsc::Sender<RunnerEvent>,
) -> Result<()> {
    ensure_document_root(&config.root)?;

    let profile = WatchProfile::from_patterns(&config.watch, &config.exclude)?;
    let (changes_tx, changes_rx) = mpsc::channel(64);
    let watcher = spawn_output_watcher(&config.root, profile, changes_tx)?;

    let hub = ReloadHub::new(32);
    let bridge = spawn_reload_bridge(changes_rx, hub.clone(), config.debounce());

    let router = build_router(&config.root, hub);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await.with_context(|| {
        format!("binding dev server to {addr} (is the port already in use?)")
    })?;

    info!(
        task = %task,
        root = ?config.root,
        "dev server listening on http://{}",
        listener.local_addr()?
    );

    tokio::spawn(async move {
        // The watcher stops when its handle drops; keep it (and the bridge)
        // alive for the server's lifetime.
        let _watcher = watcher;
        let _bridge = bridge;

        let outcome = match axum::serve(listener, router).await {
            Ok(()) => TaskOutcome::Success,
            Err(err) => {
                error!(task = %task, error = %err, "dev server error");
                TaskOutcome::Failed(-1)
            }
        };

        let _ = runtime_tx
            .send(RunnerEvent::TaskExited { task, outcome })
            .await;
    });

    Ok(())
}

/// Upgrade handler for `/__livereload`.
async fn livereload_ws(
    ws: WebSocketUpgrade,
    State(hub): State<ReloadHub>,
) -> impl IntoResponse {
    let reloads = hub.subscribe();
    debug!(
        clients = hub.client_count(),
        "live-reload client connected"
    );
    ws.on_upgrade(move |socket| client_session(socket, reloads))
}

/// Forward reload broadcasts to one connected client until it disconnects.
async fn client_session(
    mut socket: WebSocket,
    mut reloads: broadcast::Receiver<ReloadMessage>,
) {
    loop {
        match reloads.recv().await {
            Ok(msg) => {
                debug!(path = %msg.path, "sending reload to client");
                if socket.send(Message::Text("reload".into())).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // The client missed some broadcasts; one reload catches it up.
                warn!(skipped, "live-reload client lagged; sending catch-up reload");
                if socket.send(Message::Text("reload".into())).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    debug!("live-reload client disconnected");
}

/// Serve the client script at `/__livereload.js`.
async fn livereload_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        LIVERELOAD_JS,
    )
}
