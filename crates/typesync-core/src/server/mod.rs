//! Service bootstrap
//!
//! Binds the network listener and serves the most recently generated
//! artifact.
//!
//! ## Port Retry
//!
//! If the preferred port is occupied, binding retries on the next port
//! (`+1`, `+2`, ...) with a warning per attempt. The loop is iterative and
//! unbounded by design choice; it terminates at the end of the port space,
//! which surfaces as a fatal bootstrap error. Any bind failure other than
//! address-in-use is fatal immediately.
//!
//! ## HTTP Surface
//!
//! Exactly one route: `GET /types` returns the artifact's current bytes,
//! or a 500 with a short diagnostic body if the file cannot be read (e.g.
//! no run has succeeded yet). The artifact is read per request so the
//! served content always reflects the last successful run.

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::{Error, Result};

/// Shared state for the types server
#[derive(Debug, Clone)]
struct AppState {
    /// Path of the generated artifact, relative to the working directory
    output_path: PathBuf,
}

/// Bind a listener on `preferred_port`, retrying upward on address-in-use
pub async fn bind_listener(preferred_port: u16) -> Result<TcpListener> {
    let mut port = preferred_port;

    loop {
        match TcpListener::bind(("0.0.0.0", port)).await {
            Ok(listener) => {
                if port != preferred_port {
                    info!(preferred_port, bound_port = port, "Bound to fallback port");
                }
                return Ok(listener);
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                let next = port.checked_add(1).ok_or_else(|| {
                    Error::bootstrap(format!(
                        "No free port found between {preferred_port} and {port}"
                    ))
                })?;
                warn!(port, "Port already in use, retrying on {next}");
                port = next;
            }
            Err(err) => {
                return Err(Error::bootstrap(format!(
                    "Failed to bind to port {port}: {err}"
                )));
            }
        }
    }
}

/// Build the router serving the artifact
pub fn router(output_path: PathBuf) -> Router {
    Router::new()
        .route("/types", get(serve_types))
        .with_state(AppState { output_path })
}

async fn serve_types(State(state): State<AppState>) -> Response {
    match tokio::fs::read(&state.output_path).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, "application/typescript; charset=utf-8")],
            bytes,
        )
            .into_response(),
        Err(err) => {
            error!(
                output_path = %state.output_path.display(),
                "Error sending types file: {err}"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error retrieving types file",
            )
                .into_response()
        }
    }
}

/// Handle to a running types server
///
/// The bound port may differ from the configured one after retry; read it
/// from [`ServerHandle::local_addr`].
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the listener is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Shut the server down gracefully, letting in-flight requests drain
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.task.await;
    }
}

/// Spawn the types server on a pre-bound listener
///
/// The listener is passed in pre-bound to keep port allocation and serving
/// free of races.
pub fn spawn(listener: TcpListener, output_path: PathBuf) -> Result<ServerHandle> {
    let local_addr = listener
        .local_addr()
        .map_err(|err| Error::bootstrap(format!("Failed to get listener address: {err}")))?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let app = router(output_path);

    let task = tokio::spawn(async move {
        let shutdown = async {
            let _ = shutdown_rx.await;
        };
        if let Err(err) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            error!("Types server error: {err}");
        }
    });

    Ok(ServerHandle {
        local_addr,
        shutdown_tx,
        task,
    })
}
