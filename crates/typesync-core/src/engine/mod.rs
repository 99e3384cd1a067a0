//! Core synchronization engine
//!
//! The SyncEngine wires the long-running pieces together:
//! - Serving the generated artifact over HTTP
//! - Listening to the configured trigger source
//! - Funnelling trigger events into the regeneration coordinator
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Trigger   │─── TriggerEvent ────┐
//! └─────────────┘                     │
//!                                     ▼
//!                            ┌──────────────┐
//!                            │  SyncEngine  │
//!                            └──────────────┘
//!                                     │
//!                 ┌───────────────────┼───────────────────┐
//!                 │                   │                   │
//!                 ▼                   ▼                   ▼
//!         ┌─────────────┐    ┌──────────────┐    ┌─────────────┐
//!         │ Coordinator │    │ Types server │    │   Events    │
//!         │ (pipeline)  │    │ (GET /types) │    │  (notify)   │
//!         └─────────────┘    └──────────────┘    └─────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! 1. Bind the listener (fatal on anything but port retry)
//! 2. Spawn the types server and run a startup regeneration
//! 3. Forward trigger events to the coordinator until shutdown
//! 4. On SIGINT/SIGTERM: stop the trigger, wait for an in-flight run,
//!    drain the server, exit cleanly

use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::config::{Config, TriggerMode};
use crate::coordinator::{Coordinator, CoordinatorEvent};
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::server::{self, ServerHandle};
use crate::traits::{SpecSource, Trigger, TypeGenerator};
use crate::trigger::{IntervalTrigger, WatchTrigger};
use tokio::sync::mpsc;

/// Core synchronization engine
///
/// ## Threading
///
/// The engine itself runs on a single async task; pipeline runs execute
/// on spawned tasks owned by the coordinator, and the types server runs
/// on its own task behind a [`ServerHandle`].
pub struct SyncEngine {
    /// Immutable configuration loaded at startup
    config: Config,

    /// Serializes pipeline runs and coalesces concurrent requests
    coordinator: Coordinator,

    /// Source of regeneration requests
    trigger: Box<dyn Trigger>,
}

impl SyncEngine {
    /// Create a new engine from a validated configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields run
    /// lifecycle events
    pub fn new(
        config: Config,
        source: Box<dyn SpecSource>,
        generator: Box<dyn TypeGenerator>,
    ) -> (Self, mpsc::Receiver<CoordinatorEvent>) {
        let pipeline = Pipeline::new(source, generator, config.output_path.clone().into());
        // The pipeline writes these on every run; the watcher must not
        // treat them as external changes or each run schedules the next.
        let self_owned = vec![
            pipeline.spec_path().to_path_buf(),
            pipeline.output_path().to_path_buf(),
        ];
        let (coordinator, event_rx) = Coordinator::new(pipeline);

        let trigger: Box<dyn Trigger> = match config.trigger_mode() {
            TriggerMode::Interval(period) => Box::new(IntervalTrigger::new(period)),
            TriggerMode::Watch(dir) => {
                Box::new(WatchTrigger::new(dir).with_ignored_paths(self_owned))
            }
        };

        let engine = Self {
            config,
            coordinator,
            trigger,
        };

        (engine, event_rx)
    }

    /// Run the engine
    ///
    /// Starts the types server, performs a startup regeneration, then
    /// forwards trigger events until a shutdown signal is received.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: Fatal bootstrap error
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Test-only helper to run the engine with a controlled shutdown signal
    ///
    /// Production code should use [`SyncEngine::run`], which reacts to OS
    /// signals (SIGINT/SIGTERM) instead of a programmatic channel.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    /// Internal run implementation that accepts an optional shutdown signal
    ///
    /// # Parameters
    ///
    /// - `shutdown_rx`: Optional oneshot receiver to trigger shutdown (for testing)
    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        // Bootstrap failures abort startup before any trigger fires
        let listener = server::bind_listener(self.config.port).await?;
        let server = server::spawn(listener, self.config.output_path.clone().into())?;

        info!(
            "Types server running at http://localhost:{} in {} mode",
            server.local_addr().port(),
            self.config.environment
        );

        // Startup regeneration; if a trigger fires while it is still in
        // flight, the coordinator coalesces the request.
        self.coordinator.request_regeneration("startup");

        let mut events = self.trigger.watch();
        debug!(trigger = self.trigger.name(), "Trigger source started");

        // Main event loop
        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for provided shutdown signal
            loop {
                tokio::select! {
                    Some(event) = events.next() => {
                        self.coordinator.request_regeneration(event.source);
                    }

                    _ = &mut rx => {
                        info!("Shutdown signal received");
                        break;
                    }
                }
            }
        } else {
            // Production mode: wait for SIGINT/SIGTERM
            loop {
                tokio::select! {
                    Some(event) = events.next() => {
                        self.coordinator.request_regeneration(event.source);
                    }

                    _ = shutdown_signal() => {
                        info!("Shutdown signal received");
                        break;
                    }
                }
            }
        }

        self.shutdown(events, server).await;
        Ok(())
    }

    /// Graceful shutdown sequence
    ///
    /// Order matters: the trigger stream is dropped first so no new runs
    /// start, then any in-flight run finishes, then the server drains.
    async fn shutdown(
        &self,
        events: std::pin::Pin<Box<dyn tokio_stream::Stream<Item = crate::TriggerEvent> + Send>>,
        server: ServerHandle,
    ) {
        drop(events);

        if self.coordinator.is_busy() {
            info!("Waiting for in-flight regeneration to finish");
        }
        self.coordinator.wait_idle().await;

        server.shutdown().await;
        info!("Server closed");
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("coordinator", &self.coordinator)
            .field("trigger", &self.trigger.name())
            .finish()
    }
}

/// Resolve when the process receives an interrupt or terminate signal
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
        (Ok(mut interrupt), Ok(mut terminate)) => {
            tokio::select! {
                _ = interrupt.recv() => {}
                _ = terminate.recv() => {}
            }
        }
        _ => {
            // Handler installation failed; Ctrl-C still covers SIGINT
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
