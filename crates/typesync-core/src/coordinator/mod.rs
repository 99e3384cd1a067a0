//! Regeneration coordinator
//!
//! Ensures at most one pipeline run is in flight at a time and that
//! concurrently requested runs coalesce rather than stack.
//!
//! ## Coalescing Policy
//!
//! A request arriving while a run is active is **dropped** (a no-op), not
//! queued. Triggers are allowed to be lossy: a later timer tick or file
//! event will re-trigger, and an explicit `generate` invocation bypasses
//! the coordinator entirely. There is no retry count and no backoff; a
//! failed run simply waits for the next trigger.
//!
//! ## Events
//!
//! The coordinator emits [`CoordinatorEvent`]s over a bounded channel so
//! the engine and tests can observe run lifecycle. When the channel is
//! full, events are dropped with a warning; they are observability, not
//! control flow.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Notify, mpsc};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::pipeline::Pipeline;

/// Capacity of the coordinator event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events emitted by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// A pipeline run was started
    RunStarted {
        /// Trigger that requested the run
        trigger: &'static str,
    },

    /// A pipeline run completed successfully
    RunSucceeded {
        /// Trigger that requested the run
        trigger: &'static str,
    },

    /// A pipeline run failed; the previous artifact is still served
    RunFailed {
        /// Trigger that requested the run
        trigger: &'static str,
        /// Rendered error
        error: String,
    },

    /// A request arrived while a run was active and was dropped
    RunCoalesced {
        /// Trigger whose request was dropped
        trigger: &'static str,
    },
}

/// Regeneration coordinator
///
/// The busy flag is the sole mutual-exclusion primitive in the system:
/// `request_regeneration` claims it with a compare-exchange, and the
/// spawned run clears it on completion, so concurrent pipeline entry count
/// never exceeds one.
pub struct Coordinator {
    /// The unit of work this coordinator serializes
    pipeline: Arc<Pipeline>,

    /// Whether a run is currently in flight
    busy: Arc<AtomicBool>,

    /// Notified whenever a run completes
    idle: Arc<Notify>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<CoordinatorEvent>,
}

impl Coordinator {
    /// Create a new coordinator
    ///
    /// # Returns
    ///
    /// A tuple of (coordinator, event_receiver) where event_receiver
    /// yields run lifecycle events
    pub fn new(pipeline: Pipeline) -> (Self, mpsc::Receiver<CoordinatorEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let coordinator = Self {
            pipeline: Arc::new(pipeline),
            busy: Arc::new(AtomicBool::new(false)),
            idle: Arc::new(Notify::new()),
            event_tx: tx,
        };

        (coordinator, rx)
    }

    /// Request a regeneration (fire-and-forget)
    ///
    /// Starts a pipeline run asynchronously if none is active. A request
    /// arriving while a run is active is dropped.
    ///
    /// # Returns
    ///
    /// `true` if a run was started, `false` if the request was dropped
    pub fn request_regeneration(&self, trigger: &'static str) -> bool {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(trigger, "Regeneration already in flight, dropping request");
            emit_event(&self.event_tx, CoordinatorEvent::RunCoalesced { trigger });
            return false;
        }

        info!(trigger, "Starting regeneration run");
        emit_event(&self.event_tx, CoordinatorEvent::RunStarted { trigger });

        let pipeline = Arc::clone(&self.pipeline);
        let event_tx = self.event_tx.clone();
        let guard = BusyGuard {
            busy: Arc::clone(&self.busy),
            idle: Arc::clone(&self.idle),
        };

        tokio::spawn(async move {
            // Held for the whole run so the flag clears even if a
            // collaborator panics and the task unwinds.
            let _guard = guard;

            match pipeline.run().await {
                Ok(()) => {
                    info!(trigger, "Types updated successfully");
                    emit_event(&event_tx, CoordinatorEvent::RunSucceeded { trigger });
                }
                Err(err) => {
                    error!(trigger, "Error updating types: {err}");
                    emit_event(
                        &event_tx,
                        CoordinatorEvent::RunFailed {
                            trigger,
                            error: err.to_string(),
                        },
                    );
                }
            }
        });

        true
    }

    /// Run the pipeline once, synchronously from the caller's perspective
    ///
    /// Used by the one-shot `generate` mode, which bypasses the triggers
    /// and reports the outcome via the process exit status.
    pub async fn run_once(&self) -> Result<()> {
        self.pipeline.run().await
    }

    /// Whether a run is currently in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Wait until no run is in flight
    ///
    /// Used during shutdown: an in-progress run is never cancelled, the
    /// engine waits for it to finish naturally.
    pub async fn wait_idle(&self) {
        loop {
            // Register interest before checking the flag to avoid missing
            // the completion notification.
            let notified = self.idle.notified();
            if !self.is_busy() {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("pipeline", &self.pipeline)
            .field("busy", &self.is_busy())
            .finish()
    }
}

/// Clears the busy flag and wakes idle waiters when the run ends
///
/// Runs on drop, so an unwinding run task cannot wedge the coordinator.
struct BusyGuard {
    busy: Arc<AtomicBool>,
    idle: Arc<Notify>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        self.idle.notify_waiters();
    }
}

/// Emit a coordinator event, dropping it with a warning if the channel is full
fn emit_event(tx: &mpsc::Sender<CoordinatorEvent>, event: CoordinatorEvent) {
    if let Err(err) = tx.try_send(event) {
        match err {
            mpsc::error::TrySendError::Full(_) => {
                warn!("Coordinator event channel full, dropping event");
            }
            mpsc::error::TrySendError::Closed(_) => {
                // Receiver dropped; events are observability only
                debug!("Coordinator event receiver dropped, discarding event");
            }
        }
    }
}
