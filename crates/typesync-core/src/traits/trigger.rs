// # Trigger Trait
//
// Defines the interface for stimuli that request a regeneration.
//
// ## Implementations
//
// - Periodic timer: `trigger::IntervalTrigger`
// - Recursive file watcher: `trigger::WatchTrigger`
//
// Exactly one trigger is active per run of the long-lived service; the
// configuration decides which (see `Config::trigger_mode`).

use std::pin::Pin;
use std::time::Instant;
use tokio_stream::Stream;

/// A regeneration request emitted by a trigger source
///
/// The request carries no payload beyond its origin and a timestamp for
/// logging; "regenerate now" is implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    /// Name of the trigger that fired
    pub source: &'static str,
    /// When the underlying stimulus occurred
    pub at: Instant,
}

impl TriggerEvent {
    /// Create an event stamped with the current instant
    pub fn now(source: &'static str) -> Self {
        Self {
            source,
            at: Instant::now(),
        }
    }
}

/// Trait for trigger source implementations
///
/// # Behavior
///
/// - Events are yielded in the order their underlying stimuli occur
/// - Triggers are allowed to be lossy: the coordinator drops requests that
///   arrive while a run is active, and a later event re-triggers
/// - Must be cancellation-safe: dropping the stream stops the source and
///   releases its resources (this is the "stop" operation)
pub trait Trigger: Send + Sync {
    /// Start the trigger and return its event stream
    ///
    /// The stream runs until dropped and should never terminate on its own
    /// under normal conditions.
    fn watch(&self) -> Pin<Box<dyn Stream<Item = TriggerEvent> + Send + 'static>>;

    /// Get the trigger name (for logging/debugging)
    fn name(&self) -> &'static str;
}
