//! Periodic trigger
//!
//! Fires immediately once at startup, then every configured interval
//! thereafter, indefinitely, until the stream is dropped. No jitter and no
//! skip-if-busy logic at this layer; coalescing is the coordinator's job.

use std::pin::Pin;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

use crate::traits::{Trigger, TriggerEvent};

/// Periodic regeneration trigger
#[derive(Debug, Clone, Copy)]
pub struct IntervalTrigger {
    period: Duration,
}

impl IntervalTrigger {
    /// Create a trigger firing every `period`
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl Trigger for IntervalTrigger {
    fn watch(&self) -> Pin<Box<dyn Stream<Item = TriggerEvent> + Send + 'static>> {
        let period = self.period;
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            debug!(?period, "Starting periodic trigger");
            // The first tick completes immediately
            let mut ticker = tokio::time::interval(period);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if tx.send(TriggerEvent::now("interval")).is_err() {
                            break;
                        }
                    }
                    _ = tx.closed() => break,
                }
            }

            debug!("Periodic trigger stopped");
        });

        Box::pin(UnboundedReceiverStream::new(rx))
    }

    fn name(&self) -> &'static str {
        "interval"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn fires_immediately_then_periodically() {
        let trigger = IntervalTrigger::new(Duration::from_millis(100));
        let mut events = trigger.watch();

        // First event arrives well before one full period has elapsed
        let first = tokio::time::timeout(Duration::from_millis(50), events.next())
            .await
            .expect("first tick should be immediate");
        assert!(first.is_some());

        let second = tokio::time::timeout(Duration::from_millis(300), events.next())
            .await
            .expect("second tick should arrive within one period");
        assert!(second.is_some());
    }

    #[tokio::test]
    async fn dropping_the_stream_stops_the_trigger() {
        let trigger = IntervalTrigger::new(Duration::from_millis(10));
        let events = trigger.watch();
        drop(events);

        // Nothing to assert beyond "does not panic"; the spawned task
        // observes the closed channel and exits.
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
