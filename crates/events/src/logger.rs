//! Event log service.
//!
//! [`EventLogger`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and writes every received [`LifecycleEvent`] to the
//! tracing log. It runs as a long-lived background task and shuts down
//! when the bus sender is dropped.

use tokio::sync::broadcast;

use crate::bus::LifecycleEvent;

/// Background service that logs lifecycle events.
pub struct EventLogger;

impl EventLogger {
    /// Run the logging loop.
    ///
    /// Exits when the channel is closed (i.e. the
    /// [`EventBus`](crate::bus::EventBus) is dropped) and returns how many
    /// events were logged.
    pub async fn run(mut receiver: broadcast::Receiver<LifecycleEvent>) -> u64 {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    Self::log(&event);
                    logged += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event logger lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(logged, "Event bus closed, event logger shutting down");
                    break;
                }
            }
        }
        logged
    }

    fn log(event: &LifecycleEvent) {
        match event.job_id {
            Some(job_id) => tracing::info!(
                event_type = %event.event_type,
                job_id = %job_id,
                payload = %event.payload,
                "Lifecycle event",
            ),
            None => tracing::info!(
                event_type = %event.event_type,
                payload = %event.payload,
                "Lifecycle event",
            ),
        }
    }
}
