//! Periodic eviction of stale job records.
//!
//! Every `interval` the reaper removes records whose `created_at` is older
//! than `max_age`, whatever their status. Evicting a pending job also
//! cancels its queued or running task; if that task still finishes, the
//! controller sees the record gone and discards the result.

use std::sync::Arc;
use std::time::Duration;

use augur_core::job_events::EVENT_JOB_EVICTED;
use augur_core::types::{JobId, Timestamp};
use augur_events::{EventBus, LifecycleEvent};
use augur_store::JobStore;
use tokio_util::sync::CancellationToken;

use crate::queue::JobQueue;
use crate::PipelineError;

/// Default maximum record age: 60 seconds.
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60);

/// How often the sweep runs by default.
const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ReaperConfig {
    pub max_age: Duration,
    pub interval: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            interval: DEFAULT_INTERVAL,
        }
    }
}

pub struct Reaper {
    store: Arc<dyn JobStore>,
    events: Arc<EventBus>,
    queue: Option<Arc<JobQueue>>,
    config: ReaperConfig,
}

impl Reaper {
    pub fn new(store: Arc<dyn JobStore>, events: Arc<EventBus>, config: ReaperConfig) -> Self {
        Self {
            store,
            events,
            queue: None,
            config,
        }
    }

    /// Cancel queued tasks of evicted jobs through `queue`.
    pub fn with_queue(mut self, queue: Arc<JobQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Evict every record older than the max age at `now`.
    pub async fn sweep(&self, now: Timestamp) -> Result<Vec<JobId>, PipelineError> {
        let max_age = chrono::Duration::from_std(self.config.max_age)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_MAX_AGE.as_secs() as i64));
        let evicted = self.store.evict_older_than(now - max_age).await?;

        for &id in &evicted {
            let cancelled = match &self.queue {
                Some(queue) => queue.cancel(id).await,
                None => false,
            };
            self.events.publish(
                LifecycleEvent::new(EVENT_JOB_EVICTED)
                    .for_job(id)
                    .with_payload(serde_json::json!({ "task_cancelled": cancelled })),
            );
        }

        Ok(evicted)
    }

    /// Run the sweep loop until `cancel` is triggered.
    ///
    /// A zero interval falls back to the default period.
    pub async fn run(&self, cancel: CancellationToken) {
        let period = if self.config.interval.is_zero() {
            tracing::warn!(
                fallback_secs = DEFAULT_INTERVAL.as_secs(),
                "Job reaper: zero interval configured, using default",
            );
            DEFAULT_INTERVAL
        } else {
            self.config.interval
        };

        tracing::info!(
            max_age_secs = self.config.max_age.as_secs(),
            interval_secs = period.as_secs(),
            "Job reaper started",
        );

        let mut interval = tokio::time::interval(period);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job reaper stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.sweep(chrono::Utc::now()).await {
                        Ok(evicted) if !evicted.is_empty() => {
                            tracing::info!(evicted = evicted.len(), "Job reaper: evicted stale records");
                        }
                        Ok(_) => {
                            tracing::debug!("Job reaper: nothing to evict");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Job reaper: sweep failed");
                        }
                    }
                }
            }
        }
    }
}
