//! Bounded hand-off queue and worker pool for generation jobs.
//!
//! [`JobQueue::enqueue`] never waits: a full queue is reported to the caller
//! immediately. Each worker pulls one [`GenerationTask`] at a time and runs
//! it in its own Tokio task, so a panic inside the job is caught as a
//! `JoinError` instead of taking the worker down. Every task races its
//! deadline and its cancellation token; whichever fires first ends the job.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use augur_core::types::{JobId, Timestamp};
use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::LifecycleController;
use crate::PipelineError;

/// Default number of concurrent workers.
const DEFAULT_WORKERS: usize = 4;

/// Default number of tasks that may wait for a worker.
const DEFAULT_CAPACITY: usize = 64;

/// Default per-job deadline. Kept below the record max age so a job times
/// out before the reaper would evict it.
const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(55);

/// Errors returned by [`JobQueue::enqueue`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueueError {
    #[error("Generation queue is full, job {0} rejected")]
    Full(JobId),

    #[error("Generation queue is closed, job {0} rejected")]
    Closed(JobId),
}

#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub workers: usize,
    pub capacity: usize,
    pub job_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            capacity: DEFAULT_CAPACITY,
            job_timeout: DEFAULT_JOB_TIMEOUT,
        }
    }
}

/// One unit of queued work.
#[derive(Debug, Clone)]
pub struct GenerationTask {
    pub job_id: JobId,
    pub enqueued_at: Timestamp,
    pub timeout: Duration,
    /// Cancelled on shutdown or when the record is evicted.
    pub cancel: CancellationToken,
}

pub struct JobQueue {
    sender: mpsc::Sender<GenerationTask>,
    in_flight: Mutex<HashMap<JobId, CancellationToken>>,
    shutdown: CancellationToken,
    config: QueueConfig,
}

impl JobQueue {
    /// Create the queue and spawn its workers.
    ///
    /// Workers stop when `shutdown` is cancelled; in-flight tasks are
    /// cancelled with it and recorded as failed.
    pub fn start(
        controller: Arc<LifecycleController>,
        config: QueueConfig,
        shutdown: CancellationToken,
    ) -> (Arc<Self>, Vec<JoinHandle<()>>) {
        let (sender, receiver) = mpsc::channel(config.capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let workers = config.workers.max(1);

        let queue = Arc::new(Self {
            sender,
            in_flight: Mutex::new(HashMap::new()),
            shutdown,
            config,
        });

        tracing::info!(
            workers,
            capacity = queue.config.capacity,
            job_timeout_secs = queue.config.job_timeout.as_secs(),
            "Generation queue started",
        );

        let handles = (0..workers)
            .map(|worker| {
                let queue = Arc::clone(&queue);
                let controller = Arc::clone(&controller);
                let receiver = Arc::clone(&receiver);
                tokio::spawn(async move { queue.worker_loop(worker, controller, receiver).await })
            })
            .collect();

        (queue, handles)
    }

    /// Hand `job_id` to the worker pool without waiting for it to run.
    pub async fn enqueue(&self, job_id: JobId) -> Result<(), QueueError> {
        let task = GenerationTask {
            job_id,
            enqueued_at: Utc::now(),
            timeout: self.config.job_timeout,
            cancel: self.shutdown.child_token(),
        };

        // Registered before sending so a fast worker always finds it.
        self.in_flight
            .lock()
            .await
            .insert(job_id, task.cancel.clone());

        let result = self.sender.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full(job_id),
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed(job_id),
        });

        if result.is_err() {
            self.in_flight.lock().await.remove(&job_id);
        }
        result
    }

    /// Cancel the queued or running task for `job_id`.
    ///
    /// Returns `false` if no such task is known.
    pub async fn cancel(&self, job_id: JobId) -> bool {
        match self.in_flight.lock().await.remove(&job_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of tasks queued or running.
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    async fn worker_loop(
        &self,
        worker: usize,
        controller: Arc<LifecycleController>,
        receiver: Arc<Mutex<mpsc::Receiver<GenerationTask>>>,
    ) {
        tracing::debug!(worker, "Generation worker started");

        loop {
            let next = {
                let mut receiver = receiver.lock().await;
                tokio::select! {
                    _ = self.shutdown.cancelled() => None,
                    task = receiver.recv() => task,
                }
            };

            let Some(task) = next else {
                break;
            };

            let waited_ms = (Utc::now() - task.enqueued_at).num_milliseconds();
            tracing::debug!(worker, job_id = %task.job_id, waited_ms, "Generation task picked up");

            self.run_task(&controller, task).await;
        }

        tracing::debug!(worker, "Generation worker stopped");
    }

    async fn run_task(&self, controller: &Arc<LifecycleController>, task: GenerationTask) {
        let job_id = task.job_id;

        let handle = tokio::spawn({
            let controller = Arc::clone(controller);
            async move { controller.execute(job_id).await }
        });
        let abort = handle.abort_handle();

        let outcome = tokio::select! {
            _ = task.cancel.cancelled() => {
                abort.abort();
                Err(PipelineError::Cancelled)
            }
            joined = tokio::time::timeout(task.timeout, handle) => match joined {
                Err(_) => {
                    abort.abort();
                    Err(PipelineError::TimedOut(task.timeout))
                }
                Ok(Err(join_err)) => Err(PipelineError::Panicked(join_err.to_string())),
                Ok(Ok(result)) => result.map(|_| ()),
            },
        };

        self.in_flight.lock().await.remove(&job_id);

        match outcome {
            Ok(()) | Err(PipelineError::Discarded(_)) => {}
            Err(e) => controller.fail(job_id, &e).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_below_default_max_age() {
        assert!(QueueConfig::default().job_timeout < crate::reaper::ReaperConfig::default().max_age);
    }
}
