//! Asynchronous job lifecycle for prediction generation.
//!
//! - [`lifecycle`]: writes the pending record and drives one job through
//!   text, image, symbol, registration and completion.
//! - [`queue`]: fire-and-forget hand-off: bounded queue plus worker pool,
//!   with a timeout and cancellation token on every task.
//! - [`poll`]: decides what a polling client sees and promotes finished
//!   jobs to the active item.
//! - [`reaper`]: periodic eviction of stale records.
//! - [`service`]: the surface the request layer calls.

pub mod lifecycle;
pub mod poll;
pub mod queue;
pub mod reaper;
pub mod service;

use std::time::Duration;

use augur_core::types::JobId;
use augur_store::StoreError;

pub use lifecycle::{Backends, LifecycleController, LifecycleSettings};
pub use poll::{PollOutcome, PollResolver};
pub use queue::{GenerationTask, JobQueue, QueueConfig, QueueError};
pub use reaper::{Reaper, ReaperConfig};
pub use service::{GenerationService, PipelineConfig, ServiceError, StartedService};

/// Errors that end a job as `failed` or reach the request layer.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Job timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("Job was cancelled")]
    Cancelled,

    #[error("Job task panicked: {0}")]
    Panicked(String),

    /// The record was evicted while the job ran; its result was dropped.
    #[error("Job {0} was evicted before it finished")]
    Discarded(JobId),
}
