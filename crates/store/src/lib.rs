//! Job storage for the generation pipeline.
//!
//! [`JobStore`] is the injectable interface the lifecycle controller, poll
//! resolver and reaper talk to. Every method is a single atomic operation
//! with respect to every other method, so a poll that selects and removes a
//! completed job can never race the reaper into a double delete or a
//! resurrected record. [`InMemoryJobStore`] is the process-local default;
//! a durable backend only has to honour the same contract.
//!
//! [`ActiveItem`] is the separate single-value cell holding the prediction
//! currently on display.

pub mod active;
pub mod memory;

use async_trait::async_trait;
use augur_core::job::{JobRecord, JobStatus};
use augur_core::prediction::Prediction;
use augur_core::types::{JobId, Timestamp};

pub use active::ActiveItem;
pub use memory::InMemoryJobStore;

/// Errors from a [`JobStore`] operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this id (never created, promoted, or evicted).
    #[error("Job {0} not found")]
    NotFound(JobId),

    /// A record with this id already exists.
    #[error("Job {0} already exists")]
    AlreadyExists(JobId),

    /// The requested status change is not allowed.
    #[error("Job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },

    /// The backing storage failed.
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Count of records per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub complete: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.complete + self.failed
    }
}

/// Keyed table of job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Write a new `Pending` record holding `placeholder`.
    async fn insert_pending(
        &self,
        id: JobId,
        placeholder: Prediction,
        created_at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Read a copy of one record.
    async fn get(&self, id: JobId) -> Result<Option<JobRecord>, StoreError>;

    /// Move a pending record to a terminal status.
    ///
    /// `payload` replaces the placeholder when given; `None` keeps it.
    /// Fails with [`StoreError::NotFound`] if the record is gone and with
    /// [`StoreError::InvalidTransition`] if it is already terminal. A
    /// missing record is never re-created.
    async fn transition(
        &self,
        id: JobId,
        to: JobStatus,
        payload: Option<Prediction>,
    ) -> Result<JobRecord, StoreError>;

    /// Remove and return the `Complete` record that finished first.
    async fn take_next_complete(&self) -> Result<Option<JobRecord>, StoreError>;

    /// Number of records per status.
    async fn counts(&self) -> Result<StatusCounts, StoreError>;

    /// Remove every record created strictly before `cutoff`, whatever its
    /// status, returning the removed ids.
    async fn evict_older_than(&self, cutoff: Timestamp) -> Result<Vec<JobId>, StoreError>;

    /// Copies of every record, oldest id first.
    async fn snapshot(&self) -> Result<Vec<JobRecord>, StoreError>;
}
