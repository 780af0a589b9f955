//! Process-local [`JobStore`] backed by a `HashMap` under one mutex.

use std::collections::HashMap;

use async_trait::async_trait;
use augur_core::job::{JobRecord, JobStatus};
use augur_core::prediction::Prediction;
use augur_core::types::{JobId, Timestamp};
use tokio::sync::Mutex;

use crate::{JobStore, StatusCounts, StoreError};

#[derive(Default)]
struct Inner {
    records: HashMap<JobId, JobRecord>,
    /// Next value handed out as `finished_seq`.
    next_seq: u64,
}

/// Volatile job store. Contents are lost when the process exits.
///
/// Every operation holds the same lock for its whole duration.
#[derive(Default)]
pub struct InMemoryJobStore {
    inner: Mutex<Inner>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert_pending(
        &self,
        id: JobId,
        placeholder: Prediction,
        created_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.records.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        inner
            .records
            .insert(id, JobRecord::pending(id, placeholder, created_at));
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<JobRecord>, StoreError> {
        Ok(self.inner.lock().await.records.get(&id).cloned())
    }

    async fn transition(
        &self,
        id: JobId,
        to: JobStatus,
        payload: Option<Prediction>,
    ) -> Result<JobRecord, StoreError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        let record = inner.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if !record.status.can_transition_to(to) {
            return Err(StoreError::InvalidTransition {
                id,
                from: record.status,
                to,
            });
        }

        record.status = to;
        if let Some(payload) = payload {
            record.payload = payload;
        }
        record.finished_seq = Some(inner.next_seq);
        inner.next_seq += 1;

        Ok(record.clone())
    }

    async fn take_next_complete(&self) -> Result<Option<JobRecord>, StoreError> {
        let mut inner = self.inner.lock().await;
        let next = inner
            .records
            .values()
            .filter(|r| r.status == JobStatus::Complete)
            .min_by_key(|r| r.finished_seq)
            .map(|r| r.id);

        let taken = next.and_then(|id| inner.records.remove(&id));
        if let Some(record) = &taken {
            tracing::debug!(
                job_id = %record.id,
                finished_seq = ?record.finished_seq,
                remaining = inner.records.len(),
                "Took completed job",
            );
        }
        Ok(taken)
    }

    async fn counts(&self) -> Result<StatusCounts, StoreError> {
        let inner = self.inner.lock().await;
        let mut counts = StatusCounts::default();
        for record in inner.records.values() {
            match record.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::Complete => counts.complete += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        Ok(counts)
    }

    async fn evict_older_than(&self, cutoff: Timestamp) -> Result<Vec<JobId>, StoreError> {
        let mut inner = self.inner.lock().await;
        let stale: Vec<JobId> = inner
            .records
            .values()
            .filter(|r| r.created_at < cutoff)
            .map(|r| r.id)
            .collect();

        for id in &stale {
            inner.records.remove(id);
        }
        if !stale.is_empty() {
            tracing::debug!(
                evicted = stale.len(),
                remaining = inner.records.len(),
                %cutoff,
                "Evicted stale jobs",
            );
        }
        Ok(stale)
    }

    async fn snapshot(&self) -> Result<Vec<JobRecord>, StoreError> {
        let inner = self.inner.lock().await;
        let mut records: Vec<JobRecord> = inner.records.values().cloned().collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
