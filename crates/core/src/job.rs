//! Job records and the job status machine.
//!
//! Status only ever moves forward: `Pending -> Complete` or
//! `Pending -> Failed`. Terminal records are never rewritten.

use serde::{Deserialize, Serialize};

use crate::prediction::Prediction;
use crate::types::{JobId, Timestamp};

/// Lifecycle status of a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Complete,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether `self -> next` is an allowed transition.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Complete) | (Self::Pending, Self::Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub status: JobStatus,
    /// Placeholder snapshot while pending or failed; the produced payload
    /// once complete.
    pub payload: Prediction,
    /// Set once at creation. Only the reaper reads it.
    pub created_at: Timestamp,
    /// Store-assigned order in which records reached a terminal status.
    pub finished_seq: Option<u64>,
}

impl JobRecord {
    pub fn pending(id: JobId, placeholder: Prediction, created_at: Timestamp) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            payload: placeholder,
            created_at,
            finished_seq: None,
        }
    }

    /// Age of the record at `now`.
    pub fn age(&self, now: Timestamp) -> chrono::Duration {
        now - self.created_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    const ALL: [JobStatus; 3] = [JobStatus::Pending, JobStatus::Complete, JobStatus::Failed];

    #[test]
    fn only_pending_moves_forward() {
        for from in ALL {
            for to in ALL {
                let expected = from == JobStatus::Pending && to != JobStatus::Pending;
                assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(JobStatus::Complete.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn pending_record_has_no_sequence() {
        let now = Utc::now();
        let record = JobRecord::pending(crate::types::new_job_id(), Prediction::seed(), now);
        assert_eq!(record.status, JobStatus::Pending);
        assert!(record.finished_seq.is_none());
        assert_eq!(record.age(now + chrono::Duration::seconds(5)).num_seconds(), 5);
    }
}
