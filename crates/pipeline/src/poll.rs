//! Poll resolution.
//!
//! A poll promotes at most one completed job. If none is ready it reports
//! whether work is still pending, otherwise it returns the current item
//! unchanged. Failed jobs are never reported; they simply stop counting
//! as pending and are left for the reaper.

use std::sync::Arc;

use augur_core::job_events::EVENT_JOB_PROMOTED;
use augur_core::prediction::Prediction;
use augur_core::view::FrameView;
use augur_events::{EventBus, LifecycleEvent};
use augur_store::{ActiveItem, JobStore};
use serde_json::json;
use tokio::sync::Mutex;

use crate::PipelineError;

/// What a single poll decided.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// A completed job was removed from the store and is now the active item.
    Promoted(Prediction),
    /// Nothing completed yet, but `pending` jobs are still running.
    StillGenerating { pending: usize, current: Prediction },
    /// No pending work; `current` is the unchanged active item.
    Idle(Prediction),
}

impl From<PollOutcome> for FrameView {
    fn from(outcome: PollOutcome) -> Self {
        match outcome {
            PollOutcome::Promoted(prediction) => FrameView::promoted(prediction),
            PollOutcome::StillGenerating { current, .. } => FrameView::still_generating(current),
            PollOutcome::Idle(current) => FrameView::refreshed(current),
        }
    }
}

pub struct PollResolver {
    store: Arc<dyn JobStore>,
    active: Arc<ActiveItem>,
    events: Arc<EventBus>,
    /// Held from take to replace so promotions reach the active item in
    /// the order they left the store.
    promotion: Mutex<()>,
}

impl PollResolver {
    pub fn new(store: Arc<dyn JobStore>, active: Arc<ActiveItem>, events: Arc<EventBus>) -> Self {
        Self {
            store,
            active,
            events,
            promotion: Mutex::new(()),
        }
    }

    /// Decide the outcome of one poll, promoting a completed job if any.
    ///
    /// Selection and removal happen in one store operation, so two
    /// concurrent polls never promote the same job.
    pub async fn resolve(&self) -> Result<PollOutcome, PipelineError> {
        let promotion = self.promotion.lock().await;
        if let Some(record) = self.store.take_next_complete().await? {
            let promoted = record.payload;
            let displaced = self.active.replace(promoted.clone()).await;
            drop(promotion);

            tracing::info!(
                job_id = %record.id,
                symbol = %promoted.coin_symbol,
                displaced = %displaced.id,
                "Prediction promoted",
            );
            self.events.publish(
                LifecycleEvent::new(EVENT_JOB_PROMOTED)
                    .for_job(record.id)
                    .with_payload(json!({
                        "coin_symbol": promoted.coin_symbol,
                        "displaced": displaced.id,
                    })),
            );
            return Ok(PollOutcome::Promoted(promoted));
        }
        drop(promotion);

        let pending = self.store.counts().await?.pending;
        let current = self.active.snapshot().await;

        if pending > 0 {
            tracing::debug!(pending, "Poll: still generating");
            Ok(PollOutcome::StillGenerating { pending, current })
        } else {
            Ok(PollOutcome::Idle(current))
        }
    }

    /// [`resolve`](Self::resolve) rendered as a client view.
    pub async fn poll(&self) -> Result<FrameView, PipelineError> {
        Ok(self.resolve().await?.into())
    }
}
