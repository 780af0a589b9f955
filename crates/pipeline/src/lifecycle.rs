//! Lifecycle controller.
//!
//! Owns the write side of a job: the pending record written before the
//! caller gets its response, the staged work that produces a prediction,
//! and the single terminal transition at the end.

use std::sync::Arc;

use augur_core::job::JobStatus;
use augur_core::job_events::{
    EVENT_JOB_COMPLETED, EVENT_JOB_DISCARDED, EVENT_JOB_FAILED, EVENT_JOB_STARTED,
};
use augur_core::metadata::AssetMetadata;
use augur_core::prediction::{
    pick_fallback, simulated_launch_price, Category, Confidence, Prediction, FALLBACK_TIMEFRAME,
};
use augur_core::symbol::derive_symbol;
use augur_core::types::JobId;
use augur_events::{EventBus, LifecycleEvent};
use augur_providers::{
    generate_or_placeholder, AssetRegistry, GeneratedText, ImageGenerator, RegisterAsset,
    TextGenerator,
};
use augur_store::{ActiveItem, JobStore, StoreError};
use chrono::Utc;
use serde_json::json;

use crate::PipelineError;

/// The external backends a job calls out to.
#[derive(Clone)]
pub struct Backends {
    pub text: Arc<dyn TextGenerator>,
    pub image: Arc<dyn ImageGenerator>,
    pub registry: Arc<dyn AssetRegistry>,
}

/// Values stamped into every registration.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    /// Address that receives creator rewards.
    pub payout_recipient: String,
    /// Base URL used for the metadata `external_url`.
    pub public_url: String,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            payout_recipient: "0x742d35Cc6634C0532925a3b8D926F2E4F4c4e5b0".to_string(),
            public_url: "http://localhost:3000".to_string(),
        }
    }
}

pub struct LifecycleController {
    store: Arc<dyn JobStore>,
    active: Arc<ActiveItem>,
    backends: Backends,
    events: Arc<EventBus>,
    settings: LifecycleSettings,
}

impl LifecycleController {
    pub fn new(
        store: Arc<dyn JobStore>,
        active: Arc<ActiveItem>,
        backends: Backends,
        events: Arc<EventBus>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            store,
            active,
            backends,
            events,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Write the pending record for `id`.
    ///
    /// Must complete before the trigger response is sent, so a poll that
    /// follows immediately always sees the job.
    pub async fn begin(&self, id: JobId) -> Result<(), PipelineError> {
        let placeholder = self.active.snapshot().await;
        self.store.insert_pending(id, placeholder, Utc::now()).await?;

        tracing::info!(job_id = %id, "Generation job started");
        self.events
            .publish(LifecycleEvent::new(EVENT_JOB_STARTED).for_job(id));
        Ok(())
    }

    /// Run every stage for `id` and record the result as `complete`.
    ///
    /// Text and image failures degrade to fallbacks and registration
    /// failure only drops the address, so the only errors left are store
    /// errors. A record that is gone by the time the work finishes stays
    /// gone: the result is discarded.
    pub async fn execute(&self, id: JobId) -> Result<Prediction, PipelineError> {
        let generated = match self.backends.text.generate().await {
            Ok(generated) => generated,
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, "Text generation failed, using fallback");
                fallback_text()
            }
        };

        let image = generate_or_placeholder(self.backends.image.as_ref(), &generated.text).await;
        let symbol = derive_symbol(&generated.text);

        let metadata = AssetMetadata::for_prediction(
            &generated.text,
            &symbol,
            &image.url,
            &self.settings.public_url,
        );
        let registration = self
            .backends
            .registry
            .register(RegisterAsset {
                name: metadata.name,
                symbol: symbol.clone(),
                description: metadata.description,
                image: image.url.clone(),
                payout_recipient: self.settings.payout_recipient.clone(),
            })
            .await;

        if !registration.success {
            tracing::warn!(
                job_id = %id,
                symbol = %symbol,
                error = registration.error.as_deref().unwrap_or("unknown"),
                "Coin registration failed, completing without address",
            );
        }

        let price = simulated_launch_price(&mut rand::rng());
        let coin_address = if registration.success {
            registration.address
        } else {
            None
        };

        let prediction = Prediction {
            id: id.to_string(),
            text: generated.text,
            image: image.url,
            coin_symbol: symbol,
            coin_address,
            price,
            confidence: generated.confidence,
            timeframe: generated.timeframe,
            category: generated.category,
            created_at: Utc::now(),
            transaction_hash: registration.tx_ref,
            registered: registration.success,
        };

        match self
            .store
            .transition(id, JobStatus::Complete, Some(prediction.clone()))
            .await
        {
            Ok(_) => {
                tracing::info!(
                    job_id = %id,
                    symbol = %prediction.coin_symbol,
                    registered = prediction.registered,
                    "Generation job completed",
                );
                self.events.publish(
                    LifecycleEvent::new(EVENT_JOB_COMPLETED)
                        .for_job(id)
                        .with_payload(json!({
                            "coin_symbol": prediction.coin_symbol,
                            "registered": prediction.registered,
                            "image_generated": image.success,
                        })),
                );
                Ok(prediction)
            }
            Err(StoreError::NotFound(_)) => {
                self.discard(id, "complete");
                Err(PipelineError::Discarded(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Record `id` as `failed`.
    ///
    /// Never re-creates an evicted record and never overwrites a terminal
    /// one; both cases are logged and otherwise ignored.
    pub async fn fail(&self, id: JobId, reason: &PipelineError) {
        match self.store.transition(id, JobStatus::Failed, None).await {
            Ok(_) => {
                tracing::warn!(job_id = %id, reason = %reason, "Generation job failed");
                self.events.publish(
                    LifecycleEvent::new(EVENT_JOB_FAILED)
                        .for_job(id)
                        .with_payload(json!({ "reason": reason.to_string() })),
                );
            }
            Err(StoreError::NotFound(_)) => self.discard(id, "fail"),
            Err(StoreError::InvalidTransition { from, .. }) => {
                tracing::debug!(job_id = %id, status = %from, "Job already terminal, not failing");
            }
            Err(e) => {
                tracing::error!(job_id = %id, error = %e, "Failed to record job failure");
            }
        }
    }

    fn discard(&self, id: JobId, outcome: &str) {
        tracing::warn!(job_id = %id, outcome, "Job record gone, discarding late result");
        self.events.publish(
            LifecycleEvent::new(EVENT_JOB_DISCARDED)
                .for_job(id)
                .with_payload(json!({ "outcome": outcome })),
        );
    }
}

/// Tags attached to a built-in prediction are fixed rather than analysed.
fn fallback_text() -> GeneratedText {
    GeneratedText {
        text: pick_fallback(&mut rand::rng()).to_string(),
        confidence: Confidence::Medium,
        timeframe: FALLBACK_TIMEFRAME.to_string(),
        category: Category::Price,
    }
}
