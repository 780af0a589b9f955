//! The surface the request layer calls.
//!
//! [`GenerationService::start`] wires the controller, queue, resolver and
//! reaper together and spawns their background tasks.

use std::sync::Arc;

use augur_core::prediction::{format_price, parse_price, Prediction};
use augur_core::types::new_job_id;
use augur_core::view::{Button, FrameView, LABEL_GENERATE};
use augur_events::EventBus;
use augur_providers::placeholder::{
    bought_image_url, demo_bought_image_url, price_image_url, purchase_failed_image_url,
};
use augur_store::{ActiveItem, JobStore, StatusCounts};
use rand::Rng;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::{Backends, LifecycleController, LifecycleSettings};
use crate::poll::PollResolver;
use crate::queue::{JobQueue, QueueConfig, QueueError};
use crate::reaper::{Reaper, ReaperConfig};
use crate::PipelineError;

/// Amount spent by a single buy.
pub const BUY_AMOUNT_ETH: &str = "0.01";

/// Largest random move applied by a price check, in either direction.
const PRICE_DRIFT: f64 = 0.01;

/// Floor for a checked price.
const MIN_PRICE: f64 = 0.0001;

pub const MSG_PURCHASE_OK: &str = "Purchase successful!";
pub const MSG_PURCHASE_FAILED: &str = "Purchase failed";
pub const MSG_DEMO_BUY: &str = "Demo buy completed";

/// Errors surfaced to the request layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The queue refused the job; the client should try again later.
    #[error(transparent)]
    Busy(QueueError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Everything needed to start the pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub lifecycle: LifecycleSettings,
    pub queue: QueueConfig,
    pub reaper: ReaperConfig,
}

/// A running service plus the background tasks it spawned.
pub struct StartedService {
    pub service: Arc<GenerationService>,
    /// Queue workers and the reaper. All stop when the shutdown token fires.
    pub tasks: Vec<JoinHandle<()>>,
}

pub struct GenerationService {
    controller: Arc<LifecycleController>,
    queue: Arc<JobQueue>,
    resolver: PollResolver,
    active: Arc<ActiveItem>,
    backends: Backends,
}

impl GenerationService {
    /// Build the pipeline and spawn its workers and reaper.
    pub fn start(
        store: Arc<dyn JobStore>,
        active: Arc<ActiveItem>,
        backends: Backends,
        events: Arc<EventBus>,
        config: PipelineConfig,
        shutdown: CancellationToken,
    ) -> StartedService {
        let controller = Arc::new(LifecycleController::new(
            Arc::clone(&store),
            Arc::clone(&active),
            backends.clone(),
            Arc::clone(&events),
            config.lifecycle,
        ));

        let (queue, mut tasks) =
            JobQueue::start(Arc::clone(&controller), config.queue, shutdown.clone());

        let reaper = Reaper::new(Arc::clone(&store), Arc::clone(&events), config.reaper)
            .with_queue(Arc::clone(&queue));
        tasks.push(tokio::spawn(async move { reaper.run(shutdown).await }));

        let resolver = PollResolver::new(store, Arc::clone(&active), events);

        let service = Arc::new(Self {
            controller,
            queue,
            resolver,
            active,
            backends,
        });

        StartedService { service, tasks }
    }

    /// Start a generation job and return without waiting for it.
    pub async fn trigger(&self) -> Result<FrameView, ServiceError> {
        let id = new_job_id();
        self.controller.begin(id).await?;

        if let Err(e) = self.queue.enqueue(id).await {
            tracing::warn!(job_id = %id, error = %e, "Generation job rejected by queue");
            self.controller
                .fail(id, &PipelineError::Queue(e.clone()))
                .await;
            return Err(ServiceError::Busy(e));
        }

        Ok(FrameView::generating(self.active.snapshot().await))
    }

    /// Promote a finished job if there is one; see [`PollResolver`].
    pub async fn poll(&self) -> Result<FrameView, ServiceError> {
        Ok(self.resolver.poll().await?)
    }

    /// The prediction currently on display.
    pub async fn current_snapshot(&self) -> Prediction {
        self.active.snapshot().await
    }

    /// Refresh the active item's price and report it.
    pub async fn check_price(&self) -> FrameView {
        let current = self.active.snapshot().await;
        let quoted = match &current.coin_address {
            Some(address) => self.backends.registry.price(address).await,
            None => current.price.clone(),
        };

        let base = parse_price(&quoted).unwrap_or_else(|| {
            tracing::warn!(price = %quoted, "Unparseable price, starting from floor");
            MIN_PRICE
        });
        let drift = rand::rng().random_range(-PRICE_DRIFT..=PRICE_DRIFT);
        let price = format_price((base + drift).max(MIN_PRICE));

        let updated = self.active.set_price(price.clone()).await;
        tracing::debug!(symbol = %updated.coin_symbol, price = %price, "Price checked");

        FrameView::new(
            price_image_url(&updated.coin_symbol, &price),
            format!("{}: {price}", updated.coin_symbol),
            LABEL_GENERATE,
            updated,
        )
    }

    /// Buy the active item's coin, or simulate a buy if it has no address.
    pub async fn buy(&self) -> FrameView {
        let current = self.active.snapshot().await;

        let (image, message) = match &current.coin_address {
            Some(address) => {
                let trade = self.backends.registry.buy(address, BUY_AMOUNT_ETH).await;
                if trade.success {
                    (bought_image_url(&current.coin_symbol), MSG_PURCHASE_OK)
                } else {
                    tracing::warn!(
                        symbol = %current.coin_symbol,
                        error = trade.error.as_deref().unwrap_or("unknown"),
                        "Buy failed",
                    );
                    (purchase_failed_image_url(), MSG_PURCHASE_FAILED)
                }
            }
            None => (demo_bought_image_url(&current.coin_symbol), MSG_DEMO_BUY),
        };

        FrameView::new(image, message, LABEL_GENERATE, current)
    }

    /// Dispatch a frame button press.
    pub async fn press(&self, button: Button) -> Result<FrameView, ServiceError> {
        match button {
            Button::Generate => self.trigger().await,
            Button::Buy => Ok(self.buy().await),
            Button::Price => Ok(self.check_price().await),
            Button::Refresh => self.poll().await,
        }
    }

    /// Record counts per status.
    pub async fn counts(&self) -> Result<StatusCounts, ServiceError> {
        Ok(self
            .controller
            .store()
            .counts()
            .await
            .map_err(PipelineError::from)?)
    }

    /// Number of jobs queued or running.
    pub async fn in_flight(&self) -> usize {
        self.queue.in_flight().await
    }
}
