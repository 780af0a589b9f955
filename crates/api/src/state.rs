use std::sync::Arc;

use augur_pipeline::GenerationService;
use augur_providers::ImageProxy;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Trigger, poll and the other interactions.
    pub service: Arc<GenerationService>,
    /// Relays generated images for `GET /api/v1/image-proxy`.
    pub image_proxy: Arc<ImageProxy>,
}
