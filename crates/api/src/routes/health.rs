use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Job records by status; absent if the store could not be read.
    pub jobs: Option<JobCounts>,
    /// Jobs queued or running.
    pub in_flight: usize,
}

#[derive(Serialize)]
pub struct JobCounts {
    pub pending: usize,
    pub complete: usize,
    pub failed: usize,
}

/// GET /health -- returns service status and job counts.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let jobs = match state.service.counts().await {
        Ok(c) => Some(JobCounts {
            pending: c.pending,
            complete: c.complete,
            failed: c.failed,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read job store");
            None
        }
    };

    Json(HealthResponse {
        status: if jobs.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        jobs,
        in_flight: state.service.in_flight().await,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
