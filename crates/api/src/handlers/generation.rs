//! Handlers for prediction generation and the interactions on the active
//! prediction.
//!
//! Every interaction answers with a [`FrameView`] in a `{ "data": ... }`
//! envelope; the current snapshot answers with the bare [`Prediction`].

use augur_core::prediction::Prediction;
use augur_core::view::{Button, FrameView};
use augur_providers::placeholder::loading_image_url;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /api/v1/frame`.
#[derive(Debug, Deserialize)]
pub struct FrameAction {
    /// 1-based button index: 1 generate, 2 buy, 3 price, 4 refresh.
    pub button_index: u8,
}

/// Query of `GET /api/v1/image-proxy`.
#[derive(Debug, Deserialize)]
pub struct ImageProxyQuery {
    pub url: Option<String>,
}

const PROXY_CACHE: &str = "public, max-age=86400";
const FALLBACK_CACHE: &str = "public, max-age=300";

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// POST /api/v1/generations
///
/// Start a generation job. Returns 202 as soon as the job is recorded; the
/// result is picked up by a later poll.
pub async fn trigger(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let view = state.service.trigger().await?;
    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: view })))
}

/// POST /api/v1/generations/poll
///
/// Promote a finished job if one is ready.
pub async fn poll(State(state): State<AppState>) -> AppResult<Json<DataResponse<FrameView>>> {
    let view = state.service.poll().await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// Active prediction
// ---------------------------------------------------------------------------

/// GET /api/v1/prediction
pub async fn current(State(state): State<AppState>) -> Json<DataResponse<Prediction>> {
    Json(DataResponse {
        data: state.service.current_snapshot().await,
    })
}

/// POST /api/v1/prediction/price
pub async fn check_price(State(state): State<AppState>) -> Json<DataResponse<FrameView>> {
    Json(DataResponse {
        data: state.service.check_price().await,
    })
}

/// POST /api/v1/prediction/buy
pub async fn buy(State(state): State<AppState>) -> Json<DataResponse<FrameView>> {
    Json(DataResponse {
        data: state.service.buy().await,
    })
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// POST /api/v1/frame
///
/// Dispatch a button press from a frame client. Unknown indexes are a 400.
pub async fn frame(
    State(state): State<AppState>,
    body: Result<Json<FrameAction>, JsonRejection>,
) -> AppResult<Json<DataResponse<FrameView>>> {
    let Json(action) = body?;
    let button = Button::from_index(action.button_index)?;
    tracing::debug!(button_index = action.button_index, ?button, "Frame button pressed");

    let view = state.service.press(button).await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// Image proxy
// ---------------------------------------------------------------------------

/// GET /api/v1/image-proxy?url=...
///
/// Relay an image through the server. When the upstream fetch fails the
/// client is redirected to the loading placeholder.
pub async fn image_proxy(
    State(state): State<AppState>,
    query: Result<Query<ImageProxyQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing image URL".into()))?;

    match state.image_proxy.fetch(&url).await {
        Ok(image) => Ok((
            [
                (header::CONTENT_TYPE, image.content_type),
                (header::CACHE_CONTROL, PROXY_CACHE.to_string()),
            ],
            image.bytes,
        )
            .into_response()),
        Err(e) => {
            tracing::warn!(error = %e, %url, "Image proxy fetch failed, redirecting to placeholder");
            Ok((
                [(header::CACHE_CONTROL, FALLBACK_CACHE)],
                Redirect::temporary(&loading_image_url()),
            )
                .into_response())
        }
    }
}
