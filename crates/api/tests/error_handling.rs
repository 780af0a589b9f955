//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server needed.

use augur_api::error::AppError;
use augur_core::error::CoreError;
use augur_core::types::new_job_id;
use augur_core::view::{IMAGE_ERROR, LABEL_TRY_AGAIN, MSG_ERROR};
use augur_pipeline::{PipelineError, QueueError, ServiceError};
use augur_store::StoreError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: CoreError::Validation maps to 400 with VALIDATION_ERROR code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("Unknown button index 9".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Unknown button index 9");
}

// ---------------------------------------------------------------------------
// Test: AppError::BadRequest maps to 400 with BAD_REQUEST code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let (status, json) = error_to_response(AppError::BadRequest("missing body".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: a full queue maps to 503
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_queue_returns_503() {
    let err = AppError::Service(ServiceError::Busy(QueueError::Full(new_job_id())));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "QUEUE_FULL");
}

// ---------------------------------------------------------------------------
// Test: pipeline errors map to 500 and sanitize the message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pipeline_error_returns_500_and_sanitizes_message() {
    let err = AppError::Service(ServiceError::Pipeline(PipelineError::Store(
        StoreError::Backend("connection string postgres://secret".into()),
    )));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: every error carries the generic error view
// ---------------------------------------------------------------------------

#[tokio::test]
async fn error_body_carries_error_view() {
    let (_, json) = error_to_response(AppError::BadRequest("boom".into())).await;

    assert_eq!(json["view"]["image"], IMAGE_ERROR);
    assert_eq!(json["view"]["status_message"], MSG_ERROR);
    assert_eq!(json["view"]["button_label"], LABEL_TRY_AGAIN);
}
