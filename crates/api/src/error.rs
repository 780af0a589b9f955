use augur_core::error::CoreError;
use augur_core::view::{IMAGE_ERROR, LABEL_TRY_AGAIN, MSG_ERROR};
use augur_pipeline::{QueueError, ServiceError};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`ServiceError`] and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses
/// that also carry the generic error view for frame clients.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `augur_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure inside the generation service.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }

            // --- Service errors ---
            AppError::Service(err) => classify_service_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
            "view": {
                "image": IMAGE_ERROR,
                "status_message": MSG_ERROR,
                "button_label": LABEL_TRY_AGAIN,
            },
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a service error into an HTTP status, error code, and message.
///
/// - A rejected enqueue maps to 503 so the client retries later.
/// - Everything else maps to 500 with a sanitized message.
fn classify_service_error(err: &ServiceError) -> (StatusCode, &'static str, String) {
    match err {
        ServiceError::Busy(QueueError::Full(_)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "QUEUE_FULL",
            "Too many predictions in progress, try again shortly".to_string(),
        ),
        ServiceError::Busy(QueueError::Closed(_)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "SHUTTING_DOWN",
            "Generation is unavailable while the server shuts down".to_string(),
        ),
        ServiceError::Pipeline(e) => internal(&e.to_string()),
    }
}

fn internal(msg: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %msg, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
