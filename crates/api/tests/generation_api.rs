//! Integration tests for the generation, prediction and frame endpoints.

mod common;

use std::sync::Arc;

use augur_core::job_events::{EVENT_JOB_COMPLETED, EVENT_JOB_FAILED};
use augur_core::view::{
    IMAGE_GENERATING, IMAGE_STILL_GENERATING, LABEL_CHECK_STATUS, LABEL_TRY_AGAIN,
    MSG_GENERATING, MSG_PROMOTED, MSG_REFRESHED,
};
use augur_pipeline::QueueConfig;
use axum::http::StatusCode;
use common::{
    body_json, get, post, post_json, post_raw, wait_for_event, HangingText, TEST_PREDICTION,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: GET /api/v1/prediction returns the seed item
// ---------------------------------------------------------------------------

#[tokio::test]
async fn current_prediction_starts_as_seed() {
    let app = common::build_test_app();
    let response = get(app.router.clone(), "/api/v1/prediction").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], "seed");
    assert_eq!(json["data"]["coin_symbol"], "BTC150K");
}

// ---------------------------------------------------------------------------
// Test: trigger answers 202 with the generating view
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trigger_returns_generating_view() {
    let app = common::build_test_app_with(Arc::new(HangingText), QueueConfig::default());
    let response = post(app.router.clone(), "/api/v1/generations").await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["image"], IMAGE_GENERATING);
    assert_eq!(json["data"]["status_message"], MSG_GENERATING);
    assert_eq!(json["data"]["button_label"], LABEL_CHECK_STATUS);

    let poll = body_json(post(app.router.clone(), "/api/v1/generations/poll").await).await;
    assert_eq!(poll["data"]["image"], IMAGE_STILL_GENERATING);
    assert_eq!(poll["data"]["prediction"]["id"], "seed");
}

// ---------------------------------------------------------------------------
// Test: trigger, wait, poll promotes; the next poll just refreshes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completed_generation_is_promoted_by_poll() {
    let app = common::build_test_app();
    let mut rx = app.subscribe();

    post(app.router.clone(), "/api/v1/generations").await;
    wait_for_event(&mut rx, EVENT_JOB_COMPLETED).await;

    let promoted = body_json(post(app.router.clone(), "/api/v1/generations/poll").await).await;
    assert_eq!(promoted["data"]["status_message"], MSG_PROMOTED);
    assert_eq!(promoted["data"]["prediction"]["text"], TEST_PREDICTION);
    assert_eq!(promoted["data"]["image"], "https://images.test/meme.png");
    assert_eq!(promoted["data"]["prediction"]["registered"], true);
    assert!(promoted["data"]["prediction"]["coin_symbol"]
        .as_str()
        .unwrap()
        .starts_with("BTC"));

    let again = body_json(post(app.router.clone(), "/api/v1/generations/poll").await).await;
    assert_eq!(again["data"]["status_message"], MSG_REFRESHED);

    let current = body_json(get(app.router.clone(), "/api/v1/prediction").await).await;
    assert_eq!(current["data"]["text"], TEST_PREDICTION);
}

// ---------------------------------------------------------------------------
// Test: frame buttons dispatch to their actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn frame_buttons_dispatch() {
    let app = common::build_test_app();

    let buy = body_json(
        post_json(app.router.clone(), "/api/v1/frame", json!({ "button_index": 2 })).await,
    )
    .await;
    assert_eq!(buy["data"]["status_message"], "Demo buy completed");

    let price = body_json(
        post_json(app.router.clone(), "/api/v1/frame", json!({ "button_index": 3 })).await,
    )
    .await;
    assert!(price["data"]["status_message"]
        .as_str()
        .unwrap()
        .starts_with("BTC150K: $"));

    let refresh = body_json(
        post_json(app.router.clone(), "/api/v1/frame", json!({ "button_index": 4 })).await,
    )
    .await;
    assert_eq!(refresh["data"]["status_message"], MSG_REFRESHED);
    assert_eq!(refresh["data"]["prediction"]["price"], price["data"]["prediction"]["price"]);

    let generate =
        post_json(app.router.clone(), "/api/v1/frame", json!({ "button_index": 1 })).await;
    assert_eq!(generate.status(), StatusCode::OK);
    assert_eq!(body_json(generate).await["data"]["image"], IMAGE_GENERATING);
}

#[tokio::test]
async fn unknown_frame_button_is_rejected() {
    let app = common::build_test_app();
    let response =
        post_json(app.router.clone(), "/api/v1/frame", json!({ "button_index": 7 })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["view"]["button_label"], LABEL_TRY_AGAIN);
}

#[tokio::test]
async fn malformed_frame_body_gets_error_view() {
    let app = common::build_test_app();
    let response = post_raw(
        app.router.clone(),
        "/api/v1/frame",
        "application/json",
        "{\"button_index\": ",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["view"]["button_label"], LABEL_TRY_AGAIN);
}

#[tokio::test]
async fn frame_body_without_json_content_type_gets_error_view() {
    let app = common::build_test_app();
    let response =
        post_raw(app.router.clone(), "/api/v1/frame", "text/plain", "button_index=1").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["view"]["status_message"], "Error occurred");
}

// ---------------------------------------------------------------------------
// Test: price and buy endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn price_check_updates_active_item() {
    let app = common::build_test_app();

    let priced = body_json(post(app.router.clone(), "/api/v1/prediction/price").await).await;
    let price = priced["data"]["prediction"]["price"].clone();
    assert!(price.as_str().unwrap().starts_with('$'));

    let current = body_json(get(app.router.clone(), "/api/v1/prediction").await).await;
    assert_eq!(current["data"]["price"], price);
}

#[tokio::test]
async fn buy_of_registered_coin_succeeds() {
    let app = common::build_test_app();
    let mut rx = app.subscribe();

    post(app.router.clone(), "/api/v1/generations").await;
    wait_for_event(&mut rx, EVENT_JOB_COMPLETED).await;
    post(app.router.clone(), "/api/v1/generations/poll").await;

    let bought = body_json(post(app.router.clone(), "/api/v1/prediction/buy").await).await;
    assert_eq!(bought["data"]["status_message"], "Purchase successful!");
}

// ---------------------------------------------------------------------------
// Test: a full queue rejects the trigger with 503 and records the job failed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_queue_rejects_trigger() {
    let app = common::build_test_app_with(
        Arc::new(HangingText),
        QueueConfig {
            workers: 1,
            capacity: 1,
            ..QueueConfig::default()
        },
    );
    let mut rx = app.subscribe();

    let mut statuses = Vec::new();
    for _ in 0..3 {
        statuses.push(post(app.router.clone(), "/api/v1/generations").await.status());
    }

    assert!(statuses.contains(&StatusCode::SERVICE_UNAVAILABLE));
    wait_for_event(&mut rx, EVENT_JOB_FAILED).await;

    let health = body_json(get(app.router.clone(), "/health").await).await;
    assert!(health["jobs"]["failed"].as_u64().unwrap() >= 1);
}
