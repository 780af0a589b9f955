//! Tests for [`ImageProxy`] against a local upstream.

use assert_matches::assert_matches;
use augur_providers::{ImageProxy, ProviderError};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn upstream() -> Router {
    Router::new()
        .route(
            "/typed.webp",
            get(|| async { ([("content-type", "image/webp")], vec![7u8, 8, 9]) }),
        )
        .route("/untyped", get(|| async { vec![1u8, 2, 3] }))
        .route(
            "/gone",
            get(|| async { (StatusCode::NOT_FOUND, "no such image") }),
        )
}

#[tokio::test]
async fn fetch_keeps_upstream_content_type() {
    let base = spawn(upstream()).await;
    let image = ImageProxy::new()
        .fetch(&format!("{base}/typed.webp"))
        .await
        .unwrap();

    assert_eq!(image.content_type, "image/webp");
    assert_eq!(image.bytes, vec![7, 8, 9]);
}

#[tokio::test]
async fn fetch_defaults_to_png() {
    let base = spawn(upstream()).await;
    let image = ImageProxy::new()
        .fetch(&format!("{base}/untyped"))
        .await
        .unwrap();

    assert_eq!(image.content_type, "image/png");
}

#[tokio::test]
async fn upstream_error_status_is_reported() {
    let base = spawn(upstream()).await;
    let err = ImageProxy::new()
        .fetch(&format!("{base}/gone"))
        .await
        .unwrap_err();

    assert_matches!(err, ProviderError::UpstreamStatus(404));
}

#[tokio::test]
async fn non_http_scheme_is_refused() {
    let err = ImageProxy::new().fetch("ftp://example.com/a.png").await.unwrap_err();
    assert_matches!(err, ProviderError::Other(msg) if msg.contains("ftp"));
}
