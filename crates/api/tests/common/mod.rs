#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use augur_api::config::{GenerationConfig, ServerConfig};
use augur_api::router::build_app_router;
use augur_api::state::AppState;
use augur_events::{EventBus, LifecycleEvent};
use augur_pipeline::{Backends, GenerationService, PipelineConfig, QueueConfig};
use augur_providers::openai::DEFAULT_BASE_URL;
use augur_providers::{
    GeneratedText, ImageGenerator, ImageProxy, ProviderError, RegistryConfig, SimulatedRegistry,
    TextGenerator,
};
use augur_store::{ActiveItem, InMemoryJobStore};
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

pub const TEST_PREDICTION: &str = "Bitcoin will hit $200K by end of 2025!";

// ---------------------------------------------------------------------------
// Stub backends
// ---------------------------------------------------------------------------

/// Always answers with [`TEST_PREDICTION`].
pub struct FixedText;

#[async_trait]
impl TextGenerator for FixedText {
    async fn generate(&self) -> Result<GeneratedText, ProviderError> {
        Ok(GeneratedText::analyzed(TEST_PREDICTION))
    }
}

/// Never answers.
pub struct HangingText;

#[async_trait]
impl TextGenerator for HangingText {
    async fn generate(&self) -> Result<GeneratedText, ProviderError> {
        std::future::pending().await
    }
}

pub struct FixedImage;

#[async_trait]
impl ImageGenerator for FixedImage {
    async fn generate(&self, _prediction: &str) -> Result<String, ProviderError> {
        Ok("https://images.test/meme.png".to_string())
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 5,
        shutdown_timeout_secs: 1,
        public_url: "http://localhost:3000".to_string(),
        generation: GenerationConfig {
            job_max_age_secs: 60,
            reaper_interval_secs: 30,
            job_timeout_secs: 55,
            queue_workers: 2,
            queue_capacity: 16,
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            payout_recipient: "0x742d35Cc6634C0532925a3b8D926F2E4F4c4e5b0".to_string(),
            registry_simulated_latency: false,
        },
    }
}

/// A running app plus handles tests use to observe it. Background tasks
/// stop when this is dropped.
pub struct TestApp {
    pub router: Router,
    pub events: Arc<EventBus>,
    shutdown: CancellationToken,
}

impl TestApp {
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Build the full application router with all middleware layers and stub
/// generators behind it.
pub fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(FixedText), QueueConfig::default())
}

pub fn build_test_app_with(text: Arc<dyn TextGenerator>, queue: QueueConfig) -> TestApp {
    let config = test_config();
    let events = Arc::new(EventBus::default());
    let shutdown = CancellationToken::new();

    let backends = Backends {
        text,
        image: Arc::new(FixedImage),
        registry: Arc::new(SimulatedRegistry::new(RegistryConfig {
            simulate_latency: false,
        })),
    };

    let started = GenerationService::start(
        Arc::new(InMemoryJobStore::new()),
        Arc::new(ActiveItem::default()),
        backends,
        Arc::clone(&events),
        PipelineConfig {
            queue,
            ..config.pipeline_config()
        },
        shutdown.clone(),
    );

    let state = AppState {
        service: started.service,
        image_proxy: Arc::new(ImageProxy::new()),
    };

    TestApp {
        router: build_app_router(state, &config),
        events,
        shutdown,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

/// POST a raw body with an explicit content type.
pub async fn post_raw(app: Router, uri: &str, content_type: &str, body: &'static str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Wait up to five seconds for an event of `event_type`.
pub async fn wait_for_event(
    rx: &mut broadcast::Receiver<LifecycleEvent>,
    event_type: &str,
) -> LifecycleEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.expect("event bus closed");
            if event.event_type == event_type {
                return event;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no {event_type} event within 5s"))
}
