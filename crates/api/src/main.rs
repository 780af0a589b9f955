use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use augur_api::config::{GenerationConfig, ServerConfig};
use augur_api::router::build_app_router;
use augur_api::state::AppState;
use augur_events::{EventBus, EventLogger};
use augur_pipeline::{Backends, GenerationService, StartedService};
use augur_providers::{
    ImageProxy, OpenAiApi, OpenAiImageGenerator, OpenAiTextGenerator, RegistryConfig,
    SimulatedRegistry,
};
use augur_store::{ActiveItem, InMemoryJobStore};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "augur_api=debug,augur_pipeline=debug,augur_events=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let logger_handle = tokio::spawn(EventLogger::run(event_bus.subscribe()));

    // --- Generation pipeline ---
    let shutdown = CancellationToken::new();
    let StartedService { service, tasks } = GenerationService::start(
        Arc::new(InMemoryJobStore::new()),
        Arc::new(ActiveItem::default()),
        build_backends(&config.generation),
        Arc::clone(&event_bus),
        config.pipeline_config(),
        shutdown.clone(),
    );
    tracing::info!("Generation pipeline started (queue workers, reaper)");

    // --- App state ---
    let state = AppState {
        service,
        image_proxy: Arc::new(ImageProxy::new()),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // In-flight jobs are cancelled and recorded as failed.
    shutdown.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    for handle in tasks {
        let _ = tokio::time::timeout(grace, handle).await;
    }
    tracing::info!("Generation pipeline stopped");

    // The logger stops once the last bus handle is gone.
    drop(event_bus);
    match tokio::time::timeout(grace, logger_handle).await {
        Ok(Ok(logged)) => tracing::info!(logged, "Event logger stopped"),
        _ => tracing::warn!("Event logger did not stop in time"),
    }

    tracing::info!("Graceful shutdown complete");
}

/// Build the text, image and registry backends.
///
/// Without an API key the OpenAI clients fail every call and the pipeline
/// falls back to built-in predictions and placeholder images.
fn build_backends(config: &GenerationConfig) -> Backends {
    let api = Arc::new(OpenAiApi::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
    ));
    if !api.is_configured() {
        tracing::warn!("OPENAI_API_KEY not set, using fallback predictions and placeholder images");
    }

    Backends {
        text: Arc::new(OpenAiTextGenerator::new(Arc::clone(&api))),
        image: Arc::new(OpenAiImageGenerator::new(api)),
        registry: Arc::new(SimulatedRegistry::new(RegistryConfig {
            simulate_latency: config.registry_simulated_latency,
        })),
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
