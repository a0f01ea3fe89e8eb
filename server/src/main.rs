mod api;
mod config;
mod creation;
mod services;
mod store;

use axum::extract::MatchedPath;
use axum::http::Request;
use std::env;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use videochef_core::{
    Collaborators, ExtractionClient, InMemoryProgressStore, ProgressTracker, WorkerPool,
};

use crate::config::ServerConfig;
use crate::creation::RecipeCreator;
use crate::services::StoreBackedServices;
use crate::store::RecipeStore;

/// Application state shared across all handlers
pub type AppState = Arc<RecipeCreator>;

/// Console logging filtered by RUST_LOG (default: info).
fn init_telemetry() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        println!("{}", api::openapi().to_pretty_json()?);
        return Ok(());
    }

    init_telemetry();

    let config = ServerConfig::from_env()?;
    let client = ExtractionClient::from_env()?;
    tracing::info!(
        extraction_url = %client.config().base_url,
        max_parallel_steps = config.max_parallel_steps,
        "Loaded configuration"
    );

    let store = Arc::new(RecipeStore::new());
    let progress = ProgressTracker::new(Arc::new(InMemoryProgressStore::new()));
    let services = Collaborators::from_all(Arc::new(StoreBackedServices::new(
        client,
        Arc::clone(&store),
    )));

    let creator = RecipeCreator::new(
        store,
        progress,
        &services,
        WorkerPool::new(config.max_parallel_steps),
        config.allowed_hosts.clone(),
    );

    let app = api::router(Arc::new(creator)).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str)
                    .unwrap_or(request.uri().path());

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %matched_path,
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &Span| {
                    let status = response.status().as_u16();
                    if status >= 500 {
                        tracing::error!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            "request failed with server error"
                        );
                    } else {
                        tracing::info!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            "request completed"
                        );
                    }
                },
            )
            .on_failure(
                |error: tower_http::classify::ServerErrorsFailureClass,
                 latency: std::time::Duration,
                 _span: &Span| {
                    tracing::error!(
                        error = %error,
                        latency_ms = %latency.as_millis(),
                        "request failed"
                    );
                },
            ),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);
    tracing::info!("OpenAPI spec available at /api-docs/openapi.json");

    axum::serve(listener, app).await?;
    Ok(())
}
