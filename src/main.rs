//! `MindMinute` reset server
//!
//! Serves the health check and the rate-limited reset route.

use mindminute::api::{create_router, AppState};
use mindminute::config::ServerConfig;
use mindminute::llm::build_service;
use mindminute::mediator::ResetMediator;
use mindminute::rate_limit::RateLimiter;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindminute=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = ServerConfig::from_env();

    let llm = build_service(&config.llm);
    tracing::info!(model = %llm.model_id(), "Reflection provider initialized");

    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_per_window,
        config.rate_window,
    ));
    let _cleanup = limiter.spawn_cleanup();
    tracing::info!(
        max_requests = config.rate_limit_per_window,
        window_s = config.rate_window.as_secs(),
        "Rate limiter initialized"
    );

    let mediator = ResetMediator::new(llm, limiter, config.provider_timeout);
    let state = AppState::new(mediator).with_max_request_bytes(config.max_request_bytes);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("MindMinute backend listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
