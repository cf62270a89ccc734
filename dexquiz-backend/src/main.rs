use dexquiz_backend::{RateLimitConfig, config::Config, create_app};
use dexquiz_core::{Catalog, SessionRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing for structured logging; RUST_LOG overrides the level
    #[cfg(debug_assertions)]
    let log_level = "debug";
    #[cfg(not(debug_assertions))]
    let log_level = "info";

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .compact()
        .init();
    tracing::info!("Starting dexquiz backend server...");

    let config = Config::from_env();
    tracing::info!(
        "Configuration: port={}, body_limit={}KB, timeout={}s, game_duration={}s, catalog={}",
        config.port,
        config.request_body_limit / 1024,
        config.request_timeout.as_secs(),
        config.game_duration_secs,
        config.catalog_path.as_deref().unwrap_or("<generation 1>")
    );
    tracing::info!(
        "Rate limits: guess=1/{}ms (burst {}), general=1/{}ms (burst {})",
        config.rate_limit_guess_replenish_ms,
        config.rate_limit_guess_burst,
        config.rate_limit_general_replenish_ms,
        config.rate_limit_general_burst
    );

    let catalog = match &config.catalog_path {
        Some(path) => {
            let text = std::fs::read_to_string(path).expect("failed to read catalog file");
            Catalog::from_lines(&text).expect("invalid catalog file")
        }
        None => Catalog::generation_one(),
    };
    tracing::info!(entries = catalog.len(), "catalog loaded");

    let registry = SessionRegistry::new(Arc::new(catalog), config.game_duration_secs);
    let app = create_app(
        registry,
        config.request_body_limit,
        config.request_timeout,
        RateLimitConfig::from(&config),
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await.expect("failed to bind listener");
    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!("Axum server error: {}", e);
    }
}
