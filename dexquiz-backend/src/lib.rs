pub mod config;
mod error;
pub mod helpers;
mod routes;
mod validation;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use dexquiz_core::SessionRegistry;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub registry: SessionRegistry,
}

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Milliseconds to replenish one guess request
    pub guess_replenish_ms: u64,
    /// Burst size for the guess endpoint
    pub guess_burst: u32,
    /// Milliseconds to replenish one request on other game endpoints
    pub general_replenish_ms: u64,
    /// Burst size for other game endpoints
    pub general_burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            guess_replenish_ms: 50,
            guess_burst: 40,
            general_replenish_ms: 100,
            general_burst: 30,
        }
    }
}

impl From<&config::Config> for RateLimitConfig {
    fn from(config: &config::Config) -> Self {
        Self {
            guess_replenish_ms: config.rate_limit_guess_replenish_ms,
            guess_burst: config.rate_limit_guess_burst,
            general_replenish_ms: config.rate_limit_general_replenish_ms,
            general_burst: config.rate_limit_general_burst,
        }
    }
}

/// Create the application router over the given registry and configuration
pub fn create_app(
    registry: SessionRegistry,
    request_body_limit: usize,
    request_timeout: Duration,
    rate_limit: RateLimitConfig,
) -> Router {
    let state = Arc::new(AppState { registry });

    // Guesses come in fast from every player in a lobby
    let guess_governor = GovernorConfigBuilder::default()
        .per_millisecond(rate_limit.guess_replenish_ms.max(1))
        .burst_size(rate_limit.guess_burst.max(1))
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("guess rate limit must be non-zero");

    let general_governor = GovernorConfigBuilder::default()
        .per_millisecond(rate_limit.general_replenish_ms.max(1))
        .burst_size(rate_limit.general_burst.max(1))
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("general rate limit must be non-zero");

    let guess_routes = Router::new()
        .route("/games/{lobby_id}/guess", post(routes::submit_guess))
        .layer(GovernorLayer::new(guess_governor));

    let game_routes = Router::new()
        .route("/games", post(routes::create_game))
        .route("/games/{lobby_id}/join", post(routes::join_game))
        .route("/games/{lobby_id}/state", get(routes::game_state))
        .route("/games/{lobby_id}/players", get(routes::lobby_players))
        .route("/games/{lobby_id}/reset", post(routes::reset_game))
        .route("/games/{lobby_id}/start", post(routes::start_game))
        .route("/games/{lobby_id}/pause", post(routes::pause_game))
        .layer(GovernorLayer::new(general_governor));

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .merge(guess_routes)
        .merge(game_routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(RequestBodyLimitLayer::new(request_body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
