//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post, put};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{achievements, actions, health, profile};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for action recording endpoints.
/// The generation pipeline reports at high volume; this prevents overload.
const ACTIONS_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Profile (user JWT auth)
/// - `POST /v1/profile` - Create profile at signup
/// - `GET /v1/profile/me` - Get the caller's profile
/// - `PUT /v1/profile/username` - Reserve or change the username
/// - `GET /v1/profile/achievements` - The caller's unlocked achievements
/// - `GET /v1/usernames/:username/available` - Username availability check
/// - `GET /v1/achievements` - Static achievement catalog
/// - `GET /v1/actions/history` - The caller's activity history
///
/// ## Actions (service API key auth, rate-limited)
/// - `POST /v1/actions` - Record a trackable action
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // Action routes handle high-volume traffic from services, so they have
    // a higher concurrency limit but are still protected from overload.
    let action_routes = Router::new()
        .route("/", post(actions::record_action))
        .route("/history", get(actions::list_history))
        .layer(ConcurrencyLimitLayer::new(ACTIONS_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Profile
        .route("/profile", post(profile::create_profile))
        .route("/profile/me", get(profile::get_profile))
        .route("/profile/username", put(profile::update_username))
        .route("/profile/achievements", get(achievements::list_unlocked))
        // Usernames
        .route(
            "/usernames/:username/available",
            get(profile::username_available),
        )
        // Achievements
        .route("/achievements", get(achievements::list_catalog))
        // Action routes (with their own concurrency limit)
        .nest("/actions", action_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
