//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// API path prefix.
pub const API_PREFIX: &str = "/api/v0";

/// Setup all application routes
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = setup_cors(&state);
    let body_limit = state.limits.request_body_limit();

    let api = Router::new()
        .route(
            "/uploads/profile-photo",
            post(handlers::upload_profile_photo),
        )
        .route("/uploads/certificate", post(handlers::upload_certificate))
        .route("/uploads/portfolio", post(handlers::upload_portfolio))
        .route(
            "/uploads/advertisement",
            post(handlers::upload_advertisement),
        )
        .route("/uploads", delete(handlers::delete_objects))
        .route("/uploads/{*key}", get(handlers::lookup_object));

    Router::new()
        .route("/health", get(handlers::health))
        .nest(API_PREFIX, api)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn setup_cors(state: &Arc<AppState>) -> CorsLayer {
    let origins = &state.config.cors_origins;

    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
