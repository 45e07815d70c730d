//! Application setup and initialization
//!
//! All startup logic lives here: telemetry, storage backend construction,
//! state wiring, and route configuration. Configuration problems (missing
//! storage credentials in particular) fail the process here, before any
//! request is accepted.

pub mod routes;
pub mod server;
pub mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use fileward_core::Config;
use fileward_storage::ObjectStorage;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    telemetry::init_tracing();

    tracing::info!("Configuration loaded and validated successfully");

    // Explicitly constructed storage handle, injected into the state;
    // nothing reaches for ambient globals after this point
    let backend = fileward_storage::create_storage(&config)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(backend = %backend.backend_type(), "Storage backend initialized");

    let state = Arc::new(AppState::new(config, backend));
    let router = routes::build_router(state.clone());

    Ok((state, router))
}
