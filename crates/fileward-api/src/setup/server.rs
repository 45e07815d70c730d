//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use fileward_core::Config;
use tokio_util::sync::CancellationToken;

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, app: Router, shutdown: CancellationToken) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let max_file_mb = config.max_file_size_bytes / 1024 / 1024;
    tracing::info!(
        max_file_mb,
        max_attempts = config.upload_max_attempts,
        attempt_timeout_secs = config.upload_attempt_timeout_secs,
        "Server ready and accepting connections"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown))
    .await?;

    Ok(())
}

/// Signal handler for graceful shutdown
///
/// Listens for Ctrl+C (SIGINT) and SIGTERM. The shared cancellation token is
/// cancelled so in-flight persists abandon their retries.
///
/// # Panics
/// Panics if the signal handlers cannot be installed (unrecoverable system error)
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping");
    shutdown.cancel();
}
