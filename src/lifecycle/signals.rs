//! OS signal handling.

/// Resolve when the process receives Ctrl+C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => tracing::error!(error = %err, "Failed to install Ctrl+C handler"),
    }
}
