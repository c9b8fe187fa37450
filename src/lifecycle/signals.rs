//! OS signal handling.

/// Wait for the interrupt signal (Ctrl+C).
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        // Without a signal handler the task would return immediately and
        // stop the server; park instead.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
