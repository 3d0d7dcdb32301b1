//! OS signal handling.
//!
//! Ctrl+C (SIGINT) triggers graceful shutdown of the binaries.

use crate::lifecycle::Shutdown;

/// Trigger `shutdown` when Ctrl+C is received.
///
/// If the handler cannot be installed the process keeps running until killed.
pub async fn trigger_on_ctrl_c(shutdown: Shutdown) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
}
