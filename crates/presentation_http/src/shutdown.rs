//! Graceful shutdown: signal handling and a bounded connection drain

use std::time::Duration;

use tokio::{
    signal,
    task::{JoinError, JoinHandle},
};
use tracing::{info, warn};

/// Wait for Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Give a server task `timeout` to finish its in-flight requests
///
/// Returns `None` and aborts the task when the deadline passes first.
pub async fn drain_within<T>(
    server: &mut JoinHandle<T>,
    timeout: Duration,
) -> Option<Result<T, JoinError>> {
    info!(timeout = ?timeout, "Draining open connections");
    if let Ok(joined) = tokio::time::timeout(timeout, &mut *server).await {
        Some(joined)
    } else {
        warn!(timeout = ?timeout, "Connections still open after shutdown timeout, aborting");
        server.abort();
        None
    }
}
