// Signal handling module
//
// Supported signals:
// - SIGINT:  Stop accepting connections (Ctrl+C)
// - SIGTERM: Stop accepting connections (Unix only)

use crate::logger;

/// Resolve once the process is asked to stop.
///
/// If a handler cannot be registered the corresponding signal is ignored and
/// the server keeps running.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => Some(s),
        Err(e) => {
            logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            None
        }
    };

    let terminate = async {
        match sigterm.as_mut() {
            Some(s) => {
                s.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        () = ctrl_c() => logger::log_shutdown("SIGINT received"),
        () = terminate => logger::log_shutdown("SIGTERM received"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await;
    logger::log_shutdown("Ctrl+C received");
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_warning(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
}
