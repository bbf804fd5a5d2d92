use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels `cancelation` once the process is asked to stop, either by Ctrl+C or, on unix, by
/// SIGTERM.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C"),
                    _ = terminate.recv() => info!("Received SIGTERM"),
                }
            }
            Err(e) => {
                error!("Can't listen for SIGTERM {e:?}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Can't listen for Ctrl+C {e:?}");
            return;
        }
        info!("Received Ctrl+C");
    }
    cancelation.cancel();
}
