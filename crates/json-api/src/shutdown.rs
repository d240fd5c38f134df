//! Graceful shutdown signal handling

use std::io;

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
#[error("failed to install {handler} signal handler")]
pub(crate) struct SignalHandlerError {
    handler: &'static str,
    #[source]
    source: io::Error,
}

/// Block until an interrupt or terminate signal arrives, then ask the
/// server to stop gracefully.
pub(crate) async fn listen(handle: ServerHandle) -> Result<(), SignalHandlerError> {
    wait_for_signal().await?;

    info!("shutdown signal received");

    handle.stop_graceful(None);

    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<(), SignalHandlerError> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).map_err(
        |source| SignalHandlerError {
            handler: "SIGTERM",
            source,
        },
    )?;

    tokio::select! {
        result = signal::ctrl_c() => {
            result.map_err(|source| SignalHandlerError {
                handler: "Ctrl+C",
                source,
            })?;
        }
        _ = sigterm.recv() => {}
    }

    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<(), SignalHandlerError> {
    signal::ctrl_c().await.map_err(|source| SignalHandlerError {
        handler: "Ctrl+C",
        source,
    })
}
