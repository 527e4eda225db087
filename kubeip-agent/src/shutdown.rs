//! Shutdown signal handling

use std::io;

use tokio::sync::watch;
use tracing::info;

/// Install the OS signal handlers and spawn their listener.
///
/// The returned receiver flips to `true` on Ctrl+C or SIGTERM. Handler
/// installation errors are returned before anything is spawned.
#[cfg(unix)]
pub fn signal_channel() -> io::Result<watch::Receiver<bool>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => {
                info!("Received Ctrl+C, initiating shutdown");
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, initiating shutdown");
            }
        }

        let _ = shutdown_tx.send(true);
    });

    Ok(shutdown_rx)
}

/// Install the Ctrl+C handler and spawn its listener.
#[cfg(windows)]
pub fn signal_channel() -> io::Result<watch::Receiver<bool>> {
    let mut ctrl_c = tokio::signal::windows::ctrl_c()?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        ctrl_c.recv().await;
        info!("Received Ctrl+C, initiating shutdown");
        let _ = shutdown_tx.send(true);
    });

    Ok(shutdown_rx)
}

/// Wait until shutdown is requested or the sender goes away
pub async fn wait(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            break;
        }
    }
}
