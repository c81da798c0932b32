use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::task::JoinHandle;

const REQUEST_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Spawns a task that listens for SIGINT and SIGTERM and sends a shutdown signal via a watch.
///
/// Returns the join handle, the sender (for programmatic shutdown), and the receiver.
pub fn graceful_shutdown_blocker(
) -> std::io::Result<(JoinHandle<()>, watch::Sender<()>, watch::Receiver<()>)> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let (tx, rx) = tokio::sync::watch::channel(());
    let signal_tx = tx.clone();
    let mut programmatic_rx = rx.clone();

    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::debug!("gracefully exiting immediately on SIGINT");
            }
            _ = sigterm.recv() => {
                tokio::time::sleep(REQUEST_GRACE_PERIOD).await;
                tracing::debug!("initiating graceful shutdown with delay on SIGTERM");
            }
            _ = programmatic_rx.changed() => {
                tracing::debug!("shutdown requested");
            }
        }

        // Signal every service that cares about gracefully shutting down.
        let _ = signal_tx.send(());
    });

    Ok((handle, tx, rx))
}

/// Registers a panic hook that logs panics using the `tracing` crate
pub fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => {
            tracing::error!(
                message = %panic,
                panic.file = loc.file(),
                panic.line = loc.line(),
                panic.column = loc.column(),
            );
        }
        None => tracing::error!(message = %panic),
    }));
}

pub fn report_build_info() {
    let build = common::build_info!();

    tracing::info!(
        name = build.name,
        version = build.version,
        build_profile = build.profile,
        repo_version = ?build.repo_version,
        build_timestamp = ?build.build_timestamp,
        "service starting up"
    );
}
