use log::{error, info};
use std::future::{self, Future};
use tokio::{select, signal, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// Resolves on Ctrl+C (SIGINT) or, on Unix, SIGTERM.
///
/// A handler that cannot be installed is logged and never fires; the other
/// one keeps working.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    select! {
        () = ctrl_c => info!(signal = "SIGINT"; "Received shutdown signal"),
        () = terminate => info!(signal = "SIGTERM"; "Received shutdown signal"),
    }
}

/// Cancels `token` once `signal` resolves.
pub fn cancel_on<F>(signal: F, token: CancellationToken) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        select! {
            () = signal => token.cancel(),
            () = token.cancelled() => {}
        }
    })
}
