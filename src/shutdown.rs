use std::future::Future;

use async_shutdown::{ShutdownManager, ShutdownSignal};
use tokio::signal;
use tracing::info;

/// Cancels the drain decision on Ctrl+C or SIGTERM.
#[derive(Clone)]
pub struct Shutdown {
    shutdown: ShutdownManager<()>,
}

impl Shutdown {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Shutdown {
        Self::new_with_signal(shutdown_signal())
    }

    pub fn new_with_signal<F>(signal: F) -> Shutdown
    where
        F: Future + Send + 'static,
    {
        let shutdown = ShutdownManager::new();

        tokio::spawn({
            let shutdown = shutdown.clone();
            async move {
                signal.await;

                info!("Shutdown start");
                _ = shutdown.trigger_shutdown(());
            }
        });

        Shutdown { shutdown }
    }

    pub fn is_shutdown_triggered(&self) -> bool {
        self.shutdown.is_shutdown_triggered()
    }

    pub fn wait_shutdown_triggered(&self) -> ShutdownSignal<()> {
        self.shutdown.wait_shutdown_triggered()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    {
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut terminate) => {
                    terminate.recv().await;
                }
                Err(err) => {
                    tracing::error!(%err, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        };
    }
}
