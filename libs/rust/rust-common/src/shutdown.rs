//! Graceful shutdown.
//!
//! Servers are spawned into a `JoinSet` and drain on their own once the
//! shared signal fires; whatever is still running after the timeout is
//! aborted.

use std::future::Future;
use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Shutdown coordinator for graceful termination
pub struct ShutdownCoordinator {
    shutdown_tx: watch::Sender<bool>,
    tasks: JoinSet<()>,
}

impl ShutdownCoordinator {
    /// Creates a new shutdown coordinator
    #[must_use]
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            shutdown_tx,
            tasks: JoinSet::new(),
        }
    }

    /// Gets a shutdown receiver
    #[must_use]
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.shutdown_tx.subscribe(),
        }
    }

    /// Spawns a tracked task. The task is expected to watch its own
    /// [`ShutdownSignal`] and return once it has drained.
    pub fn spawn<F>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(async move {
            future.await;
            info!(task = name, "task finished");
        });
    }

    /// Fires the shutdown signal without waiting.
    pub fn trigger(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Resolves when any tracked task exits on its own.
    pub async fn wait_any(&mut self) {
        match self.tasks.join_next().await {
            Some(Err(e)) => error!(error = %e, "task panicked or was cancelled"),
            Some(Ok(())) => warn!("task exited before shutdown was requested"),
            None => std::future::pending::<()>().await,
        }
    }

    /// Signals shutdown and waits for tracked tasks.
    ///
    /// Returns `false` when the timeout elapsed and tasks were aborted.
    pub async fn shutdown(mut self, timeout: Duration) -> bool {
        info!(timeout = ?timeout, "initiating graceful shutdown");
        self.trigger();

        let drained = tokio::time::timeout(timeout, async {
            while let Some(result) = self.tasks.join_next().await {
                if let Err(e) = result {
                    warn!(error = %e, "task failed during shutdown");
                }
            }
        })
        .await;

        match drained {
            Ok(()) => {
                info!("all tasks completed gracefully");
                true
            }
            Err(_) => {
                warn!(
                    remaining = self.tasks.len(),
                    "shutdown timeout reached, aborting remaining tasks"
                );
                self.tasks.abort_all();
                false
            }
        }
    }

    /// Returns the number of active tasks
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Shutdown signal receiver
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Waits for the shutdown signal. Returns immediately if it already fired.
    pub async fn recv(mut self) {
        // Err means the coordinator is gone, which is a shutdown too.
        let _ = self.receiver.wait_for(|fired| *fired).await;
    }

    /// Checks if shutdown has been signaled (non-blocking)
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Waits for SIGTERM or SIGINT.
///
/// If a handler cannot be installed the error is logged and that branch
/// never resolves.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, initiating shutdown"),
        () = terminate => info!("received SIGTERM, initiating shutdown"),
    }
}
