//! Graceful shutdown handling for the delivery server.
//!
//! Open streams register with the [`ShutdownController`] and watch its
//! signal. Once shutdown starts they close with `UNAVAILABLE`, so proxies
//! reconnect to another instance, and the controller waits for them to
//! finish within the grace period.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use xds_server::ShutdownController;
//!
//! # tokio_test_block(async {
//! let controller = ShutdownController::new();
//! let guard = controller.register_operation();
//! assert_eq!(controller.active_operations(), 1);
//! drop(guard);
//! assert!(controller.shutdown(Duration::from_millis(10)).await);
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{info, warn};

/// Controller for coordinating graceful shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownController {
    inner: Arc<ShutdownInner>,
}

#[derive(Debug)]
struct ShutdownInner {
    initiated: AtomicBool,
    tx: watch::Sender<bool>,
    active_ops: AtomicUsize,
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(ShutdownInner {
                initiated: AtomicBool::new(false),
                tx,
                active_ops: AtomicUsize::new(0),
            }),
        }
    }

    /// Whether shutdown has been initiated.
    pub fn is_shutdown(&self) -> bool {
        self.inner.initiated.load(Ordering::SeqCst)
    }

    /// A signal that fires once shutdown is initiated.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.inner.tx.subscribe(),
        }
    }

    /// Initiate shutdown and wait for registered operations to finish.
    ///
    /// Returns `false` if operations were still running when the grace
    /// period ran out. A second call returns `true` immediately.
    pub async fn shutdown(&self, grace_period: Duration) -> bool {
        if self
            .inner
            .initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return true;
        }

        info!(grace_period = ?grace_period, "initiating graceful shutdown");
        self.inner.tx.send_replace(true);

        match timeout(grace_period, self.wait_for_completion()).await {
            Ok(()) => {
                info!("graceful shutdown completed");
                true
            }
            Err(_) => {
                warn!(
                    remaining_ops = self.active_operations(),
                    "graceful shutdown timed out"
                );
                false
            }
        }
    }

    async fn wait_for_completion(&self) {
        while self.active_operations() > 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Register an operation that shutdown should wait for.
    pub fn register_operation(&self) -> OperationGuard {
        self.inner.active_ops.fetch_add(1, Ordering::SeqCst);
        OperationGuard {
            controller: self.clone(),
        }
    }

    pub fn active_operations(&self) -> usize {
        self.inner.active_ops.load(Ordering::SeqCst)
    }
}

/// Keeps an operation registered until dropped.
#[derive(Debug)]
pub struct OperationGuard {
    controller: ShutdownController,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.controller.inner.active_ops.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Receiving side of the shutdown broadcast.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Wait until shutdown is initiated.
    ///
    /// Resolves immediately if it already was, or if the controller is gone.
    pub async fn recv(&mut self) {
        let _ = self.rx.wait_for(|initiated| *initiated).await;
    }
}

/// Wait for SIGTERM or SIGINT.
///
/// If a handler cannot be installed the failure is logged and only the
/// remaining signal is awaited.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let terminate = async {
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            _ = terminate => info!("received SIGTERM"),
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("received SIGINT"),
                Err(e) => warn!(error = %e, "failed to listen for SIGINT"),
            },
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C");
    }
}
