// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown.
//!
//! A single `watch` flag flips from `false` to `true` exactly once, either
//! on SIGTERM/SIGINT or when [`ShutdownCoordinator::initiate_shutdown`] is
//! called. Late subscribers observe the current value, so a signal taken
//! after shutdown began resolves immediately.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// Shared handle that owns the shutdown flag.
///
/// ```ignore
/// let coordinator = ShutdownCoordinator::new();
/// let signal = coordinator.shutdown_signal();
/// tokio::spawn({
///     let coordinator = coordinator.clone();
///     async move { coordinator.wait_for_shutdown().await }
/// });
/// server.run_with_shutdown(signal.wait()).await?;
/// ```
#[derive(Clone)]
pub struct ShutdownCoordinator {
    flag: Arc<watch::Sender<bool>>,
}

impl ShutdownCoordinator {
    /// Creates a coordinator with the flag lowered.
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag: Arc::new(flag),
        }
    }

    /// Raw receiver; the value is `true` once shutdown has begun.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }

    /// Future-style handle for `with_graceful_shutdown`.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.flag.subscribe(),
        }
    }

    /// Flips the flag. Only the first call logs and notifies.
    pub fn initiate_shutdown(&self) {
        let flipped = self.flag.send_if_modified(|started| {
            if *started {
                false
            } else {
                *started = true;
                true
            }
        });
        if flipped {
            info!("Shutdown initiated");
        }
    }

    /// Whether the flag has been raised.
    pub fn is_shutdown_initiated(&self) -> bool {
        *self.flag.borrow()
    }

    /// Resolves on an OS signal or on manual initiation, whichever is first.
    pub async fn wait_for_shutdown(&self) {
        let signal = self.shutdown_signal();
        tokio::select! {
            _ = os_signal() => self.initiate_shutdown(),
            _ = signal.wait() => {}
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn os_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let terminate = signal(SignalKind::terminate());
    let interrupt = signal(SignalKind::interrupt());
    match (terminate, interrupt) {
        (Ok(mut term), Ok(mut int)) => {
            tokio::select! {
                _ = term.recv() => info!("Received SIGTERM"),
                _ = int.recv() => info!("Received SIGINT"),
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "Signal handlers unavailable, listening for Ctrl+C only");
            ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn os_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl+C listener failed");
        // Without any signal source only manual initiation can stop us.
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C");
}

// =============================================================================
// ShutdownSignal
// =============================================================================

/// One-shot wait for the shutdown flag.
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolves once the flag is raised.
    pub async fn wait(mut self) {
        // An Err means every coordinator was dropped; nothing can flip the
        // flag any more, so treat it as shutdown.
        let _ = self.receiver.wait_for(|started| *started).await;
    }
}

// =============================================================================
// Tests
// =============================================================================
