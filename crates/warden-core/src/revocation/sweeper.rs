// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Periodic purge of expired revocations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::RevocationStore;

/// Default sweep interval.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// =============================================================================
// RevocationSweeper
// =============================================================================

/// Background task that calls [`RevocationStore::purge_expired`] on an
/// interval.
///
/// Lazy reclamation on lookup only touches entries that are looked up again.
/// The sweeper reclaims the rest, which keeps memory bounded when most
/// revoked tokens are never presented again.
pub struct RevocationSweeper {
    store: Arc<dyn RevocationStore>,
    interval: Duration,
    shutdown: Arc<Notify>,
    running: Arc<AtomicBool>,
}

impl RevocationSweeper {
    /// Creates a sweeper with the default interval.
    pub fn new(store: Arc<dyn RevocationStore>) -> Self {
        Self {
            store,
            interval: DEFAULT_SWEEP_INTERVAL,
            shutdown: Arc::new(Notify::new()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the sweep interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Returns `true` while the sweep loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawns the sweep loop.
    pub fn start(&self) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);

        let store = self.store.clone();
        let period = self.interval;
        let shutdown = self.shutdown.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            info!(
                store = store.name(),
                interval_secs = period.as_secs_f64(),
                "Revocation sweeper started"
            );

            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match store.purge_expired().await {
                            Ok(0) => {}
                            Ok(removed) => debug!(removed, "Purged expired revocations"),
                            Err(e) => warn!(error = %e, "Revocation purge failed"),
                        }
                    }
                    _ = shutdown.notified() => break,
                }
            }

            running.store(false, Ordering::SeqCst);
            info!("Revocation sweeper stopped");
        })
    }

    /// Signals the sweep loop to stop.
    ///
    /// Safe to call before the loop has reached its first wait.
    pub fn stop(&self) {
        self.shutdown.notify_one();
    }
}

impl std::fmt::Debug for RevocationSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationSweeper")
            .field("store", &self.store.name())
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
