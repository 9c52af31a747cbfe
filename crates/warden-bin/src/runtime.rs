// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Startup order:
//!
//! 1. Map the validated [`WardenConfig`] onto an [`ApiConfig`]
//! 2. Seed the in-memory credential store from the directory section
//! 3. Start the revocation sweeper
//! 4. Serve HTTP until shutdown is signaled
//! 5. Stop the sweeper

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use warden_api::middleware::{RateLimitConfig, WindowRule};
use warden_api::{ApiConfig, ApiServer, JwtConfig};
use warden_config::{ConfigLoader, WardenConfig};
use warden_core::{InMemoryRevocationStore, RevocationStore, RevocationSweeper};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

/// How long to wait for the sweeper task after the server has stopped.
const SWEEPER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// WardenRuntime
// =============================================================================

/// The service runtime.
pub struct WardenRuntime {
    config: Arc<WardenConfig>,
    port_override: Option<u16>,
    shutdown: ShutdownCoordinator,
}

impl WardenRuntime {
    /// Creates a runtime from a validated configuration.
    pub fn new(config: WardenConfig) -> Self {
        Self {
            config: Arc::new(config),
            port_override: None,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown_handle(&self) -> ShutdownCoordinator {
        self.shutdown.clone()
    }

    /// Runs the service until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting warden v{}", warden_api::VERSION);

        let mut api = api_config(&self.config)?;
        if let Some(port) = self.port_override {
            api = api.with_port(port);
        }
        let sweep_interval = api.sweep_interval;

        let credentials = self.config.directory.to_store()?;
        info!(
            principals = credentials.principal_count(),
            roles = credentials.role_count(),
            "Credential directory loaded"
        );
        if credentials.principal_count() == 0 {
            warn!("No principals configured; every login will be rejected");
        }

        let revocations: Arc<dyn RevocationStore> = Arc::new(InMemoryRevocationStore::new());

        let server = ApiServer::builder()
            .config(api)
            .credential_store(Arc::new(credentials))
            .revocation_store(revocations.clone())
            .build()?;

        let sweeper = RevocationSweeper::new(revocations).with_interval(sweep_interval);
        let sweeper_task = sweeper.start();

        let signal = self.shutdown.shutdown_signal();
        let watcher = {
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move { shutdown.wait_for_shutdown().await })
        };

        let result = server.run_with_shutdown(signal.wait()).await;

        watcher.abort();
        sweeper.stop();
        if tokio::time::timeout(SWEEPER_STOP_TIMEOUT, sweeper_task)
            .await
            .is_err()
        {
            warn!("Revocation sweeper did not stop in time");
        }

        info!("warden shutdown complete");

        result.map_err(BinError::from)
    }
}

/// Maps the file configuration onto the API server configuration.
pub fn api_config(config: &WardenConfig) -> BinResult<ApiConfig> {
    let jwt = config.jwt.resolve()?;

    let limits = &config.rate_limit;
    let rate_limit = if limits.enabled {
        RateLimitConfig {
            enabled: true,
            login: WindowRule::new(
                limits.login_permits,
                Duration::from_secs(limits.login_window_secs),
            ),
            global: WindowRule::new(
                limits.global_permits,
                Duration::from_secs(limits.global_window_secs),
            ),
        }
    } else {
        RateLimitConfig::disabled()
    };

    Ok(ApiConfig::new(JwtConfig::new(
        jwt.secret,
        jwt.issuer,
        jwt.audience,
        jwt.expiry_minutes,
    ))
    .with_host(config.server.host)
    .with_port(config.server.port)
    .with_rate_limit(rate_limit)
    .with_password(config.password)
    .with_request_timeout(Duration::from_secs(config.server.request_timeout_secs))
    .with_sweep_interval(Duration::from_secs(config.revocation.sweep_interval_secs)))
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<WardenConfig>,
    port: Option<u16>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly. It is validated on build.
    pub fn config(mut self, config: WardenConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the listen port. `0` binds an ephemeral port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<WardenRuntime> {
        let config = match self.config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::invalid_config("No configuration provided"))?;
                ConfigLoader::new().load(&path)?
            }
        };

        let mut runtime = WardenRuntime::new(config);
        runtime.port_override = self.port;
        Ok(runtime)
    }
}

// =============================================================================
// Tests
// =============================================================================
