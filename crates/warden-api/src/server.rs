// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use warden_core::{CredentialStore, RevocationStore};

use crate::auth::AuthResult;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{AuthLayer, RateLimitLayer};
use crate::state::{AppState, AppStateBuilder};

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// Routes:
///
/// | Method | Path           | Auth   |
/// |--------|----------------|--------|
/// | GET    | `/health`      | public |
/// | POST   | `/auth/login`  | public, login rate limit |
/// | POST   | `/auth/logout` | public |
/// | GET    | `/auth/me`     | bearer |
///
/// Routes added with [`ApiServerBuilder::protected_routes`] sit behind the
/// authentication layer and may add their own [`RbacLayer`](crate::middleware::RbacLayer).
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
    extra_routes: Option<Router<AppState>>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self {
            state,
            config,
            extra_routes: None,
        }
    }

    /// Creates a server builder.
    pub fn builder() -> ApiServerBuilder {
        ApiServerBuilder::new()
    }

    /// Adds application routes behind the authentication layer.
    pub fn protected_routes(mut self, routes: Router<AppState>) -> Self {
        self.extra_routes = Some(match self.extra_routes.take() {
            Some(existing) => existing.merge(routes),
            None => routes,
        });
        self
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let limits = &self.config.rate_limit;
        let login_limit = RateLimitLayer::from_rule(limits.login_rule());
        let global_limit = RateLimitLayer::from_rule(limits.global_rule());
        let auth = AuthLayer::new(self.state.verifier.clone()).with_default_public_paths();

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .layer(global_limit)
            .layer(auth);

        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route("/auth/login", post(handlers::login).layer(login_limit))
            .route("/auth/logout", post(handlers::logout))
            .route("/auth/me", get(handlers::current_user));

        if let Some(extra) = &self.extra_routes {
            router = router.merge(extra.clone());
        }

        router
            .fallback(not_found)
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server until `shutdown_signal` resolves.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serves on an already bound listener until `shutdown_signal` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let router = self.router();

        match listener.local_addr() {
            Ok(addr) => info!("Starting API server on {}", addr),
            Err(_) => info!("Starting API server"),
        }

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route {}", uri.path()))
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
#[derive(Default)]
pub struct ApiServerBuilder {
    state_builder: AppStateBuilder,
    extra_routes: Vec<Router<AppState>>,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the credential store.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.state_builder = self.state_builder.credential_store(store);
        self
    }

    /// Sets the revocation store.
    pub fn revocation_store(mut self, store: Arc<dyn RevocationStore>) -> Self {
        self.state_builder = self.state_builder.revocation_store(store);
        self
    }

    /// Adds application routes behind the authentication layer.
    pub fn protected_routes(mut self, routes: Router<AppState>) -> Self {
        self.extra_routes.push(routes);
        self
    }

    /// Builds the server.
    pub fn build(self) -> AuthResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(self
            .extra_routes
            .into_iter()
            .fold(ApiServer::new(state), ApiServer::protected_routes))
    }
}

// =============================================================================
// Tests
// =============================================================================
