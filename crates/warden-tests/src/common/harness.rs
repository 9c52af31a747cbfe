// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Builds the full API router over the fixture directory and drives it
//! in-process with `tower::ServiceExt::oneshot`. No socket is bound.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use warden_api::middleware::RateLimitConfig;
use warden_api::{ApiConfig, ApiServer, AppState, JwtManager, TokenClaims};
use warden_core::{InMemoryCredentialStore, InMemoryRevocationStore};

use super::fixtures::{ApiFixtures, DirectoryFixtures};

// =============================================================================
// TestResponse
// =============================================================================

/// A collected response.
#[derive(Debug, Clone)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// JSON body, or `Value::Null` when the body is empty or not JSON.
    pub body: Value,
}

impl TestResponse {
    /// The `message` field of the body.
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    /// The `code` field of an error body.
    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }

    /// A header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

// =============================================================================
// TestApp
// =============================================================================

/// The API router plus handles to its stores.
pub struct TestApp {
    router: Router,
    state: AppState,
    credentials: Arc<InMemoryCredentialStore>,
    revocations: Arc<InMemoryRevocationStore>,
}

impl TestApp {
    /// The seeded directory with default fixture configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder.
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    /// Sends a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router should be infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends a request as if it arrived on a socket from `peer`.
    pub async fn send_from(&self, peer: SocketAddr, mut request: Request<Body>) -> TestResponse {
        request.extensions_mut().insert(ConnectInfo(peer));
        self.send(request).await
    }

    /// `GET uri`, optionally with a bearer token.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token, Body::empty())).await
    }

    /// `POST uri` with a JSON body, optionally with a bearer token.
    pub async fn post_json(&self, uri: &str, body: &Value, token: Option<&str>) -> TestResponse {
        let mut req = request(Method::POST, uri, token, Body::from(body.to_string()));
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.send(req).await
    }

    /// `POST /auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({ "email": email, "password": password });
        self.post_json("/auth/login", &body, None).await
    }

    /// Logs in and returns the access token, panicking on failure.
    pub async fn login_token(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "login as {} failed: {}",
            email,
            response.body
        );
        response.body["accessToken"]
            .as_str()
            .expect("login response without accessToken")
            .to_string()
    }

    /// `POST /auth/logout`.
    pub async fn logout(&self, token: Option<&str>) -> TestResponse {
        self.send(request(Method::POST, "/auth/logout", token, Body::empty()))
            .await
    }

    /// Signs arbitrary claims with the server's key.
    pub fn sign(&self, claims: &TokenClaims) -> String {
        self.jwt().sign(claims).expect("Failed to sign claims")
    }

    /// The server's token manager.
    pub fn jwt(&self) -> &JwtManager {
        self.state.gateway().jwt()
    }

    /// Shared application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The credential directory behind the server.
    pub fn credentials(&self) -> &InMemoryCredentialStore {
        &self.credentials
    }

    /// The revocation store behind the server.
    pub fn revocations(&self) -> &InMemoryRevocationStore {
        &self.revocations
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(body).expect("Failed to build request")
}

// =============================================================================
// TestAppBuilder
// =============================================================================

/// Builder for [`TestApp`].
#[derive(Default)]
pub struct TestAppBuilder {
    config: Option<ApiConfig>,
    credentials: Option<InMemoryCredentialStore>,
    routes: Vec<Router<AppState>>,
}

impl TestAppBuilder {
    /// Replaces the API configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the rate limits on the fixture configuration.
    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        let config = self.config.take().unwrap_or_else(ApiFixtures::config);
        self.config = Some(config.with_rate_limit(rate_limit));
        self
    }

    /// Replaces the credential directory.
    pub fn credentials(mut self, store: InMemoryCredentialStore) -> Self {
        self.credentials = Some(store);
        self
    }

    /// Mounts additional authenticated routes.
    pub fn protected_routes(mut self, routes: Router<AppState>) -> Self {
        self.routes.push(routes);
        self
    }

    /// Builds the app.
    pub fn build(self) -> TestApp {
        let credentials = Arc::new(self.credentials.unwrap_or_else(DirectoryFixtures::seeded));
        let revocations = Arc::new(InMemoryRevocationStore::new());

        let server = self
            .routes
            .into_iter()
            .fold(
                ApiServer::builder()
                    .config(self.config.unwrap_or_else(ApiFixtures::config))
                    .credential_store(credentials.clone())
                    .revocation_store(revocations.clone()),
                |builder, routes| builder.protected_routes(routes),
            )
            .build()
            .expect("Failed to build API server");

        TestApp {
            router: server.router(),
            state: server.state().clone(),
            credentials,
            revocations,
        }
    }
}
