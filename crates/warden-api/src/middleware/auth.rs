// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token authentication middleware.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::{AuthContext, AuthError, TokenVerifier, VerificationError};
use crate::error::ApiError;
use crate::extractors::{bearer_token, client_ip};

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for bearer token authentication.
///
/// Every request outside the public paths must carry a token that passes
/// [`TokenVerifier`]. On success an [`AuthContext`] is inserted into the
/// request extensions.
#[derive(Clone)]
pub struct AuthLayer {
    verifier: Arc<TokenVerifier>,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self {
            verifier,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Sets paths that don't require authentication.
    ///
    /// A trailing `*` matches any suffix.
    pub fn with_public_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_paths = Arc::new(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Uses the default public paths: health, login, and logout.
    pub fn with_default_public_paths(self) -> Self {
        self.with_public_paths(DEFAULT_PUBLIC_PATHS.iter().copied())
    }
}

/// Paths reachable without a token.
///
/// Logout is public so that revoking an already rejected token still
/// succeeds.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &["/health", "/auth/login", "/auth/logout"];

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            verifier: self.verifier.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for bearer token authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    verifier: Arc<TokenVerifier>,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        self.public_paths.iter().any(|public| {
            public
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let verifier = self.verifier.clone();
        let is_public = self.is_public_path(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if is_public {
                return inner.call(req).await;
            }

            let Some(token) = bearer_token(req.headers()) else {
                tracing::debug!(path = %req.uri().path(), "No bearer token provided");
                return Ok(ApiError::unauthorized("Authentication required").into_response());
            };

            let claims = match verifier.verify(&token).await {
                Ok(claims) => claims,
                Err(e) => return Ok(rejection(e).into_response()),
            };

            let ctx = AuthContext::from_claims(&claims)
                .with_client_ip(client_ip(req.headers(), req.extensions()))
                .with_request_id(Uuid::now_v7());

            tracing::debug!(
                principal = %ctx.principal_id,
                request_id = %ctx.request_id,
                "Request authenticated"
            );

            req.extensions_mut().insert(ctx);
            inner.call(req).await
        })
    }
}

/// Maps a verification failure to its public response.
fn rejection(err: VerificationError) -> ApiError {
    if err.is_integrity_failure() {
        tracing::warn!(error = %err, "Token failed integrity checks");
    } else {
        tracing::debug!(error = %err, "Token rejected");
    }
    ApiError::from(AuthError::from(err))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, JwtManager, TokenClaims};
    use crate::error::TOKEN_REJECTED_MESSAGE;
    use axum::http::{header, StatusCode};
    use chrono::{Duration, Utc};
    use std::convert::Infallible;
    use tower::ServiceExt;
    use warden_core::{Grants, InMemoryRevocationStore, Principal, PrincipalId, RevocationStore};

    struct Fixture {
        jwt: JwtManager,
        revocations: Arc<InMemoryRevocationStore>,
        layer: AuthLayer,
    }

    fn fixture() -> Fixture {
        let jwt = JwtManager::new(JwtConfig::new(
            "test-secret-key-that-is-long-enough-for-testing",
            "warden",
            "warden-clients",
            60,
        ))
        .unwrap();
        let revocations = Arc::new(InMemoryRevocationStore::new());
        let verifier = Arc::new(TokenVerifier::new(jwt.clone(), revocations.clone()));
        Fixture {
            jwt,
            revocations,
            layer: AuthLayer::new(verifier).with_default_public_paths(),
        }
    }

    fn claims() -> TokenClaims {
        TokenClaims::for_principal(
            &Principal::new(PrincipalId::new("p-1"), "admin@company.com", "hash"),
            &Grants::new(
                ["Admin"].into_iter().collect(),
                ["Read"].into_iter().collect(),
            ),
            "warden",
            "warden-clients",
            Duration::minutes(5),
            Utc::now(),
        )
    }

    /// Answers 200 if an AuthContext reached the handler, 204 otherwise.
    async fn echo(req: Request<Body>) -> Result<Response, Infallible> {
        let status = match req.extensions().get::<AuthContext>() {
            Some(_) => StatusCode::OK,
            None => StatusCode::NO_CONTENT,
        };
        Ok(status.into_response())
    }

    fn request(path: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn message(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        json["message"].as_str().unwrap_or_default().to_string()
    }

    #[test]
    fn test_public_paths() {
        let f = fixture();
        let layer = f.layer.with_public_paths(["/health", "/docs/*"]);
        let middleware = layer.layer(tower::service_fn(echo));

        assert!(middleware.is_public_path("/health"));
        assert!(middleware.is_public_path("/docs/index.html"));
        assert!(!middleware.is_public_path("/auth/me"));
    }

    #[tokio::test]
    async fn test_public_path_skips_verification() {
        let f = fixture();
        let response = f
            .layer
            .layer(tower::service_fn(echo))
            .oneshot(request("/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let f = fixture();
        let response = f
            .layer
            .layer(tower::service_fn(echo))
            .oneshot(request("/auth/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(message(response).await, "Authentication required");
    }

    #[tokio::test]
    async fn test_valid_token_inserts_context() {
        let f = fixture();
        let token = f.jwt.sign(&claims()).unwrap();
        let response = f
            .layer
            .layer(tower::service_fn(echo))
            .oneshot(request("/auth/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_revoked_token_rejected() {
        let f = fixture();
        let claims = claims();
        let token = f.jwt.sign(&claims).unwrap();
        f.revocations
            .revoke(&claims.fingerprint(), claims.expires_at())
            .await
            .unwrap();

        let response = f
            .layer
            .layer(tower::service_fn(echo))
            .oneshot(request("/auth/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(message(response).await, TOKEN_REJECTED_MESSAGE);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let f = fixture();
        let response = f
            .layer
            .layer(tower::service_fn(echo))
            .oneshot(request("/auth/me", Some("not.a.jwt")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(message(response).await, "Invalid token");
    }
}
