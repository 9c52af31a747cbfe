// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission gate.

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

use crate::auth::{AuthContext, AuthError};
use crate::error::ApiError;

// =============================================================================
// RbacLayer
// =============================================================================

/// Layer checking the permissions carried by the authenticated token.
///
/// Must sit inside [`AuthLayer`](super::AuthLayer). Permissions come from
/// the token snapshot, not from the credential store.
#[derive(Clone)]
pub struct RbacLayer {
    required_permissions: Arc<Vec<String>>,
    require_all: bool,
}

impl RbacLayer {
    /// Creates a layer requiring a single permission.
    pub fn require(permission: impl Into<String>) -> Self {
        Self {
            required_permissions: Arc::new(vec![permission.into()]),
            require_all: true,
        }
    }

    /// Creates a layer requiring all specified permissions.
    pub fn require_all<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_permissions: Arc::new(permissions.into_iter().map(Into::into).collect()),
            require_all: true,
        }
    }

    /// Creates a layer requiring any of the specified permissions.
    pub fn require_any<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_permissions: Arc::new(permissions.into_iter().map(Into::into).collect()),
            require_all: false,
        }
    }

    /// Returns the first required permission `ctx` lacks, if access is denied.
    fn check(&self, ctx: &AuthContext) -> Result<(), AuthError> {
        let required = self.required_permissions.as_slice();
        let granted = if self.require_all {
            ctx.has_all_permissions(required)
        } else {
            ctx.has_any_permission(required)
        };

        if granted {
            return Ok(());
        }

        let missing = required
            .iter()
            .find(|p| !ctx.has_permission(p))
            .cloned()
            .unwrap_or_default();
        Err(AuthError::PermissionDenied { permission: missing })
    }
}

impl<S> Layer<S> for RbacLayer {
    type Service = RbacMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RbacMiddleware {
            inner,
            policy: self.clone(),
        }
    }
}

// =============================================================================
// RbacMiddleware
// =============================================================================

/// Middleware for permission enforcement.
#[derive(Clone)]
pub struct RbacMiddleware<S> {
    inner: S,
    policy: RbacLayer,
}

impl<S> Service<Request<Body>> for RbacMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let policy = self.policy.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(ctx) = req.extensions().get::<AuthContext>().cloned() else {
                tracing::warn!(path = %req.uri().path(), "No auth context found, denying access");
                return Ok(ApiError::unauthorized("Authentication required").into_response());
            };

            match policy.check(&ctx) {
                Ok(()) => inner.call(req).await,
                Err(denied) => {
                    tracing::warn!(
                        principal = %ctx.principal_id,
                        required = ?policy.required_permissions.as_slice(),
                        roles = %ctx.roles,
                        error = %denied,
                        "Permission denied"
                    );
                    Ok(ApiError::from(denied).into_response())
                }
            }
        })
    }
}

/// Builds an [`RbacLayer`] from permission names.
///
/// ```rust,ignore
/// require_permission!("Members.Read");
/// require_permission!(all: "Members.Read", "Members.Write");
/// require_permission!(any: "Admin", "Members.Delete");
/// ```
#[macro_export]
macro_rules! require_permission {
    (all: $($perm:expr),+ $(,)?) => {
        $crate::middleware::RbacLayer::require_all([$($perm),+])
    };
    (any: $($perm:expr),+ $(,)?) => {
        $crate::middleware::RbacLayer::require_any([$($perm),+])
    };
    ($perm:expr) => {
        $crate::middleware::RbacLayer::require($perm)
    };
}

// =============================================================================
// Tests
// =============================================================================
