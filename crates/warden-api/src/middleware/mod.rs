// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware for the API server.
//!
//! - [`AuthLayer`]: bearer token authentication
//! - [`RbacLayer`]: permission checks against the token's grants
//! - [`RateLimitLayer`]: per-client fixed window limits

mod auth;
mod rate_limit;
mod rbac;

pub use auth::{AuthLayer, AuthMiddleware, DEFAULT_PUBLIC_PATHS};
pub use rate_limit::{
    RateLimitConfig, RateLimitLayer, RateLimitMiddleware, RateLimitResult, RateLimiterState,
    WindowRule,
};
pub use rbac::{RbacLayer, RbacMiddleware};
