// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.
//!
//! Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::NameSet;

use crate::auth::{AuthContext, LoginOutcome};

// =============================================================================
// Auth Responses
// =============================================================================

/// Successful login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Signed bearer token.
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// The authenticated principal.
    pub user: UserSummary,
}

/// Principal summary embedded in the login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    /// Email address.
    pub email: String,
    /// Role names.
    pub roles: NameSet,
    /// Permission names.
    pub permissions: NameSet,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            access_token: outcome.token,
            expires_in: outcome.expires_in,
            user: UserSummary {
                email: outcome.email,
                roles: outcome.roles,
                permissions: outcome.permissions,
            },
        }
    }
}

/// Response for `/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// Principal ID.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Role names from the token.
    pub roles: NameSet,
    /// Permission names from the token.
    pub permissions: NameSet,
    /// When the presented token was issued.
    pub issued_at: DateTime<Utc>,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

impl From<AuthContext> for MeResponse {
    fn from(ctx: AuthContext) -> Self {
        Self {
            id: ctx.principal_id.to_string(),
            email: ctx.email,
            roles: ctx.roles,
            permissions: ctx.permissions,
            issued_at: ctx.issued_at,
            expires_at: ctx.expires_at,
        }
    }
}

/// A bare message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Health Response
// =============================================================================

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
    /// Response time.
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            version: crate::VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
