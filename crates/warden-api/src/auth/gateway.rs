// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Login and logout orchestration.
//!
//! ```text
//! login:  input ─► CredentialValidator ─► PermissionResolver ─► JwtManager::issue
//! logout: bearer ─► decode (unverified) ─► cap expiry ─► RevocationStore::revoke
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use warden_core::{
    CredentialValidator, Fingerprint, NameSet, PermissionResolver, RevocationStore,
};

use super::error::{AuthError, AuthResult};
use super::jwt::JwtManager;
use crate::error::ValidationErrors;

// =============================================================================
// Requests / Outcomes
// =============================================================================

/// Login credentials.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Plaintext password.
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// Creates a login request.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Checks required fields and email syntax.
    pub fn validate(&self) -> AuthResult<()> {
        let mut errors = ValidationErrors::new();

        let email = self.email.trim();
        if email.is_empty() {
            errors.add("email", "Email is required");
        } else if !is_email(email) {
            errors.add("email", "Email is not a valid email address");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Validation(errors))
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    /// Signed access token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// Principal email.
    pub email: String,
    /// Role names embedded in the token.
    pub roles: NameSet,
    /// Permission names embedded in the token.
    pub permissions: NameSet,
}

/// Successful logout.
#[derive(Debug, Clone)]
pub struct LogoutOutcome {
    /// Revocation key of the token.
    pub fingerprint: Fingerprint,
    /// Expiry of the token.
    pub expires_at: DateTime<Utc>,
    /// `true` if the token had already expired and nothing was stored.
    pub already_expired: bool,
}

// =============================================================================
// AuthenticationGateway
// =============================================================================

/// Entry point for login and logout.
#[derive(Clone)]
pub struct AuthenticationGateway {
    validator: CredentialValidator,
    resolver: PermissionResolver,
    jwt: JwtManager,
    revocations: Arc<dyn RevocationStore>,
}

impl AuthenticationGateway {
    /// Creates a gateway.
    pub fn new(
        validator: CredentialValidator,
        resolver: PermissionResolver,
        jwt: JwtManager,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            validator,
            resolver,
            jwt,
            revocations,
        }
    }

    /// Authenticates credentials and issues a token.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, request: &LoginRequest) -> AuthResult<LoginOutcome> {
        request.validate()?;

        let principal = match self
            .validator
            .validate(request.email.trim(), &request.password)
            .await?
        {
            Some(principal) => principal,
            None => {
                warn!(email = %request.email.trim(), "Login failed");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let grants = self.resolver.resolve(&principal.id).await?;
        let issued = self.jwt.issue(&principal, &grants)?;

        info!(
            principal = %principal.id,
            roles = %grants.roles,
            fingerprint = %issued.claims.fingerprint(),
            "Login succeeded"
        );

        Ok(LoginOutcome {
            token: issued.token,
            expires_in: issued.expires_in,
            email: principal.email,
            roles: issued.claims.roles,
            permissions: issued.claims.permissions,
        })
    }

    /// Revokes a bearer token.
    ///
    /// The signature is not checked, so logout also works for tokens the
    /// verifier would already reject. Revoking the same token twice is a no-op.
    ///
    /// The stored expiry is capped at `now + ttl`: no token this service
    /// issued lives longer, so a forged far-future `exp` cannot pin an entry.
    pub async fn logout(&self, token: Option<&str>) -> AuthResult<LogoutOutcome> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::TokenMissing)?;

        let mut unverified = self.jwt.decode_unverified(token)?;
        let now = Utc::now();

        let latest = now + self.jwt.ttl();
        if unverified.expires_at > latest {
            warn!(
                fingerprint = %unverified.fingerprint,
                claimed = %unverified.expires_at,
                "Logout token outlives the configured lifetime; capping its revocation"
            );
            unverified.expires_at = latest;
        }

        if unverified.expires_at <= now {
            debug!(fingerprint = %unverified.fingerprint, "Logout of expired token");
            return Ok(LogoutOutcome {
                fingerprint: unverified.fingerprint,
                expires_at: unverified.expires_at,
                already_expired: true,
            });
        }

        self.revocations
            .revoke(&unverified.fingerprint, unverified.expires_at)
            .await?;

        info!(
            fingerprint = %unverified.fingerprint,
            expires_at = %unverified.expires_at,
            "Token revoked"
        );

        Ok(LogoutOutcome {
            fingerprint: unverified.fingerprint,
            expires_at: unverified.expires_at,
            already_expired: false,
        })
    }

    /// Returns the token manager.
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }
}

impl std::fmt::Debug for AuthenticationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationGateway")
            .field("validator", &self.validator)
            .field("jwt", &self.jwt)
            .field("revocations", &self.revocations.name())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
