// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication error taxonomy.
//!
//! ```text
//! AuthError
//! ├── InvalidCredentials  login failed (unknown email or wrong password)
//! ├── TokenMissing        no bearer token supplied
//! ├── TokenMalformed      not a token, bad signature, wrong issuer/audience
//! ├── TokenExpired        past `exp`
//! ├── TokenRevoked        logged out
//! ├── PermissionDenied    authenticated, lacks a permission
//! ├── Validation          request body rejected
//! ├── Configuration       fatal at startup
//! └── Internal            store or worker failure
//! ```
//!
//! `code()` keeps every kind distinct for logs. `public_message()` is what
//! clients see; expired and revoked tokens share one message.

use thiserror::Error;
use warden_core::CoreError;

use crate::error::{ValidationErrors, TOKEN_REJECTED_MESSAGE};

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

// =============================================================================
// AuthError
// =============================================================================

/// Authentication and authorization failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately carries no detail.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token was supplied.
    #[error("Token missing")]
    TokenMissing,

    /// The token could not be trusted.
    #[error("Malformed token: {reason}")]
    TokenMalformed {
        /// Diagnostic reason, for logs only.
        reason: String,
    },

    /// The token is past its expiry.
    #[error("Token expired")]
    TokenExpired,

    /// The token was revoked by logout.
    #[error("Token revoked")]
    TokenRevoked,

    /// The caller lacks a required permission.
    #[error("Permission denied: {permission}")]
    PermissionDenied {
        /// The missing permission.
        permission: String,
    },

    /// The request failed input validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A dependency failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Creates a malformed token error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::TokenMalformed {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns the internal error code. Distinct for every kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::TokenMissing => "TOKEN_MISSING",
            Self::TokenMalformed { .. } => "TOKEN_MALFORMED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::Validation(_) => "VALIDATION",
            Self::Configuration(_) => "CONFIGURATION",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Returns the message shown to clients.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid email or password",
            Self::TokenMissing => "No token provided",
            Self::TokenMalformed { .. } => "Invalid token",
            Self::TokenExpired | Self::TokenRevoked => TOKEN_REJECTED_MESSAGE,
            Self::PermissionDenied { .. } => "Insufficient permissions",
            Self::Validation(_) => "Validation failed",
            Self::Configuration(_) | Self::Internal(_) => "An unexpected error occurred",
        }
    }
}

impl From<CoreError> for AuthError {
    fn from(err: CoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<VerificationError> for AuthError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::Expired => Self::TokenExpired,
            VerificationError::Revoked => Self::TokenRevoked,
            VerificationError::Store(e) => Self::Internal(e.to_string()),
            other => Self::malformed(other.to_string()),
        }
    }
}

// =============================================================================
// VerificationError
// =============================================================================

/// Why a bearer token failed verification.
///
/// Checks run in a fixed order and stop at the first failure, so a token
/// with a bad signature never reaches the revocation lookup.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Not a structurally valid token.
    #[error("malformed: {0}")]
    Malformed(String),

    /// Signature does not match.
    #[error("signature mismatch")]
    SignatureMismatch,

    /// Issuer claim does not match.
    #[error("issuer mismatch")]
    IssuerMismatch,

    /// Audience claim does not match.
    #[error("audience mismatch")]
    AudienceMismatch,

    /// Token is past its expiry.
    #[error("expired")]
    Expired,

    /// Token was revoked.
    #[error("revoked")]
    Revoked,

    /// The revocation store could not be consulted.
    #[error("revocation store unavailable: {0}")]
    Store(#[from] CoreError),
}

impl VerificationError {
    /// Returns `true` for failures that mean the token itself is untrustworthy.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::Malformed(_)
                | Self::SignatureMismatch
                | Self::IssuerMismatch
                | Self::AudienceMismatch
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            AuthError::InvalidCredentials,
            AuthError::TokenMissing,
            AuthError::malformed("x"),
            AuthError::TokenExpired,
            AuthError::TokenRevoked,
            AuthError::PermissionDenied { permission: "p".into() },
            AuthError::Validation(ValidationErrors::new()),
            AuthError::configuration("x"),
            AuthError::Internal("x".into()),
        ];
        let mut codes: Vec<_> = errors.iter().map(AuthError::code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_expired_and_revoked_share_public_message() {
        assert_eq!(
            AuthError::TokenExpired.public_message(),
            AuthError::TokenRevoked.public_message()
        );
        assert_ne!(AuthError::TokenExpired.code(), AuthError::TokenRevoked.code());
    }

    #[test]
    fn test_verification_error_mapping() {
        assert!(matches!(
            AuthError::from(VerificationError::SignatureMismatch),
            AuthError::TokenMalformed { .. }
        ));
        assert!(matches!(
            AuthError::from(VerificationError::AudienceMismatch),
            AuthError::TokenMalformed { .. }
        ));
        assert!(matches!(AuthError::from(VerificationError::Expired), AuthError::TokenExpired));
        assert!(matches!(AuthError::from(VerificationError::Revoked), AuthError::TokenRevoked));
        assert!(matches!(
            AuthError::from(VerificationError::Store(CoreError::revocation("down"))),
            AuthError::Internal(_)
        ));
    }

    #[test]
    fn test_integrity_failures() {
        assert!(VerificationError::SignatureMismatch.is_integrity_failure());
        assert!(VerificationError::Malformed("x".into()).is_integrity_failure());
        assert!(!VerificationError::Expired.is_integrity_failure());
        assert!(!VerificationError::Revoked.is_integrity_failure());
    }
}
