// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for warden-core.
//!
//! Credential and revocation failures are returned as values so that callers
//! handle each kind explicitly. A failed password check is *not* an error:
//! `CredentialValidator::validate` returns `Ok(None)` for it. `CoreError`
//! covers the cases where the answer could not be computed at all.

use thiserror::Error;

/// Result type alias for warden-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// CoreError
// =============================================================================

/// Errors raised by the credential and revocation primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The credential store could not answer a lookup.
    #[error("Credential store failure: {message}")]
    Store {
        /// Error message.
        message: String,
    },

    /// Password hashing failed (invalid parameters or salt generation).
    #[error("Password hashing failed: {message}")]
    Hashing {
        /// Error message.
        message: String,
    },

    /// A principal with this email already exists.
    #[error("Duplicate principal: {email}")]
    DuplicatePrincipal {
        /// The duplicated email address.
        email: String,
    },

    /// A principal references a role that is not defined.
    #[error("Unknown role: {role}")]
    UnknownRole {
        /// The undefined role name.
        role: String,
    },

    /// The revocation store could not record or answer a lookup.
    #[error("Revocation store failure: {message}")]
    Revocation {
        /// Error message.
        message: String,
    },

    /// A blocking worker task was cancelled or panicked.
    #[error("Worker task failed: {message}")]
    Task {
        /// Error message.
        message: String,
    },
}

impl CoreError {
    /// Creates a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Creates a hashing error.
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }

    /// Creates a revocation store error.
    pub fn revocation(message: impl Into<String>) -> Self {
        Self::Revocation {
            message: message.into(),
        }
    }

    /// Returns `true` if retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store { .. } | Self::Revocation { .. })
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Store { .. } => "store",
            Self::Hashing { .. } => "hashing",
            Self::DuplicatePrincipal { .. } => "duplicate_principal",
            Self::UnknownRole { .. } => "unknown_role",
            Self::Revocation { .. } => "revocation",
            Self::Task { .. } => "task",
        }
    }
}

impl From<tokio::task::JoinError> for CoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::store("connection reset");
        assert_eq!(err.to_string(), "Credential store failure: connection reset");

        let err = CoreError::UnknownRole {
            role: "Auditor".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown role: Auditor");
    }

    #[test]
    fn test_retryable() {
        assert!(CoreError::store("x").is_retryable());
        assert!(CoreError::revocation("x").is_retryable());
        assert!(!CoreError::hashing("x").is_retryable());
        assert!(!CoreError::DuplicatePrincipal {
            email: "a@b.c".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_error_type() {
        assert_eq!(CoreError::hashing("x").error_type(), "hashing");
        assert_eq!(CoreError::revocation("x").error_type(), "revocation");
    }
}
