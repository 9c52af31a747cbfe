// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! `ApiError` is the only error type that reaches the wire. Its public
//! message never carries internal detail: store failures, hash values, and
//! token parsing diagnostics are logged, not returned.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Public message for rejected token verification (expired or revoked).
pub const TOKEN_REJECTED_MESSAGE: &str = "Token has been revoked";

/// Public message for rate limited requests.
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";

// =============================================================================
// ApiError
// =============================================================================

/// Every failure a handler can return, with its HTTP status.
///
/// The `Display` form is for logs. Clients only ever see
/// [`ApiError::user_message`] and [`ApiError::error_code`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown route.
    #[error("no route for {resource}")]
    NotFound {
        /// Path or resource name.
        resource: String,
    },

    /// Request is missing something, such as the bearer token.
    #[error("rejected request: {message}")]
    BadRequest {
        /// Public message.
        message: String,
    },

    /// Credentials or token were not accepted.
    #[error("unauthenticated: {message}")]
    Unauthorized {
        /// Public message.
        message: String,
    },

    /// Authenticated, but the grants do not cover the route.
    #[error("forbidden: {message}")]
    Forbidden {
        /// Public message.
        message: String,
    },

    /// Body fields failed validation; `errors` lists them per field.
    #[error("invalid request body: {message}")]
    Validation {
        /// Public summary.
        message: String,
        /// Per-field failures.
        #[source]
        errors: Option<ValidationErrors>,
    },

    /// A login or global window is exhausted.
    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimitExceeded {
        /// Seconds until the window resets.
        retry_after: Option<u64>,
    },

    /// Anything the client cannot act on. `message` is logged only.
    #[error("internal failure: {message}")]
    Internal {
        /// Log-only detail.
        message: String,
    },
}

impl ApiError {
    /// 404 for `resource`.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 400 with a public message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// 401 with a public message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// 403 with a public message.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// A 400 carrying per-field messages under `details.fields`.
    pub fn validation_with_errors(message: impl Into<String>, errors: ValidationErrors) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Some(errors),
        }
    }

    /// 429, optionally with `Retry-After`.
    pub fn rate_limit_exceeded(retry_after: Option<u64>) -> Self {
        Self::RateLimitExceeded { retry_after }
    }

    /// 500; `message` is never sent to the client.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status for the response.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code placed in the `code` field.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns the message that is safe to show to clients.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { resource } => format!("{} not found", resource),
            ApiError::BadRequest { message }
            | ApiError::Unauthorized { message }
            | ApiError::Forbidden { message }
            | ApiError::Validation { message, .. } => message.clone(),
            ApiError::RateLimitExceeded { .. } => RATE_LIMITED_MESSAGE.to_string(),
            ApiError::Internal { .. } => "An unexpected error occurred".to_string(),
        }
    }

    /// Whether the failure is ours rather than the client's.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Internal { .. })
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Validation {
                errors: Some(errors),
                ..
            } => serde_json::to_value(errors).ok(),
            ApiError::RateLimitExceeded { retry_after } => {
                retry_after.map(|s| serde_json::json!({ "retry_after": s }))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Response
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = error_code, "Request failed");
        } else {
            tracing::debug!(
                error = %self,
                code = error_code,
                status = status.as_u16(),
                "Request rejected"
            );
        }

        let body = ErrorResponseBody {
            code: error_code.to_string(),
            message: self.user_message(),
            details: self.error_details(),
        };

        let mut response = (status, Json(body)).into_response();

        if let ApiError::RateLimitExceeded {
            retry_after: Some(seconds),
        } = &self
        {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(*seconds));
        }

        response
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Collection of field validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidationErrors {
    /// Field-specific errors.
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates a new validation errors collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field error.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns `true` if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` if `field` has at least one error.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

impl std::error::Error for ValidationErrors {}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation errors", self.fields.len())
    }
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// Error message.
    pub message: String,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::unauthorized(err.public_message()),
            AuthError::TokenMissing => ApiError::bad_request(err.public_message()),
            AuthError::TokenMalformed { .. }
            | AuthError::TokenExpired
            | AuthError::TokenRevoked => {
                tracing::debug!(code = err.code(), error = %err, "Token rejected");
                ApiError::unauthorized(err.public_message())
            }
            AuthError::PermissionDenied { .. } => ApiError::forbidden(err.public_message()),
            AuthError::Validation(errors) => {
                ApiError::validation_with_errors("Validation failed", errors)
            }
            AuthError::Configuration(_) | AuthError::Internal(_) => {
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl From<warden_core::CoreError> for ApiError {
    fn from(err: warden_core::CoreError) -> Self {
        tracing::warn!(
            kind = err.error_type(),
            retryable = err.is_retryable(),
            error = %err,
            "Core operation failed"
        );
        ApiError::internal(err.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApiError::not_found("route").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::validation_with_errors("x", ValidationErrors::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::rate_limit_exceeded(Some(60)).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::internal("crash").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED, "Invalid email or password"),
            (AuthError::TokenMissing, StatusCode::BAD_REQUEST, "No token provided"),
            (AuthError::malformed("bad base64"), StatusCode::UNAUTHORIZED, "Invalid token"),
            (AuthError::TokenExpired, StatusCode::UNAUTHORIZED, TOKEN_REJECTED_MESSAGE),
            (AuthError::TokenRevoked, StatusCode::UNAUTHORIZED, TOKEN_REJECTED_MESSAGE),
            (
                AuthError::PermissionDenied { permission: "Members.Delete".into() },
                StatusCode::FORBIDDEN,
                "Insufficient permissions",
            ),
        ];

        for (auth, status, message) in cases {
            let api: ApiError = auth.into();
            assert_eq!(api.status_code(), status);
            assert_eq!(api.user_message(), message);
        }
    }

    #[test]
    fn test_expired_and_revoked_indistinguishable() {
        let expired: ApiError = AuthError::TokenExpired.into();
        let revoked: ApiError = AuthError::TokenRevoked.into();
        assert_eq!(expired.error_code(), revoked.error_code());
        assert_eq!(expired.user_message(), revoked.user_message());
    }

    #[test]
    fn test_internal_detail_hidden() {
        let err: ApiError = AuthError::Internal("pool exhausted at 10.0.0.3".into()).into();
        assert_eq!(err.user_message(), "An unexpected error occurred");
        assert!(err.to_string().contains("pool exhausted"));
    }

    #[tokio::test]
    async fn test_response_body() {
        let response = ApiError::unauthorized("Invalid email or password").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid email or password");
        assert_eq!(body["code"], "UNAUTHORIZED");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_rate_limit_response_has_retry_after() {
        let response = ApiError::rate_limit_exceeded(Some(42)).into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");

        let body = body_json(response).await;
        assert_eq!(body["message"], RATE_LIMITED_MESSAGE);
        assert_eq!(body["details"]["retry_after"], 42);
    }

    #[tokio::test]
    async fn test_validation_response_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "Email is required");
        let error = ApiError::validation_with_errors("Validation failed", errors);
        let body = body_json(error.into_response()).await;
        assert_eq!(body["details"]["fields"][0]["field"], "email");
    }
}
