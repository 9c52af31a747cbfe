// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{extract::State, response::IntoResponse, Json};

use crate::auth::{AuthError, LoginRequest};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, BearerToken, ClientIp, ValidatedJson};
use crate::response::{LoginResponse, MeResponse, MessageResponse};
use crate::state::AppState;

/// Message returned on successful logout.
pub const LOGOUT_MESSAGE: &str = "Logged out successfully. Token has been revoked.";

// =============================================================================
// Login
// =============================================================================

/// POST /auth/login
///
/// Authenticates credentials and returns a bearer token.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.gateway().login(&request).await.map_err(|e| {
        if matches!(e, AuthError::InvalidCredentials) {
            tracing::info!(client_ip = ?client_ip, "Rejected login attempt");
        }
        ApiError::from(e)
    })?;

    Ok(Json(LoginResponse::from(outcome)))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /auth/logout
///
/// Revokes the presented bearer token. Repeating the call is harmless.
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<impl IntoResponse> {
    state
        .gateway()
        .logout(token.as_deref())
        .await
        .map_err(|e| match e {
            // An unreadable token is a bad request here, not an auth failure.
            AuthError::TokenMalformed { .. } => ApiError::bad_request(e.public_message()),
            other => ApiError::from(other),
        })?;

    Ok(Json(MessageResponse::new(LOGOUT_MESSAGE)))
}

// =============================================================================
// Current User
// =============================================================================

/// GET /auth/me
///
/// Returns the identity and grants carried by the presented token.
pub async fn current_user(Auth(ctx): Auth) -> ApiResult<impl IntoResponse> {
    Ok(Json(MeResponse::from(ctx)))
}
