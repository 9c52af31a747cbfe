// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - Token claims and JWT signing/decoding
//! - Per-request token verification with revocation
//! - The login/logout gateway
//! - Authentication context
//! - The authentication error taxonomy

mod claims;
mod context;
mod error;
mod gateway;
mod jwt;
mod verifier;

pub use claims::TokenClaims;
pub use context::AuthContext;
pub use error::{AuthError, AuthResult, VerificationError};
pub use gateway::{AuthenticationGateway, LoginOutcome, LoginRequest, LogoutOutcome};
pub use jwt::{IssuedToken, JwtConfig, JwtManager, UnverifiedToken, MIN_SECRET_LEN};
pub use verifier::TokenVerifier;
