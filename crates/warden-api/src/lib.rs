// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-api
//!
//! Bearer token lifecycle and HTTP surface for the warden credential service.
//!
//! - **auth**: JWT issuance (`JwtManager`), verification (`TokenVerifier`),
//!   and the `AuthenticationGateway` orchestrating login and logout
//! - **middleware**: authentication gate, permission gate, per-client rate
//!   limiting
//! - **handlers**: `/auth/login`, `/auth/logout`, `/auth/me`, `/health`
//! - **server**: router assembly and graceful serving
//!
//! ## Request Flow
//!
//! ```text
//! request ─► RateLimitLayer ─► AuthLayer ─► [RbacLayer] ─► handler
//!                                 │
//!                                 └─ TokenVerifier: structure ─► signature
//!                                    ─► issuer/audience ─► expiry ─► revocation
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{
    AuthContext, AuthError, AuthResult, AuthenticationGateway, JwtConfig, JwtManager,
    TokenClaims, TokenVerifier, VerificationError,
};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::AppState;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
