// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden Integration Tests
//!
//! Cross-crate tests for the warden credential service, plus the fixtures
//! and helpers they share.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Seeded directory, JWT and API configurations
//!   - `harness`: In-process router driver ([`common::TestApp`])
//!   - `assertions`: Response assertion helpers
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p warden-tests
//!
//! # Run a specific suite
//! cargo test -p warden-tests --test integration_auth
//! cargo test -p warden-tests --test integration_lifecycle
//! cargo test -p warden-tests --test integration_config
//!
//! # With log output
//! RUST_LOG=warden_api=debug cargo test -p warden-tests -- --nocapture
//! ```
//!
//! ## Test Categories
//!
//! ### HTTP Tests (`integration_auth.rs`)
//! - Login, `/auth/me`, logout over the full router
//! - Expired, revoked, tampered and foreign tokens
//! - Permission gates, rate limiting, request validation
//!
//! ### Lifecycle Tests (`integration_lifecycle.rs`)
//! - Gateway, verifier and revocation store without HTTP
//! - Revocation reclamation and the background sweeper
//!
//! ### Config Tests (`integration_config.rs`)
//! - Configuration files through to a serving router
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use warden_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new();
//!     let token = app.login_token(ADMIN_EMAIL, ADMIN_PASSWORD).await;
//!     app.get("/auth/me", Some(&token)).await.assert_status(StatusCode::OK);
//! }
//! ```

pub mod common;

/// Everything a test module usually needs.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::{init_test_logging, temp_test_dir};

    pub use axum::http::StatusCode;
    pub use serde_json::{json, Value};
}
