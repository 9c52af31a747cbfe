// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-config
//!
//! Configuration management for the warden token service.
//!
//! - **Multi-format**: YAML, TOML, and JSON, chosen by file extension
//! - **Environment**: `${VAR:default}` placeholders and `WARDEN_*` overrides
//! - **Validation**: missing token settings and inconsistent directories are
//!   rejected before anything starts
//!
//! ## Example
//!
//! ```no_run
//! use warden_config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load("warden.yaml")?;
//! let jwt = config.jwt.resolve()?;
//! println!("issuer: {}", jwt.issuer);
//! # Ok::<(), warden_config::ConfigError>(())
//! ```
//!
//! ## Configuration File Example
//!
//! ```yaml
//! server:
//!   port: 8080
//!
//! jwt:
//!   secret: ${WARDEN_JWT_SECRET}
//!   issuer: warden
//!   audience: warden-clients
//!   expiry_minutes: 60
//!
//! directory:
//!   roles:
//!     - name: Admin
//!       permissions: [Read, Write, Delete]
//!   principals:
//!     - email: admin@company.com
//!       password_hash: "$argon2id$v=19$..."
//!       roles: [Admin]
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader, ConfigLoaderBuilder};
pub use schema::{
    DirectoryConfig, JwtSection, JwtSettings, LogFormat, LogLevel, LoggingConfig,
    PrincipalEntry, RateLimitSection, RevocationSection, RoleEntry, SecretValue, ServerConfig,
    WardenConfig,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
