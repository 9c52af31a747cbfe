// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! The seeded directory used across suites:
//!
//! | Principal             | Password     | Roles  | Permissions          |
//! |-----------------------|--------------|--------|----------------------|
//! | `admin@company.com`   | `correct-pw` | Admin  | Read, Write, Delete  |
//! | `reader@company.com`  | `reader-pw`  | Reader | Read                 |
//! | `nobody@company.com`  | `nobody-pw`  | (none) | (none)               |

use warden_api::middleware::RateLimitConfig;
use warden_api::{ApiConfig, JwtConfig, JwtManager};
use warden_core::{InMemoryCredentialStore, PasswordHasherConfig};

// =============================================================================
// Constants
// =============================================================================

/// HS256 secret used by every fixture configuration.
pub const TEST_SECRET: &str = "integration-test-secret-key-that-is-long-enough";
/// Issuer used by every fixture configuration.
pub const TEST_ISSUER: &str = "warden";
/// Audience used by every fixture configuration.
pub const TEST_AUDIENCE: &str = "warden-clients";
/// Token lifetime used by every fixture configuration.
pub const TEST_EXPIRY_MINUTES: u32 = 60;

pub const ADMIN_EMAIL: &str = "admin@company.com";
pub const ADMIN_PASSWORD: &str = "correct-pw";
pub const ADMIN_PERMISSIONS: &[&str] = &["Read", "Write", "Delete"];

pub const READER_EMAIL: &str = "reader@company.com";
pub const READER_PASSWORD: &str = "reader-pw";

pub const NOBODY_EMAIL: &str = "nobody@company.com";
pub const NOBODY_PASSWORD: &str = "nobody-pw";

// =============================================================================
// Directory Fixtures
// =============================================================================

/// Pre-built credential directories.
pub struct DirectoryFixtures;

impl DirectoryFixtures {
    /// Cheap Argon2 parameters so tests do not crawl.
    pub fn hasher() -> PasswordHasherConfig {
        PasswordHasherConfig::insecure_fast()
    }

    /// Hashes `password` with [`Self::hasher`].
    pub fn hash(password: &str) -> String {
        Self::hasher()
            .hash(password)
            .expect("Failed to hash fixture password")
    }

    /// The Admin and Reader roles without any principals.
    pub fn roles_only() -> InMemoryCredentialStore {
        let store = InMemoryCredentialStore::new();
        store.add_role("Admin", ADMIN_PERMISSIONS.iter().copied());
        store.add_role("Reader", ["Read"]);
        store
    }

    /// The full seeded directory described in the module docs.
    pub fn seeded() -> InMemoryCredentialStore {
        let store = Self::roles_only();
        store
            .add_principal(ADMIN_EMAIL, Self::hash(ADMIN_PASSWORD), ["Admin"])
            .expect("Failed to add admin");
        store
            .add_principal(READER_EMAIL, Self::hash(READER_PASSWORD), ["Reader"])
            .expect("Failed to add reader");
        store
            .add_principal(NOBODY_EMAIL, Self::hash(NOBODY_PASSWORD), Vec::<String>::new())
            .expect("Failed to add role-less principal");
        store
    }
}

// =============================================================================
// JWT Fixtures
// =============================================================================

/// Token configurations, including deliberately mismatched ones.
pub struct JwtFixtures;

impl JwtFixtures {
    /// The configuration the test server trusts.
    pub fn config() -> JwtConfig {
        JwtConfig::new(TEST_SECRET, TEST_ISSUER, TEST_AUDIENCE, TEST_EXPIRY_MINUTES)
    }

    /// Same key, different issuer.
    pub fn foreign_issuer() -> JwtManager {
        Self::manager(JwtConfig::new(
            TEST_SECRET,
            "someone-else",
            TEST_AUDIENCE,
            TEST_EXPIRY_MINUTES,
        ))
    }

    /// Same key, different audience.
    pub fn foreign_audience() -> JwtManager {
        Self::manager(JwtConfig::new(
            TEST_SECRET,
            TEST_ISSUER,
            "another-service",
            TEST_EXPIRY_MINUTES,
        ))
    }

    /// Same issuer and audience, different key.
    pub fn foreign_secret() -> JwtManager {
        Self::manager(JwtConfig::new(
            "a-completely-different-secret-of-decent-length",
            TEST_ISSUER,
            TEST_AUDIENCE,
            TEST_EXPIRY_MINUTES,
        ))
    }

    fn manager(config: JwtConfig) -> JwtManager {
        JwtManager::new(config).expect("Failed to create JWT manager")
    }
}

// =============================================================================
// API Fixtures
// =============================================================================

/// API server configurations.
pub struct ApiFixtures;

impl ApiFixtures {
    /// Fixture JWT settings, fast hashing, no rate limiting.
    pub fn config() -> ApiConfig {
        ApiConfig::new(JwtFixtures::config())
            .with_password(DirectoryFixtures::hasher())
            .with_rate_limit(RateLimitConfig::disabled())
    }
}

// =============================================================================
// Config File Fixtures
// =============================================================================

/// Configuration file contents.
pub struct ConfigFileFixtures;

impl ConfigFileFixtures {
    /// A complete YAML configuration with the Admin and Reader directory.
    ///
    /// The JWT secret is read from `${secret_var}` so tests can exercise
    /// placeholder resolution.
    pub fn yaml(secret_var: &str) -> String {
        format!(
            r#"
server:
  host: 127.0.0.1

jwt:
  secret: "${{{secret_var}:{TEST_SECRET}}}"
  issuer: {TEST_ISSUER}
  audience: {TEST_AUDIENCE}
  expiry_minutes: {TEST_EXPIRY_MINUTES}

rate_limit:
  enabled: false

password:
  memory_kib: 1024
  iterations: 1
  parallelism: 1

directory:
  roles:
    - name: Admin
      permissions: [Read, Write, Delete]
    - name: Reader
      permissions: [Read]
  principals:
    - email: {ADMIN_EMAIL}
      password_hash: "{admin_hash}"
      roles: [Admin]
    - email: {READER_EMAIL}
      password_hash: "{reader_hash}"
      roles: [Reader]
"#,
            admin_hash = DirectoryFixtures::hash(ADMIN_PASSWORD),
            reader_hash = DirectoryFixtures::hash(READER_PASSWORD),
        )
    }
}
