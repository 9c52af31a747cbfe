// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password hashing and credential validation.
//!
//! Passwords are stored as Argon2id PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`). Verification reads the
//! cost parameters from the stored string, so raising the configured cost
//! only affects newly hashed passwords.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::store::CredentialStore;
use crate::types::Principal;

// =============================================================================
// PasswordHasherConfig
// =============================================================================

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordHasherConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for PasswordHasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordHasherConfig {
    /// Minimal cost parameters. Only suitable for tests.
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST.max(64),
            iterations: 1,
            parallelism: 1,
        }
    }

    /// Builds an Argon2id hasher with these parameters.
    pub fn hasher(&self) -> CoreResult<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| CoreError::hashing(format!("invalid argon2 parameters: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hashes a plaintext password into a PHC string with a random salt.
    pub fn hash(&self, password: &str) -> CoreResult<String> {
        hash_with(&self.hasher()?, password)
    }
}

fn hash_with(hasher: &Argon2<'_>, password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| CoreError::hashing(e.to_string()))
}

fn verify_with(hasher: &Argon2<'_>, password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => hasher.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            warn!(error = %e, "Stored password hash is not a valid PHC string");
            false
        }
    }
}

// =============================================================================
// CredentialValidator
// =============================================================================

/// Verifies email/password pairs against a [`CredentialStore`].
///
/// An unknown email and a wrong password are indistinguishable to the
/// caller: both yield `Ok(None)`, and both pay for one full hash
/// verification so that timing does not reveal which emails exist.
#[derive(Clone)]
pub struct CredentialValidator {
    store: Arc<dyn CredentialStore>,
    hasher: Argon2<'static>,
    dummy_hash: Arc<str>,
}

impl CredentialValidator {
    /// Creates a validator with the given hashing cost.
    pub fn new(store: Arc<dyn CredentialStore>, config: PasswordHasherConfig) -> CoreResult<Self> {
        let hasher = config.hasher()?;
        let dummy_hash = hash_with(&hasher, "warden-unknown-principal")?;
        Ok(Self {
            store,
            hasher,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Hashes a password with this validator's parameters.
    pub fn hash_password(&self, password: &str) -> CoreResult<String> {
        hash_with(&self.hasher, password)
    }

    /// Checks a password against the stored hash of `email`.
    ///
    /// Returns the principal on success and `None` on any mismatch. Errors
    /// only when the store or the hashing worker fails.
    pub async fn validate(&self, email: &str, password: &str) -> CoreResult<Option<Principal>> {
        let principal = self.store.find_by_email(email).await?;

        let stored = match &principal {
            Some(p) => p.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };
        let hasher = self.hasher.clone();
        let password = password.to_owned();

        // Argon2 is CPU-bound; keep it off the async workers.
        let matched =
            tokio::task::spawn_blocking(move || verify_with(&hasher, &password, &stored)).await?;

        if !matched {
            debug!(known = principal.is_some(), "Credential validation failed");
            return Ok(None);
        }
        Ok(principal)
    }
}

impl std::fmt::Debug for CredentialValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialValidator")
            .field("store", &self.store.name())
            .field("params", self.hasher.params())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
