// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token revocation.
//!
//! A revoked token is remembered only until it would have expired on its own.
//! After that the signature check rejects it anyway, so the entry can go.
//! Steady-state size is therefore bounded by the number of revoked tokens
//! that are still within their lifetime, not by the number of logouts.
//!
//! # Components
//!
//! - [`Fingerprint`]: SHA-256 derived key, never the raw token
//! - [`RevocationStore`]: storage seam, swappable for a shared key-value store
//! - [`InMemoryRevocationStore`]: process-local sharded map
//! - [`RevocationSweeper`]: periodic purge task
//!
//! The in-memory store is process-local. Behind a load balancer, a token
//! revoked on one instance stays valid on the others until it expires.

mod memory;
mod sweeper;

pub use memory::InMemoryRevocationStore;
pub use sweeper::{RevocationSweeper, DEFAULT_SWEEP_INTERVAL};

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::error::CoreResult;

// =============================================================================
// Fingerprint
// =============================================================================

/// Non-reversible revocation key of a token.
///
/// Derived from the `jti` claim when present, otherwise from the whole token.
/// The two derivations use distinct prefixes so they never collide.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derives the fingerprint of a token ID.
    pub fn from_jti(jti: &str) -> Self {
        Self::digest(b"jti:", jti)
    }

    /// Derives the fingerprint of a raw token without a `jti`.
    pub fn from_token(token: &str) -> Self {
        Self::digest(b"token:", token)
    }

    fn digest(domain: &[u8], value: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        hasher.update(value.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Returns the lowercase hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short prefix for logs.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}…", self.short())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({}…)", self.short())
    }
}

// =============================================================================
// RevocationStore Trait
// =============================================================================

/// Storage for revoked token fingerprints.
///
/// # Contract
///
/// - `revoke` with `expires_at <= now` stores nothing.
/// - `revoke` is idempotent.
/// - `is_revoked` never reports an entry past its `expires_at`.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Marks a token as revoked until `expires_at`.
    async fn revoke(&self, fingerprint: &Fingerprint, expires_at: DateTime<Utc>) -> CoreResult<()>;

    /// Returns `true` if the token is revoked and not yet expired.
    async fn is_revoked(&self, fingerprint: &Fingerprint) -> CoreResult<bool>;

    /// Drops every expired entry and returns how many were removed.
    async fn purge_expired(&self) -> CoreResult<usize>;

    /// Returns the number of stored entries, including expired ones not yet purged.
    async fn len(&self) -> CoreResult<usize>;

    /// Returns the store name for identification.
    fn name(&self) -> &str {
        "revocation_store"
    }
}

// =============================================================================
// Tests
// =============================================================================
