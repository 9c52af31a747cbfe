// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory revocation store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::trace;

use super::{Fingerprint, RevocationStore};
use crate::error::CoreResult;

// =============================================================================
// InMemoryRevocationStore
// =============================================================================

/// Process-local revocation store backed by a sharded concurrent map.
///
/// Lookups only lock the shard holding the key, so checks for unrelated
/// tokens never wait on a concurrent `revoke`. Expired entries are dropped
/// lazily when looked up and in bulk by [`purge_expired`](RevocationStore::purge_expired).
///
/// Cloning shares the underlying map.
///
/// # Example
///
/// ```rust,ignore
/// use chrono::{Duration, Utc};
/// use warden_core::{Fingerprint, InMemoryRevocationStore, RevocationStore};
///
/// let store = InMemoryRevocationStore::new();
/// let fp = Fingerprint::from_jti("0192b5a4-7c1e-7000-8000-000000000001");
///
/// store.revoke(&fp, Utc::now() + Duration::minutes(30)).await?;
/// assert!(store.is_revoked(&fp).await?);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRevocationStore {
    entries: Arc<DashMap<Fingerprint, DateTime<Utc>>>,
}

impl InMemoryRevocationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a revocation as of `now`.
    ///
    /// Returns `false` when nothing was stored because the token had already
    /// expired. Re-revoking keeps the later of the two expiries.
    pub fn revoke_at(
        &self,
        fingerprint: &Fingerprint,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        if expires_at <= now {
            trace!(fingerprint = %fingerprint, "Skipping revocation of expired token");
            return false;
        }

        match self.entries.entry(fingerprint.clone()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() < expires_at {
                    entry.insert(expires_at);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
            }
        }
        true
    }

    /// Checks for a live revocation as of `now`, dropping the entry if it
    /// has expired.
    pub fn is_revoked_at(&self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> bool {
        // The read guard must be released before removing from the same shard.
        let expired = match self.entries.get(fingerprint) {
            Some(expires_at) => *expires_at <= now,
            None => return false,
        };

        if expired {
            self.entries.remove_if(fingerprint, |_, expires_at| *expires_at <= now);
            return false;
        }
        true
    }

    /// Removes every entry expired as of `now`.
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, expires_at| {
            let keep = *expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Returns the number of stored entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, fingerprint: &Fingerprint, expires_at: DateTime<Utc>) -> CoreResult<()> {
        self.revoke_at(fingerprint, expires_at, Utc::now());
        Ok(())
    }

    async fn is_revoked(&self, fingerprint: &Fingerprint) -> CoreResult<bool> {
        Ok(self.is_revoked_at(fingerprint, Utc::now()))
    }

    async fn purge_expired(&self) -> CoreResult<usize> {
        Ok(self.purge_expired_at(Utc::now()))
    }

    async fn len(&self) -> CoreResult<usize> {
        Ok(self.entry_count())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// =============================================================================
// Tests
// =============================================================================
