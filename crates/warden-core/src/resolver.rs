// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role to permission expansion.

use std::sync::Arc;

use tracing::trace;

use crate::error::CoreResult;
use crate::store::CredentialStore;
use crate::types::{Grants, NameSet, PrincipalId};

// =============================================================================
// PermissionResolver
// =============================================================================

/// Expands a principal's roles into the permission set a token will carry.
///
/// The result is a snapshot; tokens issued from it are not re-resolved when
/// role assignments change later.
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn CredentialStore>,
}

impl PermissionResolver {
    /// Creates a resolver reading from `store`.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Resolves role names and the union of their permissions.
    ///
    /// A principal without roles resolves to empty sets.
    pub async fn resolve(&self, principal: &PrincipalId) -> CoreResult<Grants> {
        let roles = self.store.roles_of(principal).await?;

        let mut grants = Grants::default();
        for role in &roles {
            let permissions: NameSet = self
                .store
                .permissions_of(&role.id)
                .await?
                .into_iter()
                .map(|p| p.name)
                .collect();
            grants.permissions.extend_from(&permissions);
            grants.roles.insert(role.name.clone());
        }

        trace!(
            principal = %principal,
            roles = %grants.roles,
            permissions = grants.permissions.len(),
            "Resolved grants"
        );
        Ok(grants)
    }
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver")
            .field("store", &self.store.name())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
