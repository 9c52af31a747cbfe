// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential store abstraction.
//!
//! The store owns principals, roles, permissions and the many-to-many links
//! between them. The token lifecycle only ever *reads* from it: lookup by
//! email, roles of a principal, permissions of a role.
//!
//! Implementations backed by a database should make each call cancel-safe;
//! the HTTP layer drops in-flight futures when the client disconnects.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::types::{PermissionRecord, Principal, PrincipalId, RoleRecord};

// =============================================================================
// CredentialStore Trait
// =============================================================================

/// Read access to principals and their role/permission assignments.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use warden_core::{
///     CoreResult, CredentialStore, PermissionRecord, Principal, PrincipalId, RoleRecord,
/// };
///
/// struct PgStore { /* pool */ }
///
/// #[async_trait]
/// impl CredentialStore for PgStore {
///     async fn find_by_email(&self, email: &str) -> CoreResult<Option<Principal>> { todo!() }
///     async fn roles_of(&self, id: &PrincipalId) -> CoreResult<Vec<RoleRecord>> { todo!() }
///     async fn permissions_of(&self, role_id: &str) -> CoreResult<Vec<PermissionRecord>> {
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks up a principal by login email.
    ///
    /// Emails compare case-insensitively.
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<Principal>>;

    /// Returns the roles assigned to a principal. Unknown principals have none.
    async fn roles_of(&self, principal: &PrincipalId) -> CoreResult<Vec<RoleRecord>>;

    /// Returns the permissions granted by a role. Unknown roles grant none.
    async fn permissions_of(&self, role_id: &str) -> CoreResult<Vec<PermissionRecord>>;

    /// Returns the store name for identification.
    fn name(&self) -> &str {
        "credential_store"
    }
}

// =============================================================================
// InMemoryCredentialStore
// =============================================================================

#[derive(Debug, Default)]
struct Directory {
    /// Roles keyed by name.
    roles: HashMap<String, RoleRecord>,
    /// Permission ids granted by each role id.
    role_permissions: HashMap<String, Vec<String>>,
    /// Permissions keyed by id.
    permissions: HashMap<String, PermissionRecord>,
    /// Permission ids keyed by name.
    permission_ids: HashMap<String, String>,
    /// Principals keyed by normalized email.
    principals: HashMap<String, Principal>,
    /// Role ids assigned to each principal.
    assignments: HashMap<PrincipalId, Vec<String>>,
}

impl Directory {
    fn permission_id(&mut self, name: String) -> String {
        if let Some(id) = self.permission_ids.get(&name) {
            return id.clone();
        }
        let id = uuid::Uuid::now_v7().to_string();
        self.permission_ids.insert(name.clone(), id.clone());
        self.permissions
            .insert(id.clone(), PermissionRecord { id: id.clone(), name });
        id
    }
}

/// Thread-safe in-memory credential directory.
///
/// Used by the `warden` binary (populated from configuration) and by tests.
/// Cloning shares the underlying directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    inner: Arc<RwLock<Directory>>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a role, or grants additional permissions to an existing one.
    pub fn add_role<I, S>(&self, name: impl Into<String>, permissions: I) -> RoleRecord
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let mut dir = self.inner.write();

        let role = match dir.roles.get(&name).cloned() {
            Some(role) => role,
            None => {
                let role = RoleRecord {
                    id: uuid::Uuid::now_v7().to_string(),
                    name: name.clone(),
                };
                dir.roles.insert(name, role.clone());
                role
            }
        };

        let ids: Vec<String> = permissions
            .into_iter()
            .map(|p| dir.permission_id(p.into()))
            .collect();
        let granted = dir.role_permissions.entry(role.id.clone()).or_default();
        for id in ids {
            if !granted.contains(&id) {
                granted.push(id);
            }
        }

        role
    }

    /// Adds a principal with the given roles.
    ///
    /// Fails if the email is taken or a role is undefined.
    pub fn add_principal<I, S>(
        &self,
        email: impl AsRef<str>,
        password_hash: impl Into<String>,
        roles: I,
    ) -> CoreResult<PrincipalId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let email = normalize_email(email.as_ref());
        let mut dir = self.inner.write();

        if dir.principals.contains_key(&email) {
            return Err(CoreError::DuplicatePrincipal { email });
        }

        let mut role_ids = Vec::new();
        for role in roles {
            let role = role.into();
            match dir.roles.get(&role) {
                Some(record) => {
                    if !role_ids.contains(&record.id) {
                        role_ids.push(record.id.clone());
                    }
                }
                None => return Err(CoreError::UnknownRole { role }),
            }
        }

        let id = PrincipalId::generate();
        dir.principals
            .insert(email.clone(), Principal::new(id.clone(), email, password_hash));
        dir.assignments.insert(id.clone(), role_ids);
        Ok(id)
    }

    /// Assigns an existing role to an existing principal.
    pub fn assign_role(&self, principal: &PrincipalId, role: &str) -> CoreResult<()> {
        let mut dir = self.inner.write();
        let role_id = dir
            .roles
            .get(role)
            .map(|r| r.id.clone())
            .ok_or_else(|| CoreError::UnknownRole {
                role: role.to_string(),
            })?;
        let assigned = dir
            .assignments
            .get_mut(principal)
            .ok_or_else(|| CoreError::store(format!("unknown principal {}", principal)))?;
        if !assigned.contains(&role_id) {
            assigned.push(role_id);
        }
        Ok(())
    }

    /// Returns the number of principals.
    pub fn principal_count(&self) -> usize {
        self.inner.read().principals.len()
    }

    /// Returns the number of roles.
    pub fn role_count(&self) -> usize {
        self.inner.read().roles.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<Principal>> {
        Ok(self.inner.read().principals.get(&normalize_email(email)).cloned())
    }

    async fn roles_of(&self, principal: &PrincipalId) -> CoreResult<Vec<RoleRecord>> {
        let dir = self.inner.read();
        let Some(role_ids) = dir.assignments.get(principal) else {
            return Ok(Vec::new());
        };
        Ok(dir
            .roles
            .values()
            .filter(|r| role_ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn permissions_of(&self, role_id: &str) -> CoreResult<Vec<PermissionRecord>> {
        let dir = self.inner.read();
        Ok(dir
            .role_permissions
            .get(role_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| dir.permissions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Normalizes an email for lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Tests
// =============================================================================
