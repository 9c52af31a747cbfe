// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core identity and grant types.
//!
//! Roles and permissions travel as plain names. `NameSet` gives them set
//! semantics: equality ignores order and duplicates collapse by exact name,
//! so "permissions are the union of role permissions" can be asserted
//! directly.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// PrincipalId
// =============================================================================

/// Stable identifier of an authenticating principal.
///
/// This is the value carried in the `sub` claim of issued tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Creates a new principal ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh, time-ordered principal ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the inner string.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PrincipalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PrincipalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for PrincipalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Principal / Role / Permission records
// =============================================================================

/// A principal as held by the credential store.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    /// Principal identifier.
    pub id: PrincipalId,
    /// Login email, normalized to lowercase.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
}

impl Principal {
    /// Creates a principal record.
    pub fn new(
        id: PrincipalId,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}

// Hashes stay out of logs.
impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// A role known to the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Role identifier.
    pub id: String,
    /// Role name as embedded in tokens.
    pub name: String,
}

/// A permission known to the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// Permission identifier.
    pub id: String,
    /// Permission name as embedded in tokens.
    pub name: String,
}

// =============================================================================
// NameSet
// =============================================================================

/// A deduplicated set of role or permission names.
///
/// Iteration and serialization follow the canonical (sorted) order, so two
/// sets built from the same names in a different order are indistinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameSet(BTreeSet<String>);

impl NameSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a name. Returns `false` if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    /// Returns `true` if the set contains `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Returns `true` if every name in `names` is present.
    pub fn contains_all<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|n| self.0.contains(n.as_ref()))
    }

    /// Returns `true` if at least one name in `names` is present.
    pub fn contains_any<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|n| self.0.contains(n.as_ref()))
    }

    /// Adds every name of `other` to this set.
    pub fn extend_from(&mut self, other: &NameSet) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Returns the union of two sets.
    pub fn union(&self, other: &NameSet) -> NameSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    /// Returns the number of names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the names in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Copies the names into a vector in canonical order.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for NameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for NameSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for NameSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for NameSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for name in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

// =============================================================================
// Grants
// =============================================================================

/// Roles and the permissions they expand to, as resolved for one principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grants {
    /// Assigned role names.
    pub roles: NameSet,
    /// Union of the permissions of every assigned role.
    pub permissions: NameSet,
}

impl Grants {
    /// Creates grants from role and permission sets.
    pub fn new(roles: NameSet, permissions: NameSet) -> Self {
        Self { roles, permissions }
    }
}

// =============================================================================
// Tests
// =============================================================================
