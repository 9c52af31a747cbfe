// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-core
//!
//! Credential, permission, and revocation primitives for the warden token
//! service.
//!
//! This crate holds everything the token lifecycle needs that is independent
//! of the token format and of HTTP:
//!
//! - **Types**: `PrincipalId`, `Principal`, `NameSet`, `Grants`
//! - **Store**: the `CredentialStore` seam and an in-memory directory
//! - **Password**: Argon2id hashing and the `CredentialValidator`
//! - **Resolver**: role to permission expansion
//! - **Revocation**: fingerprints, the `RevocationStore` seam, the in-memory
//!   store and its background sweeper
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warden_core::{
//!     CredentialValidator, InMemoryCredentialStore, PasswordHasherConfig, PermissionResolver,
//! };
//!
//! let store = Arc::new(InMemoryCredentialStore::new());
//! let validator = CredentialValidator::new(store.clone(), PasswordHasherConfig::default())?;
//! store.add_role("Reader", ["Members.Read"]);
//! store.add_principal("reader@company.com", &validator.hash_password("pw")?, ["Reader"])?;
//!
//! let principal = validator.validate("reader@company.com", "pw").await?.unwrap();
//! let grants = PermissionResolver::new(store).resolve(&principal.id).await?;
//! assert!(grants.permissions.contains("Members.Read"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod password;
pub mod resolver;
pub mod revocation;
pub mod store;
pub mod types;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CoreError, CoreResult};
pub use password::{CredentialValidator, PasswordHasherConfig};
pub use resolver::PermissionResolver;
pub use revocation::{
    Fingerprint, InMemoryRevocationStore, RevocationStore, RevocationSweeper,
};
pub use store::{CredentialStore, InMemoryCredentialStore};
pub use types::{Grants, NameSet, PermissionRecord, Principal, PrincipalId, RoleRecord};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
