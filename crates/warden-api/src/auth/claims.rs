// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token claims.
//!
//! Claim names are a stable contract for downstream consumers:
//!
//! | Claim         | Meaning                          |
//! |---------------|----------------------------------|
//! | `sub`         | principal identifier             |
//! | `email`       | principal email                  |
//! | `jti`         | unique token id (revocation key) |
//! | `roles`       | role names                       |
//! | `permissions` | permission names                 |
//! | `iat` / `exp` | issued-at / expiry, Unix seconds |
//! | `iss` / `aud` | issuer / audience                |

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{Fingerprint, Grants, NameSet, Principal, PrincipalId};

/// Claims embedded in every access token.
///
/// Roles and permissions are a snapshot taken at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject: the principal ID.
    pub sub: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    /// Token ID, unique per issuance.
    pub jti: String,

    // =========================================================================
    // Custom Claims
    // =========================================================================
    /// Principal email.
    pub email: String,

    /// Role names.
    #[serde(default)]
    pub roles: NameSet,

    /// Permission names.
    #[serde(default)]
    pub permissions: NameSet,
}

impl TokenClaims {
    /// Builds claims for `principal` valid for `ttl` starting at `now`.
    pub fn for_principal(
        principal: &Principal,
        grants: &Grants,
        issuer: &str,
        audience: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let iat = now.timestamp();
        Self {
            sub: principal.id.to_string(),
            exp: iat + ttl.num_seconds(),
            iat,
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::now_v7().to_string(),
            email: principal.email.clone(),
            roles: grants.roles.clone(),
            permissions: grants.permissions.clone(),
        }
    }

    /// Returns the principal ID.
    pub fn principal_id(&self) -> PrincipalId {
        PrincipalId::new(self.sub.clone())
    }

    /// Returns `true` if the claims carry the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns `true` if the claims carry the given permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns `true` if the token is expired at `now`.
    ///
    /// A token is valid strictly before `exp`; there is no clock skew allowance.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns the expiration time.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Returns the issued-at time.
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Returns the revocation fingerprint of this token.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_jti(&self.jti)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> TokenClaims {
        let principal = Principal::new(PrincipalId::new("p-1"), "admin@company.com", "hash");
        let grants = Grants::new(
            ["Admin"].into_iter().collect(),
            ["Read", "Write", "Delete"].into_iter().collect(),
        );
        TokenClaims::for_principal(
            &principal,
            &grants,
            "warden",
            "warden-clients",
            Duration::minutes(60),
            Utc::now(),
        )
    }

    #[test]
    fn test_for_principal() {
        let claims = claims();
        assert_eq!(claims.sub, "p-1");
        assert_eq!(claims.email, "admin@company.com");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.has_role("Admin"));
        assert!(claims.has_permission("Delete"));
        assert!(!claims.has_permission("Export"));
        assert!(!claims.is_expired());
        assert_eq!(claims.expires_at() - claims.issued_at(), Duration::minutes(60));
    }

    #[test]
    fn test_jti_unique_per_issuance() {
        assert_ne!(claims().jti, claims().jti);
        assert_ne!(claims().fingerprint(), claims().fingerprint());
    }

    #[test]
    fn test_expiry_boundary_is_strict() {
        let claims = claims();
        let exp = claims.expires_at();
        assert!(!claims.is_expired_at(exp - Duration::seconds(1)));
        assert!(claims.is_expired_at(exp));
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(claims()).unwrap();
        for name in ["sub", "email", "jti", "roles", "permissions", "iat", "exp", "iss", "aud"] {
            assert!(json.get(name).is_some(), "missing claim {}", name);
        }
        assert_eq!(json["roles"], serde_json::json!(["Admin"]));
        assert_eq!(json["permissions"], serde_json::json!(["Delete", "Read", "Write"]));
    }
}
