// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use warden_core::{Fingerprint, NameSet, PrincipalId};

use super::claims::TokenClaims;

/// Identity and grants of an authenticated request.
///
/// Built from verified token claims and inserted into request extensions by
/// the authentication layer. Grants are the issuance-time snapshot carried
/// by the token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    /// Principal ID.
    pub principal_id: PrincipalId,
    /// Principal email.
    pub email: String,
    /// Role names.
    pub roles: NameSet,
    /// Permission names.
    pub permissions: NameSet,
    /// Token ID.
    #[serde(skip)]
    pub token_id: String,
    /// Token issuance time.
    pub issued_at: DateTime<Utc>,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates a context from verified claims.
    pub fn from_claims(claims: &TokenClaims) -> Self {
        Self {
            principal_id: claims.principal_id(),
            email: claims.email.clone(),
            roles: claims.roles.clone(),
            permissions: claims.permissions.clone(),
            token_id: claims.jti.clone(),
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.client_ip = ip;
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns `true` if the context has the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns `true` if the context has the given permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns `true` if the context has all of the given permissions.
    pub fn has_all_permissions<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        self.permissions.contains_all(permissions)
    }

    /// Returns `true` if the context has any of the given permissions.
    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        self.permissions.contains_any(permissions)
    }

    /// Returns the revocation fingerprint of the presented token.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_jti(&self.token_id)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use warden_core::{Grants, Principal};

    fn claims() -> TokenClaims {
        TokenClaims::for_principal(
            &Principal::new(PrincipalId::new("p-1"), "reader@company.com", "hash"),
            &Grants::new(
                ["Reader"].into_iter().collect(),
                ["Members.Read"].into_iter().collect(),
            ),
            "warden",
            "warden-clients",
            Duration::minutes(5),
            Utc::now(),
        )
    }

    #[test]
    fn test_from_claims() {
        let claims = claims();
        let ctx = AuthContext::from_claims(&claims);

        assert_eq!(ctx.principal_id.as_str(), "p-1");
        assert!(ctx.has_role("Reader"));
        assert!(ctx.has_permission("Members.Read"));
        assert!(!ctx.has_permission("Members.Write"));
        assert!(ctx.has_any_permission(&["Members.Write", "Members.Read"]));
        assert!(!ctx.has_all_permissions(&["Members.Write", "Members.Read"]));
        assert_eq!(ctx.fingerprint(), claims.fingerprint());
        assert_eq!(ctx.expires_at, claims.expires_at());
    }

    #[test]
    fn test_serialization_omits_token_id() {
        let ctx = AuthContext::from_claims(&claims());
        let json = serde_json::to_value(&ctx).unwrap();
        assert!(json.get("token_id").is_none());
        assert!(json.get("client_ip").is_none());
        assert_eq!(json["email"], "reader@company.com");
    }

    #[test]
    fn test_with_client_ip() {
        let ip: IpAddr = "10.0.0.7".parse().unwrap();
        let ctx = AuthContext::from_claims(&claims()).with_client_ip(Some(ip));
        assert_eq!(ctx.client_ip, Some(ip));
    }
}
