// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request token verification.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use warden_core::RevocationStore;

use super::claims::TokenClaims;
use super::error::VerificationError;
use super::jwt::JwtManager;

// =============================================================================
// TokenVerifier
// =============================================================================

/// Verifies bearer tokens presented on incoming requests.
///
/// Checks, in order:
///
/// 1. structure
/// 2. signature
/// 3. issuer and audience
/// 4. `now < exp`, with no clock skew allowance
/// 5. revocation
///
/// The first failing check decides the error.
#[derive(Clone)]
pub struct TokenVerifier {
    jwt: JwtManager,
    revocations: Arc<dyn RevocationStore>,
}

impl TokenVerifier {
    /// Creates a verifier.
    pub fn new(jwt: JwtManager, revocations: Arc<dyn RevocationStore>) -> Self {
        Self { jwt, revocations }
    }

    /// Verifies a token against the current time.
    pub async fn verify(&self, token: &str) -> Result<TokenClaims, VerificationError> {
        self.verify_at(token, Utc::now()).await
    }

    /// Verifies a token as of `now`.
    pub async fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, VerificationError> {
        let claims = self.jwt.decode_verified(token)?;

        if claims.is_expired_at(now) {
            return Err(VerificationError::Expired);
        }

        if self.revocations.is_revoked(&claims.fingerprint()).await? {
            return Err(VerificationError::Revoked);
        }

        Ok(claims)
    }

    /// Returns the token manager.
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("jwt", &self.jwt)
            .field("revocations", &self.revocations.name())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use counting::CountingStore;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::Duration;
    use warden_core::{Grants, InMemoryRevocationStore, Principal, PrincipalId};

    /// Revocation store wrapper that counts lookups.
    mod counting {
        use std::sync::atomic::{AtomicUsize, Ordering};

        use chrono::{DateTime, Utc};
        use warden_core::{CoreResult, Fingerprint, InMemoryRevocationStore, RevocationStore};

        #[derive(Default)]
        pub struct CountingStore {
            pub inner: InMemoryRevocationStore,
            pub lookups: AtomicUsize,
        }

        impl CountingStore {
            pub fn lookups(&self) -> usize {
                self.lookups.load(Ordering::SeqCst)
            }
        }

        #[async_trait::async_trait]
        impl RevocationStore for CountingStore {
            async fn revoke(&self, fp: &Fingerprint, expires_at: DateTime<Utc>) -> CoreResult<()> {
                self.inner.revoke(fp, expires_at).await
            }

            async fn is_revoked(&self, fp: &Fingerprint) -> CoreResult<bool> {
                self.lookups.fetch_add(1, Ordering::SeqCst);
                self.inner.is_revoked(fp).await
            }

            async fn purge_expired(&self) -> CoreResult<usize> {
                self.inner.purge_expired().await
            }

            async fn len(&self) -> CoreResult<usize> {
                self.inner.len().await
            }
        }
    }

    fn jwt() -> JwtManager {
        JwtManager::new(JwtConfig::new(
            "test-secret-key-that-is-long-enough-for-testing",
            "warden",
            "warden-clients",
            60,
        ))
        .unwrap()
    }

    fn subject() -> (Principal, Grants) {
        (
            Principal::new(PrincipalId::new("p-1"), "admin@company.com", "hash"),
            Grants::new(["Admin"].into_iter().collect(), ["Read"].into_iter().collect()),
        )
    }

    /// Flips one bit of the decoded signature and re-encodes it.
    fn tamper_signature(token: &str) -> String {
        let (message, signature) = token.rsplit_once('.').unwrap();
        let mut bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();
        bytes[0] ^= 0x01;
        format!("{}.{}", message, URL_SAFE_NO_PAD.encode(bytes))
    }

    #[tokio::test]
    async fn test_valid_token() {
        let verifier = TokenVerifier::new(jwt(), Arc::new(InMemoryRevocationStore::new()));
        let (principal, grants) = subject();
        let issued = verifier.jwt().issue(&principal, &grants).unwrap();

        let claims = verifier.verify(&issued.token).await.unwrap();
        assert_eq!(claims.sub, "p-1");
    }

    #[tokio::test]
    async fn test_expiry_is_strict() {
        let verifier = TokenVerifier::new(jwt(), Arc::new(InMemoryRevocationStore::new()));
        let (principal, grants) = subject();
        let issued = verifier.jwt().issue(&principal, &grants).unwrap();
        let exp = issued.claims.expires_at();

        assert!(verifier
            .verify_at(&issued.token, exp - Duration::seconds(1))
            .await
            .is_ok());
        assert!(matches!(
            verifier.verify_at(&issued.token, exp).await,
            Err(VerificationError::Expired)
        ));
    }

    #[tokio::test]
    async fn test_already_expired_token() {
        let verifier = TokenVerifier::new(jwt(), Arc::new(InMemoryRevocationStore::new()));
        let (principal, grants) = subject();
        let mut claims = verifier.jwt().issue(&principal, &grants).unwrap().claims;
        claims.exp = Utc::now().timestamp() - 1;
        let token = verifier.jwt().sign(&claims).unwrap();

        assert!(matches!(
            verifier.verify(&token).await,
            Err(VerificationError::Expired)
        ));
    }

    #[tokio::test]
    async fn test_revoked_token_and_sibling() {
        let store = Arc::new(InMemoryRevocationStore::new());
        let verifier = TokenVerifier::new(jwt(), store.clone());
        let (principal, grants) = subject();
        let first = verifier.jwt().issue(&principal, &grants).unwrap();
        let second = verifier.jwt().issue(&principal, &grants).unwrap();

        store
            .revoke(&first.claims.fingerprint(), first.claims.expires_at())
            .await
            .unwrap();

        assert!(matches!(
            verifier.verify(&first.token).await,
            Err(VerificationError::Revoked)
        ));
        assert!(verifier.verify(&second.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_tampered_signature_never_reaches_revocation() {
        let store = Arc::new(CountingStore::default());
        let verifier = TokenVerifier::new(jwt(), store.clone());
        let (principal, grants) = subject();
        let issued = verifier.jwt().issue(&principal, &grants).unwrap();
        let tampered = tamper_signature(&issued.token);

        let err = verifier.verify(&tampered).await.unwrap_err();
        assert!(matches!(err, VerificationError::SignatureMismatch));
        assert_eq!(store.lookups(), 0);

        // Same result once the genuine token is revoked.
        store
            .revoke(&issued.claims.fingerprint(), issued.claims.expires_at())
            .await
            .unwrap();
        let err = verifier.verify(&tampered).await.unwrap_err();
        assert!(matches!(err, VerificationError::SignatureMismatch));
        assert_eq!(store.lookups(), 0);

        assert!(verifier.verify(&issued.token).await.is_err());
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn test_tampered_payload_rejected() {
        let verifier = TokenVerifier::new(jwt(), Arc::new(InMemoryRevocationStore::new()));
        let (principal, grants) = subject();
        let issued = verifier.jwt().issue(&principal, &grants).unwrap();

        let mut claims = issued.claims.clone();
        claims.permissions.insert("Members.Delete");
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let parts: Vec<&str> = issued.token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(verifier.verify(&forged).await.unwrap_err().is_integrity_failure());
    }
}
