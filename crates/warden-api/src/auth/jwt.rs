// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT signing and decoding.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use warden_core::{Fingerprint, Grants, Principal};

use super::claims::TokenClaims;
use super::error::{AuthError, AuthResult, VerificationError};

/// Recommended minimum secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

// =============================================================================
// JwtConfig
// =============================================================================

/// Token signing configuration.
///
/// Every field is required; there are no defaults.
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Shared HMAC secret.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer (`iss`).
    pub issuer: String,
    /// Token audience (`aud`).
    pub audience: String,
    /// Token lifetime in minutes.
    pub expiry_minutes: u32,
}

impl JwtConfig {
    /// Creates a configuration.
    pub fn new(
        secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        expiry_minutes: u32,
    ) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            expiry_minutes,
        }
    }

    /// Returns the token lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::minutes(i64::from(self.expiry_minutes))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AuthResult<()> {
        if self.secret.is_empty() {
            return Err(AuthError::configuration("JWT secret is not configured"));
        }
        if self.issuer.trim().is_empty() {
            return Err(AuthError::configuration("JWT issuer is not configured"));
        }
        if self.audience.trim().is_empty() {
            return Err(AuthError::configuration("JWT audience is not configured"));
        }
        if self.expiry_minutes == 0 {
            return Err(AuthError::configuration("JWT expiry must be at least one minute"));
        }
        if self.secret.len() < MIN_SECRET_LEN {
            tracing::warn!(
                "JWT secret is shorter than recommended ({} bytes)",
                MIN_SECRET_LEN
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry_minutes", &self.expiry_minutes)
            .finish()
    }
}

// =============================================================================
// IssuedToken / UnverifiedToken
// =============================================================================

/// A freshly signed token and the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS string.
    pub token: String,
    /// Embedded claims.
    pub claims: TokenClaims,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// What logout needs from a token whose signature has not been checked.
#[derive(Debug, Clone)]
pub struct UnverifiedToken {
    /// Revocation key.
    pub fingerprint: Fingerprint,
    /// Expiry claimed by the token.
    pub expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ExpiryClaims {
    exp: i64,
    #[serde(default)]
    jti: Option<String>,
}

// =============================================================================
// JwtManager
// =============================================================================

/// Signs and decodes HS256 access tokens.
///
/// Verification here covers structure, signature, issuer and audience.
/// Expiry and revocation are checked by [`TokenVerifier`](super::TokenVerifier).
#[derive(Clone)]
pub struct JwtManager {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl JwtManager {
    /// Creates a manager, failing on incomplete configuration.
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is compared strictly by the verifier, after issuer/audience.
        validation.validate_exp = false;
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Signs pre-built claims.
    pub fn sign(&self, claims: &TokenClaims) -> AuthResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Issues a token for `principal` carrying `grants`.
    pub fn issue(&self, principal: &Principal, grants: &Grants) -> AuthResult<IssuedToken> {
        let claims = TokenClaims::for_principal(
            principal,
            grants,
            &self.config.issuer,
            &self.config.audience,
            self.config.ttl(),
            Utc::now(),
        );
        let token = self.sign(&claims)?;
        Ok(IssuedToken {
            token,
            claims,
            expires_in: self.expires_in_secs(),
        })
    }

    /// Decodes a token, checking structure, signature, issuer and audience.
    pub fn decode_verified(&self, token: &str) -> Result<TokenClaims, VerificationError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => VerificationError::SignatureMismatch,
                ErrorKind::InvalidIssuer => VerificationError::IssuerMismatch,
                ErrorKind::InvalidAudience => VerificationError::AudienceMismatch,
                ErrorKind::ExpiredSignature => VerificationError::Expired,
                _ => VerificationError::Malformed(e.to_string()),
            })
    }

    /// Reads the expiry and revocation key without checking the signature.
    ///
    /// Only for revoking: revoking a forged token is harmless, trusting one
    /// is not.
    pub fn decode_unverified(&self, token: &str) -> AuthResult<UnverifiedToken> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = decode::<ExpiryClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::malformed(e.to_string()))?;

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::malformed("exp out of range"))?;
        let fingerprint = match claims.jti.as_deref() {
            Some(jti) if !jti.is_empty() => Fingerprint::from_jti(jti),
            _ => Fingerprint::from_token(token),
        };

        Ok(UnverifiedToken {
            fingerprint,
            expires_at,
        })
    }

    /// Lifetime of every token this manager issues.
    pub fn ttl(&self) -> Duration {
        self.config.ttl()
    }

    /// Returns the configured token lifetime in seconds.
    pub fn expires_in_secs(&self) -> i64 {
        self.config.ttl().num_seconds()
    }

    /// Returns the configured issuer.
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }

    /// Returns the configured audience.
    pub fn audience(&self) -> &str {
        &self.config.audience
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("expiry_minutes", &self.config.expiry_minutes)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::PrincipalId;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    fn manager() -> JwtManager {
        JwtManager::new(JwtConfig::new(SECRET, "warden", "warden-clients", 60)).unwrap()
    }

    fn principal() -> (Principal, Grants) {
        (
            Principal::new(PrincipalId::new("p-1"), "admin@company.com", "hash"),
            Grants::new(
                ["Admin"].into_iter().collect(),
                ["Read", "Write"].into_iter().collect(),
            ),
        )
    }

    #[test]
    fn test_config_requires_every_field() {
        assert!(JwtManager::new(JwtConfig::new("", "i", "a", 60)).is_err());
        assert!(JwtManager::new(JwtConfig::new(SECRET, " ", "a", 60)).is_err());
        assert!(JwtManager::new(JwtConfig::new(SECRET, "i", "", 60)).is_err());
        assert!(matches!(
            JwtManager::new(JwtConfig::new(SECRET, "i", "a", 0)),
            Err(AuthError::Configuration(_))
        ));
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let debug = format!("{:?}", JwtConfig::new(SECRET, "i", "a", 60));
        assert!(!debug.contains(SECRET));
        let json = serde_json::to_string(&JwtConfig::new(SECRET, "i", "a", 60)).unwrap();
        assert!(!json.contains(SECRET));
    }

    #[test]
    fn test_issue_and_decode() {
        let manager = manager();
        let (principal, grants) = principal();
        let issued = manager.issue(&principal, &grants).unwrap();

        assert_eq!(issued.expires_in, 3600);
        assert_eq!(issued.token.split('.').count(), 3);
        assert!(!issued.token.contains('+') && !issued.token.contains('/'));

        let claims = manager.decode_verified(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.roles, grants.roles);
        assert_eq!(claims.permissions, grants.permissions);
    }

    #[test]
    fn test_wrong_secret() {
        let other = JwtManager::new(JwtConfig::new(
            "another-secret-for-testing-purposes",
            "warden",
            "warden-clients",
            60,
        ))
        .unwrap();
        let (principal, grants) = principal();
        let token = other.issue(&principal, &grants).unwrap().token;

        assert!(matches!(
            manager().decode_verified(&token),
            Err(VerificationError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_issuer_and_audience_checked() {
        let manager = manager();
        let (principal, grants) = principal();

        let mut claims = manager.issue(&principal, &grants).unwrap().claims;
        claims.iss = "someone-else".into();
        let token = manager.sign(&claims).unwrap();
        assert!(matches!(
            manager.decode_verified(&token),
            Err(VerificationError::IssuerMismatch)
        ));

        claims.iss = "warden".into();
        claims.aud = "other-clients".into();
        let token = manager.sign(&claims).unwrap();
        assert!(matches!(
            manager.decode_verified(&token),
            Err(VerificationError::AudienceMismatch)
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let manager = manager();
        for token in ["", "abc", "invalid.token.here", "a.b", "..."] {
            assert!(
                matches!(manager.decode_verified(token), Err(VerificationError::Malformed(_))),
                "{:?}",
                token
            );
        }
    }

    #[test]
    fn test_decode_unverified() {
        let manager = manager();
        let (principal, grants) = principal();
        let issued = manager.issue(&principal, &grants).unwrap();

        let unverified = manager.decode_unverified(&issued.token).unwrap();
        assert_eq!(unverified.fingerprint, issued.claims.fingerprint());
        assert_eq!(unverified.expires_at, issued.claims.expires_at());
    }

    #[test]
    fn test_decode_unverified_ignores_signature_and_expiry() {
        let config = JwtConfig::new("another-secret-for-testing-purposes", "x", "y", 1);
        let other = JwtManager::new(config).unwrap();
        let (principal, grants) = principal();
        let mut claims = other.issue(&principal, &grants).unwrap().claims;
        claims.exp = claims.iat - 10;
        let token = other.sign(&claims).unwrap();

        let unverified = manager().decode_unverified(&token).unwrap();
        assert!(unverified.expires_at < Utc::now());
    }

    #[test]
    fn test_decode_unverified_rejects_garbage() {
        assert!(matches!(
            manager().decode_unverified("not-a-token"),
            Err(AuthError::TokenMalformed { .. })
        ));
    }
}
