// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Token Lifecycle Integration Tests
//!
//! Exercises the gateway, verifier and revocation store together, without
//! going through HTTP.
//!
//! ## Test Categories
//!
//! - `test_lifecycle_*`: Issued -> Active -> Expired / Revoked
//! - `test_revocation_*`: Store growth and reclamation
//! - `test_concurrent_*`: Parallel logins and logouts

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use warden_api::auth::LoginRequest;
use warden_api::{AuthError, VerificationError};
use warden_core::{
    CredentialStore, Fingerprint, InMemoryRevocationStore, PermissionResolver, RevocationStore,
    RevocationSweeper,
};
use warden_tests::prelude::*;

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_lifecycle_login_matches_resolver() {
    let app = TestApp::new();
    let store: Arc<dyn CredentialStore> = Arc::new(app.credentials().clone());

    for (email, password) in [
        (ADMIN_EMAIL, ADMIN_PASSWORD),
        (READER_EMAIL, READER_PASSWORD),
        (NOBODY_EMAIL, NOBODY_PASSWORD),
    ] {
        let outcome = app
            .state()
            .gateway()
            .login(&LoginRequest::new(email, password))
            .await
            .unwrap();

        let principal = store.find_by_email(email).await.unwrap().unwrap();
        let grants = PermissionResolver::new(store.clone())
            .resolve(&principal.id)
            .await
            .unwrap();

        assert_eq!(outcome.roles, grants.roles, "roles of {}", email);
        assert_eq!(outcome.permissions, grants.permissions, "permissions of {}", email);
    }
}

#[tokio::test]
async fn test_lifecycle_invalid_credentials_are_one_error() {
    let app = TestApp::new();
    let gateway = app.state().gateway();

    let wrong_password = gateway
        .login(&LoginRequest::new(ADMIN_EMAIL, "wrong"))
        .await
        .unwrap_err();
    let unknown_email = gateway
        .login(&LoginRequest::new("ghost@company.com", ADMIN_PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.public_message(), unknown_email.public_message());
}

#[tokio::test]
async fn test_lifecycle_active_then_expired() {
    let app = TestApp::new();
    let token = app.login_token(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let verifier = app.state().verifier();

    let claims = verifier.verify(&token).await.unwrap();
    let expiry = claims.expires_at();

    // Zero skew: valid one second before expiry, rejected exactly at it.
    assert!(verifier
        .verify_at(&token, expiry - chrono::Duration::seconds(1))
        .await
        .is_ok());
    assert!(matches!(
        verifier.verify_at(&token, expiry).await,
        Err(VerificationError::Expired)
    ));
}

#[tokio::test]
async fn test_lifecycle_revoked_never_returns_to_active() {
    let app = TestApp::new();
    let token = app.login_token(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let verifier = app.state().verifier();

    app.state().gateway().logout(Some(&token)).await.unwrap();

    for _ in 0..3 {
        assert!(matches!(
            verifier.verify(&token).await,
            Err(VerificationError::Revoked)
        ));
    }
    // A repeated logout neither fails nor reactivates the token.
    app.state().gateway().logout(Some(&token)).await.unwrap();
    assert!(matches!(
        verifier.verify(&token).await,
        Err(VerificationError::Revoked)
    ));
    assert_eq!(app.revocations().entry_count(), 1);
}

#[tokio::test]
async fn test_lifecycle_signature_checked_before_revocation() {
    let app = TestApp::new();
    let token = app.login_token(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    app.state().gateway().logout(Some(&token)).await.unwrap();

    let (head, signature) = token.rsplit_once('.').unwrap();
    let flipped = if signature.starts_with('A') { "B" } else { "A" };
    let tampered = format!("{}.{}{}", head, flipped, &signature[1..]);

    assert!(matches!(
        app.state().verifier().verify(&tampered).await,
        Err(VerificationError::SignatureMismatch)
    ));
}

#[tokio::test]
async fn test_lifecycle_logout_accepts_unverified_token() {
    let app = TestApp::new();
    let principal = app
        .credentials()
        .find_by_email(ADMIN_EMAIL)
        .await
        .unwrap()
        .unwrap();
    let forged = JwtFixtures::foreign_secret()
        .issue(&principal, &Default::default())
        .unwrap();

    let outcome = app
        .state()
        .gateway()
        .logout(Some(&forged.token))
        .await
        .unwrap();

    assert!(!outcome.already_expired);
    assert_eq!(outcome.fingerprint, Fingerprint::from_jti(&forged.claims.jti));
    assert_eq!(app.revocations().entry_count(), 1);
}

#[tokio::test]
async fn test_lifecycle_logout_rejects_missing_and_garbage() {
    let app = TestApp::new();
    let gateway = app.state().gateway();

    assert!(matches!(
        gateway.logout(None).await,
        Err(AuthError::TokenMissing)
    ));
    assert!(matches!(
        gateway.logout(Some("   ")).await,
        Err(AuthError::TokenMissing)
    ));
    assert!(matches!(
        gateway.logout(Some("a.b.c")).await,
        Err(AuthError::TokenMalformed { .. })
    ));
}

// =============================================================================
// Revocation Store
// =============================================================================

#[tokio::test]
async fn test_revocation_entry_lives_exactly_as_long_as_token() {
    let app = TestApp::new();
    let token = app.login_token(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let outcome = app.state().gateway().logout(Some(&token)).await.unwrap();
    let store = app.revocations();

    let just_before = outcome.expires_at - chrono::Duration::seconds(1);
    assert!(store.is_revoked_at(&outcome.fingerprint, just_before));
    assert!(!store.is_revoked_at(&outcome.fingerprint, outcome.expires_at));
    // The expired entry was dropped by the lookup itself.
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_revocation_occupancy_is_bounded() {
    let store = InMemoryRevocationStore::new();
    let now = Utc::now();

    for round in 0..5 {
        let start = now + chrono::Duration::minutes(round * 10);
        for i in 0..200 {
            let fingerprint = Fingerprint::from_jti(&format!("round-{}-token-{}", round, i));
            store.revoke_at(&fingerprint, start + chrono::Duration::seconds(30), start);
        }
        assert_eq!(store.entry_count(), 200);

        // Every token from this round has expired before the next one starts.
        let later = start + chrono::Duration::minutes(1);
        assert_eq!(store.purge_expired_at(later), 200);
        assert!(store.is_empty());
    }
}

#[tokio::test]
async fn test_revocation_sweeper_reclaims_in_background() {
    init_test_logging();
    let store = Arc::new(InMemoryRevocationStore::new());
    let now = Utc::now();
    for i in 0..50 {
        store.revoke_at(
            &Fingerprint::from_jti(&format!("short-{}", i)),
            now + chrono::Duration::milliseconds(50),
            now,
        );
    }
    assert_eq!(store.entry_count(), 50);

    let sweeper = RevocationSweeper::new(store.clone()).with_interval(Duration::from_millis(20));
    let task = sweeper.start();

    tokio::time::timeout(Duration::from_secs(5), async {
        while !store.is_empty() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("sweeper should reclaim expired entries");

    sweeper.stop();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("sweeper should stop")
        .unwrap();
    assert!(!sweeper.is_running());
}

#[tokio::test]
async fn test_revocation_store_through_trait_object() {
    let store: Arc<dyn RevocationStore> = Arc::new(InMemoryRevocationStore::new());
    let fingerprint = Fingerprint::from_token("opaque-token");

    store
        .revoke(&fingerprint, Utc::now() + chrono::Duration::minutes(5))
        .await
        .unwrap();
    store
        .revoke(&fingerprint, Utc::now() + chrono::Duration::minutes(5))
        .await
        .unwrap();
    store
        .revoke(&Fingerprint::from_jti("gone"), Utc::now() - chrono::Duration::seconds(1))
        .await
        .unwrap();

    assert!(store.is_revoked(&fingerprint).await.unwrap());
    assert_eq!(store.len().await.unwrap(), 1);
    assert_eq!(store.purge_expired().await.unwrap(), 0);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_login_and_logout() {
    let app = TestApp::new();
    let gateway = app.state().gateway.clone();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let gateway = gateway.clone();
            tokio::spawn(async move {
                let outcome = gateway
                    .login(&LoginRequest::new(ADMIN_EMAIL, ADMIN_PASSWORD))
                    .await
                    .unwrap();
                gateway.logout(Some(&outcome.token)).await.unwrap();
                outcome.token
            })
        })
        .collect();

    let mut tokens = Vec::new();
    for task in tasks {
        tokens.push(task.await.unwrap());
    }

    assert_eq!(app.revocations().entry_count(), 16);
    for token in &tokens {
        assert!(matches!(
            app.state().verifier().verify(token).await,
            Err(VerificationError::Revoked)
        ));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_verification_during_revocation() {
    let app = TestApp::new();
    let keep = app.login_token(READER_EMAIL, READER_PASSWORD).await;
    let verifier = app.state().verifier.clone();
    let gateway = app.state().gateway.clone();

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let verifier = verifier.clone();
            let keep = keep.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    verifier.verify(&keep).await.unwrap();
                }
            })
        })
        .collect();

    let mut revoked = Vec::new();
    for _ in 0..8 {
        let token = app.login_token(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        gateway.logout(Some(&token)).await.unwrap();
        revoked.push(token);
    }

    for reader in readers {
        reader.await.unwrap();
    }
    assert!(verifier.verify(&keep).await.is_ok());
    for token in &revoked {
        assert!(verifier.verify(token).await.is_err());
    }
}
