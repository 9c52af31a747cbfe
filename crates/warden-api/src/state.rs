// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use warden_core::{
    CredentialStore, CredentialValidator, InMemoryRevocationStore, PermissionResolver,
    RevocationStore,
};

use crate::auth::{AuthError, AuthResult, AuthenticationGateway, JwtManager, TokenVerifier};
use crate::config::ApiConfig;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// The gateway and the verifier share one [`JwtManager`] and one
/// [`RevocationStore`], so a logout through the gateway is immediately
/// visible to the verifier.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Login and logout.
    pub gateway: Arc<AuthenticationGateway>,
    /// Per-request token verification.
    pub verifier: Arc<TokenVerifier>,
    /// Revoked token fingerprints.
    pub revocations: Arc<dyn RevocationStore>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the authentication gateway.
    pub fn gateway(&self) -> &AuthenticationGateway {
        &self.gateway
    }

    /// Returns the token verifier.
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Returns the revocation store.
    pub fn revocations(&self) -> &Arc<dyn RevocationStore> {
        &self.revocations
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("gateway", &self.gateway)
            .field("revocations", &self.revocations.name())
            .finish()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    credential_store: Option<Arc<dyn CredentialStore>>,
    revocation_store: Option<Arc<dyn RevocationStore>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the credential store.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credential_store = Some(store);
        self
    }

    /// Sets the revocation store. Defaults to [`InMemoryRevocationStore`].
    pub fn revocation_store(mut self, store: Arc<dyn RevocationStore>) -> Self {
        self.revocation_store = Some(store);
        self
    }

    /// Builds the AppState.
    ///
    /// Fails with [`AuthError::Configuration`] when the configuration or the
    /// credential store is missing, or the token settings are incomplete.
    pub fn build(self) -> AuthResult<AppState> {
        let config = self
            .config
            .ok_or_else(|| AuthError::configuration("API configuration not set"))?;
        let credentials = self
            .credential_store
            .ok_or_else(|| AuthError::configuration("Credential store not set"))?;
        let revocations = self
            .revocation_store
            .unwrap_or_else(|| Arc::new(InMemoryRevocationStore::new()));

        let jwt = JwtManager::new(config.jwt.clone())?;
        let validator = CredentialValidator::new(credentials.clone(), config.password)
            .map_err(|e| AuthError::configuration(e.to_string()))?;
        let resolver = PermissionResolver::new(credentials);

        let gateway =
            AuthenticationGateway::new(validator, resolver, jwt.clone(), revocations.clone());
        let verifier = TokenVerifier::new(jwt, revocations.clone());

        Ok(AppState {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            verifier: Arc::new(verifier),
            revocations,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<AuthenticationGateway> {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
