// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for warden.
//!
//! # Schema Structure
//!
//! ```text
//! WardenConfig
//! ├── server: ServerConfig
//! ├── jwt: JwtSection            (every field required)
//! ├── rate_limit: RateLimitSection
//! ├── revocation: RevocationSection
//! ├── password: PasswordHasherConfig
//! ├── logging: LoggingConfig
//! └── directory: DirectoryConfig
//! ```

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize, Serializer};
use warden_core::store::normalize_email;
use warden_core::{CoreError, InMemoryCredentialStore, PasswordHasherConfig};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default API port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimum JWT secret length in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Default login attempts per window.
pub const DEFAULT_LOGIN_PERMITS: u32 = 10;

/// Default requests per window across all routes.
pub const DEFAULT_GLOBAL_PERMITS: u32 = 60;

/// Default rate limit window in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Default interval between revocation sweeps in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for warden.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Token signing settings.
    #[serde(default)]
    pub jwt: JwtSection,

    /// Per-client request limits.
    #[serde(default)]
    pub rate_limit: RateLimitSection,

    /// Revocation store maintenance.
    #[serde(default)]
    pub revocation: RevocationSection,

    /// Argon2 cost parameters for newly hashed passwords.
    #[serde(default)]
    pub password: PasswordHasherConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Roles and principals seeded into the credential store.
    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl WardenConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.jwt.validate()?;
        self.server.validate()?;
        self.rate_limit.validate()?;
        self.revocation.validate()?;

        self.password
            .hasher()
            .map_err(|e| ConfigError::validation("password", e.to_string()))?;

        self.directory.validate()?;

        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    DEFAULT_SERVER_PORT
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::validation("server.port", "cannot be 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// =============================================================================
// JWT Configuration
// =============================================================================

/// Token signing settings as written in the file.
///
/// Every field is optional at parse time so that environment overrides can
/// fill them in; [`JwtSection::resolve`] enforces presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwtSection {
    /// HMAC signing secret.
    #[serde(default)]
    pub secret: Option<SecretValue>,

    /// Token issuer.
    #[serde(default)]
    pub issuer: Option<String>,

    /// Token audience.
    #[serde(default)]
    pub audience: Option<String>,

    /// Token lifetime in minutes.
    #[serde(default)]
    pub expiry_minutes: Option<u32>,
}

/// Fully specified token signing settings.
#[derive(Clone, PartialEq, Eq)]
pub struct JwtSettings {
    /// HMAC signing secret.
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Token audience.
    pub audience: String,
    /// Token lifetime in minutes.
    pub expiry_minutes: u32,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"***")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry_minutes", &self.expiry_minutes)
            .finish()
    }
}

impl JwtSection {
    /// Returns the settings, failing on the first missing or empty field.
    pub fn resolve(&self) -> ConfigResult<JwtSettings> {
        let secret = self
            .secret
            .as_ref()
            .map(SecretValue::expose)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::missing_field("jwt.secret"))?;
        let issuer = non_empty(self.issuer.as_deref(), "jwt.issuer")?;
        let audience = non_empty(self.audience.as_deref(), "jwt.audience")?;
        let expiry_minutes = self
            .expiry_minutes
            .ok_or_else(|| ConfigError::missing_field("jwt.expiry_minutes"))?;

        Ok(JwtSettings {
            secret: secret.to_string(),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            expiry_minutes,
        })
    }

    fn validate(&self) -> ConfigResult<()> {
        let settings = self.resolve()?;

        if settings.secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::validation(
                "jwt.secret",
                format!("must be at least {} bytes", MIN_JWT_SECRET_LEN),
            ));
        }
        if settings.expiry_minutes == 0 {
            return Err(ConfigError::validation(
                "jwt.expiry_minutes",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

fn non_empty<'a>(value: Option<&'a str>, field: &str) -> ConfigResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::missing_field(field)),
    }
}

// =============================================================================
// Rate Limit Configuration
// =============================================================================

/// Fixed-window request limits, keyed by client address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitSection {
    /// Whether limits are enforced.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Login attempts allowed per window.
    #[serde(default = "default_login_permits")]
    pub login_permits: u32,

    /// Login window length in seconds.
    #[serde(default = "default_window_secs")]
    pub login_window_secs: u64,

    /// Requests allowed per window on any route.
    #[serde(default = "default_global_permits")]
    pub global_permits: u32,

    /// Global window length in seconds.
    #[serde(default = "default_window_secs")]
    pub global_window_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_login_permits() -> u32 {
    DEFAULT_LOGIN_PERMITS
}

fn default_global_permits() -> u32 {
    DEFAULT_GLOBAL_PERMITS
}

fn default_window_secs() -> u64 {
    DEFAULT_WINDOW_SECS
}

impl RateLimitSection {
    fn validate(&self) -> ConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }

        let checks = [
            ("rate_limit.login_permits", u64::from(self.login_permits)),
            ("rate_limit.login_window_secs", self.login_window_secs),
            ("rate_limit.global_permits", u64::from(self.global_permits)),
            ("rate_limit.global_window_secs", self.global_window_secs),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(ConfigError::validation(field, "must be greater than 0"));
            }
        }
        Ok(())
    }
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            enabled: true,
            login_permits: DEFAULT_LOGIN_PERMITS,
            login_window_secs: DEFAULT_WINDOW_SECS,
            global_permits: DEFAULT_GLOBAL_PERMITS,
            global_window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

// =============================================================================
// Revocation Configuration
// =============================================================================

/// Revocation store maintenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevocationSection {
    /// Seconds between sweeps of expired entries.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

impl RevocationSection {
    fn validate(&self) -> ConfigResult<()> {
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::validation(
                "revocation.sweep_interval_secs",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for RevocationSection {
    fn default() -> Self {
        Self {
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
    /// Condensed single-line output.
    Compact,
}

// =============================================================================
// Directory Configuration
// =============================================================================

/// Roles and principals seeded into the in-memory credential store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Role definitions.
    #[serde(default)]
    pub roles: Vec<RoleEntry>,

    /// Principal definitions.
    #[serde(default)]
    pub principals: Vec<PrincipalEntry>,
}

/// A role and the permissions it grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleEntry {
    /// Role name.
    pub name: String,
    /// Granted permission names.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// A principal and its assigned roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrincipalEntry {
    /// Login email.
    pub email: String,
    /// Argon2 PHC string, as printed by `warden hash-password`.
    pub password_hash: SecretValue,
    /// Assigned role names.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl DirectoryConfig {
    fn validate(&self) -> ConfigResult<()> {
        let mut roles = HashSet::new();
        for (i, role) in self.roles.iter().enumerate() {
            if role.name.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("directory.roles[{}].name", i),
                    "cannot be empty",
                ));
            }
            if !roles.insert(role.name.as_str()) {
                return Err(ConfigError::validation(
                    format!("directory.roles[{}].name", i),
                    format!("role '{}' is defined twice", role.name),
                ));
            }
        }

        let mut emails = HashSet::new();
        for (i, principal) in self.principals.iter().enumerate() {
            let email = normalize_email(&principal.email);
            if email.is_empty() || !email.contains('@') {
                return Err(ConfigError::validation(
                    format!("directory.principals[{}].email", i),
                    "must be an email address",
                ));
            }
            if !principal.password_hash.expose().starts_with("$argon2") {
                return Err(ConfigError::validation(
                    format!("directory.principals[{}].password_hash", i),
                    "must be an Argon2 PHC string (see `warden hash-password`)",
                ));
            }
            if let Some(role) = principal.roles.iter().find(|r| !roles.contains(r.as_str())) {
                return Err(ConfigError::UnknownRole {
                    email,
                    role: role.clone(),
                });
            }
            if !emails.insert(email.clone()) {
                return Err(ConfigError::DuplicatePrincipal { email });
            }
        }

        Ok(())
    }

    /// Builds an in-memory credential store holding this directory.
    pub fn to_store(&self) -> ConfigResult<InMemoryCredentialStore> {
        let store = InMemoryCredentialStore::new();

        for role in &self.roles {
            store.add_role(role.name.clone(), role.permissions.iter().cloned());
        }

        for principal in &self.principals {
            store
                .add_principal(
                    &principal.email,
                    principal.password_hash.expose(),
                    principal.roles.iter().cloned(),
                )
                .map_err(|e| match e {
                    CoreError::DuplicatePrincipal { email } => {
                        ConfigError::DuplicatePrincipal { email }
                    }
                    CoreError::UnknownRole { role } => ConfigError::UnknownRole {
                        email: normalize_email(&principal.email),
                        role,
                    },
                    other => ConfigError::validation("directory", other.to_string()),
                })?;
        }

        Ok(store)
    }
}

// =============================================================================
// Secret Value
// =============================================================================

/// A value that must never appear in logs or output.
///
/// `Debug`, `Display`, and serialization all print `***`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plaintext.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretValue(***)")
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

// =============================================================================
// Tests
// =============================================================================
