// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading for warden.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and pick the format from its extension
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders in the raw text
//! 3. Parse into [`WardenConfig`]
//! 4. Apply `WARDEN_*` environment overrides
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! WARDEN_JWT_SECRET=...
//! WARDEN_JWT_ISSUER=warden
//! WARDEN_JWT_AUDIENCE=warden-clients
//! WARDEN_JWT_EXPIRY_MINUTES=60
//! WARDEN_SERVER_PORT=9090
//! WARDEN_LOG_LEVEL=debug
//! ```

use std::env;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogLevel, SecretValue, WardenConfig};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "WARDEN";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for warden.
///
/// ```no_run
/// use warden_config::loader::ConfigLoader;
///
/// let config = ConfigLoader::new().load("warden.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve placeholders and apply overrides from the environment.
    resolve_env_vars: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
        }
    }

    /// Creates a builder for configuring the loader.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The file format is determined by the file extension:
    /// - `.yaml` or `.yml` - YAML format
    /// - `.toml` - TOML format
    /// - `.json` - JSON format
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<WardenConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;
        let mut config: WardenConfig = self.parse_content(&content, format, path)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config, |name| env::var(name).ok())?;
        }

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!(
            roles = config.directory.roles.len(),
            principals = config.directory.principals.len(),
            "Directory loaded"
        );

        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<WardenConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content, |name| env::var(name).ok())
        } else {
            content.to_string()
        };
        let mut config: WardenConfig = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config, |name| env::var(name).ok())?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Reads file content.
    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    /// Parses content based on format.
    fn parse_content<T: DeserializeOwned>(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<T> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content, |name| env::var(name).ok())
        } else {
            content.to_string()
        };

        parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    /// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    ///
    /// An unset variable without a default is left in place.
    fn resolve_env_placeholders<F>(&self, content: &str, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut result = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find('}') else {
                // Unterminated; keep the remainder verbatim.
                result.push_str(&rest[start..]);
                return result;
            };

            let inner = &after[..end];
            let (name, default) = match inner.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (inner, None),
            };

            match (lookup(name), default) {
                (Some(value), _) => result.push_str(&value),
                (None, Some(default)) => result.push_str(default),
                (None, None) => {
                    warn!("Environment variable '{}' not found", name);
                    result.push_str(&rest[start..start + 2 + end + 1]);
                }
            }

            rest = &after[end + 1..];
        }

        result.push_str(rest);
        result
    }

    /// Applies `<PREFIX>_*` overrides.
    fn apply_env_overrides<F>(&self, config: &mut WardenConfig, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| format!("{}_{}", self.env_prefix, suffix);

        if let Some(value) = lookup(&var("JWT_SECRET")) {
            config.jwt.secret = Some(SecretValue::new(value));
        }
        if let Some(value) = lookup(&var("JWT_ISSUER")) {
            config.jwt.issuer = Some(value);
        }
        if let Some(value) = lookup(&var("JWT_AUDIENCE")) {
            config.jwt.audience = Some(value);
        }
        if let Some(value) = lookup(&var("JWT_EXPIRY_MINUTES")) {
            let name = var("JWT_EXPIRY_MINUTES");
            config.jwt.expiry_minutes = Some(value.trim().parse().map_err(|_| {
                ConfigError::invalid_env_var(name, "expected a whole number of minutes")
            })?);
        }

        if let Some(value) = lookup(&var("SERVER_PORT")) {
            let name = var("SERVER_PORT");
            config.server.port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(name, "expected valid port number"))?;
        }

        if let Some(value) = lookup(&var("LOG_LEVEL")) {
            match parse_log_level(&value) {
                Some(level) => config.logging.level = level,
                None => warn!("Ignoring unknown log level '{}'", value),
            }
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for ConfigLoader.
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    env_prefix: Option<String>,
    resolve_env_vars: Option<bool>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environment prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Builds the ConfigLoader.
    pub fn build(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();

        if let Some(prefix) = self.env_prefix {
            loader.env_prefix = prefix;
        }
        if let Some(resolve_env_vars) = self.resolve_env_vars {
            loader.resolve_env_vars = resolve_env_vars;
        }

        loader
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parses a string based on format.
fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => parse_yaml(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

fn parse_yaml<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

/// Parses a log level string.
pub fn parse_log_level(value: &str) -> Option<LogLevel> {
    match value.trim().to_lowercase().as_str() {
        "trace" => Some(LogLevel::Trace),
        "debug" => Some(LogLevel::Debug),
        "info" => Some(LogLevel::Info),
        "warn" | "warning" => Some(LogLevel::Warn),
        "error" => Some(LogLevel::Error),
        _ => None,
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<WardenConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<WardenConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TEST_YAML: &str = r#"
server:
  host: 127.0.0.1
  port: 9090

jwt:
  secret: test-secret-key-that-is-long-enough-for-testing
  issuer: warden
  audience: warden-clients
  expiry_minutes: 60

rate_limit:
  login_permits: 5

logging:
  level: debug
  format: json

directory:
  roles:
    - name: Admin
      permissions: [Read, Write, Delete]
    - name: Reader
      permissions: [Read]
  principals:
    - email: admin@company.com
      password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA"
      roles: [Admin]
"#;

    const TEST_TOML: &str = r#"
[jwt]
secret = "test-secret-key-that-is-long-enough-for-testing"
issuer = "warden"
audience = "warden-clients"
expiry_minutes = 15

[revocation]
sweep_interval_secs = 30
"#;

    fn loader() -> ConfigLoader {
        ConfigLoader::new().with_env_vars(false)
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_load_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(TEST_YAML.as_bytes()).unwrap();

        let config = loader().load(file.path()).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.jwt.issuer.as_deref(), Some("warden"));
        assert_eq!(config.rate_limit.login_permits, 5);
        assert_eq!(config.rate_limit.global_permits, 60);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.directory.roles.len(), 2);
        assert_eq!(config.directory.roles[0].permissions, ["Read", "Write", "Delete"]);
        assert_eq!(config.directory.principals[0].roles, ["Admin"]);
    }

    #[test]
    fn test_load_toml() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(TEST_TOML.as_bytes()).unwrap();

        let config = loader().load(file.path()).unwrap();

        assert_eq!(config.jwt.expiry_minutes, Some(15));
        assert_eq!(config.revocation.sweep_interval_secs, 30);
        assert!(config.directory.principals.is_empty());
    }

    #[test]
    fn test_load_json() {
        let json = r#"{"jwt": {"secret": "test-secret-key-that-is-long-enough-for-testing",
            "issuer": "warden", "audience": "warden-clients", "expiry_minutes": 5}}"#;
        let config = loader().load_from_str(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.jwt.expiry_minutes, Some(5));
    }

    #[test]
    fn test_missing_jwt_is_fatal() {
        let result = loader().load_from_str("server:\n  port: 8080\n", ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::MissingField { .. })));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(format!("{}\n[extra]\nkey = 1\n", TEST_TOML).as_bytes())
            .unwrap();

        let result = loader().load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("warden.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("warden.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("warden.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("warden.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("warden.txt")).is_err());
        assert!(ConfigFormat::from_path(Path::new("warden")).is_err());
    }

    #[test]
    fn test_env_placeholders() {
        let lookup = env(&[("SECRET", "from-env")]);
        let loader = ConfigLoader::new();

        assert_eq!(
            loader.resolve_env_placeholders("secret: ${SECRET}", &lookup),
            "secret: from-env"
        );
        assert_eq!(
            loader.resolve_env_placeholders("port: ${PORT:8080}", &lookup),
            "port: 8080"
        );
        assert_eq!(
            loader.resolve_env_placeholders("x: ${MISSING} y", &lookup),
            "x: ${MISSING} y"
        );
        assert_eq!(
            loader.resolve_env_placeholders("x: ${OPEN", &lookup),
            "x: ${OPEN"
        );
    }

    #[test]
    fn test_phc_hash_is_not_a_placeholder() {
        let loader = ConfigLoader::new();
        let hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA";
        assert_eq!(loader.resolve_env_placeholders(hash, env(&[])), hash);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = loader().load_from_str(TEST_TOML, ConfigFormat::Toml).unwrap();

        ConfigLoader::new()
            .apply_env_overrides(
                &mut config,
                env(&[
                    ("WARDEN_JWT_SECRET", "overridden-secret-that-is-long-enough"),
                    ("WARDEN_JWT_ISSUER", "issuer-from-env"),
                    ("WARDEN_JWT_EXPIRY_MINUTES", "120"),
                    ("WARDEN_SERVER_PORT", "7070"),
                    ("WARDEN_LOG_LEVEL", "WARNING"),
                ]),
            )
            .unwrap();

        let jwt = config.jwt.resolve().unwrap();
        assert_eq!(jwt.secret, "overridden-secret-that-is-long-enough");
        assert_eq!(jwt.issuer, "issuer-from-env");
        assert_eq!(jwt.audience, "warden-clients");
        assert_eq!(jwt.expiry_minutes, 120);
        assert_eq!(config.server.port, 7070);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_env_override() {
        let mut config = WardenConfig::default();
        let result = ConfigLoader::new()
            .with_env_prefix("APP")
            .apply_env_overrides(&mut config, env(&[("APP_SERVER_PORT", "http")]));

        match result {
            Err(ConfigError::InvalidEnvVar { name, .. }) => assert_eq!(name, "APP_SERVER_PORT"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace"), Some(LogLevel::Trace));
        assert_eq!(parse_log_level("Debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warn));
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_loader_builder() {
        let loader = ConfigLoader::builder()
            .env_prefix("MYAPP")
            .resolve_env_vars(false)
            .build();

        assert_eq!(loader.env_prefix, "MYAPP");
        assert!(!loader.resolve_env_vars);
    }

    #[test]
    fn test_file_not_found() {
        let result = ConfigLoader::new().load("/nonexistent/path/warden.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }
}
