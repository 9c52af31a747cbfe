// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration error types for warden-config.
//!
//! Every variant is fatal: the binary reports it and exits before a
//! listener is bound.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Why a configuration could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but its contents do not match the schema.
    #[error("cannot parse '{path}': {message}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// A value parsed but is out of range or inconsistent.
    #[error("{field}: {message}")]
    Validation {
        /// Dotted setting path, e.g. `server.port`.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A required setting has no value.
    ///
    /// The JWT secret, issuer, audience and expiry all end up here when
    /// absent or blank.
    #[error("required setting '{field}' is not set")]
    MissingField {
        /// Dotted setting path.
        field: String,
    },

    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The path does not exist.
    #[error("configuration file '{path}' does not exist")]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// A `WARDEN_*` override could not be parsed.
    #[error("environment variable {name}: {message}")]
    InvalidEnvVar {
        /// Variable name.
        name: String,
        /// Why its value was rejected.
        message: String,
    },

    /// Two principals normalize to the same email.
    #[error("principal '{email}' is defined more than once")]
    DuplicatePrincipal {
        /// Normalized email.
        email: String,
    },

    /// A principal references a role the directory does not define.
    #[error("principal '{email}' has undefined role '{role}'")]
    UnknownRole {
        /// Principal that references the role.
        email: String,
        /// Missing role name.
        role: String,
    },

    /// The file extension is not yaml, yml, toml or json.
    #[error("unsupported configuration format '{format}'")]
    UnsupportedFormat {
        /// Extension as found.
        format: String,
    },

    /// Deserialization failed before a path was known.
    #[error("cannot deserialize configuration: {message}")]
    Serialization {
        /// Deserializer diagnostic.
        message: String,
    },
}

impl ConfigError {
    /// Parse failure in `path`.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Out-of-range or inconsistent setting.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Required setting absent.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    /// Read failure for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Missing configuration file.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Rejected `WARDEN_*` override.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Unknown file extension.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Deserialization failure without a path.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
