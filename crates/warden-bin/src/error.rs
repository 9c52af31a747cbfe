// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the warden binary.
//!
//! Every failure maps to a process exit code:
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 1    | Configuration unusable; no listener was bound        |
//! | 2    | Startup failed (logger, token manager)               |
//! | 3    | A command failed (hashing, reading input)            |
//! | 4    | I/O failure                                          |
//! | 5    | The HTTP server failed while serving                 |

use thiserror::Error;
use warden_api::{ApiError, AuthError};
use warden_config::ConfigError;

/// Result type alias for warden-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Exit code for an unusable configuration.
pub const EXIT_CONFIG: i32 = 1;
/// Exit code for startup failures.
pub const EXIT_STARTUP: i32 = 2;
/// Exit code for failed commands.
pub const EXIT_COMMAND: i32 = 3;
/// Exit code for I/O failures.
pub const EXIT_IO: i32 = 4;
/// Exit code for server failures.
pub const EXIT_SERVER: i32 = 5;

/// Errors surfaced by the `warden` binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration file could not be loaded or validated.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A setting is unusable even though the file parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A component could not be started.
    #[error("startup failed: {0}")]
    Startup(String),

    /// A one-shot command failed.
    #[error("{0}")]
    Command(String),

    /// Reading or writing failed.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP server stopped with an error.
    #[error("server failed: {0}")]
    Server(#[from] ApiError),
}

impl BinError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates a startup error.
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Creates a command error.
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    /// Returns the process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::InvalidConfig(_) => EXIT_CONFIG,
            Self::Startup(_) => EXIT_STARTUP,
            Self::Command(_) => EXIT_COMMAND,
            Self::Io(_) => EXIT_IO,
            Self::Server(_) => EXIT_SERVER,
        }
    }
}

impl From<AuthError> for BinError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Configuration(msg) => Self::InvalidConfig(msg),
            other => Self::Startup(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        // Alternate formatting keeps the whole context chain on one line.
        Self::Command(format!("{:#}", err))
    }
}

/// Prints `error` and its causes to stderr, then exits.
pub fn report_error_and_exit(error: BinError) -> ! {
    eprintln!("warden: {}", error);

    let mut cause = std::error::Error::source(&error);
    while let Some(inner) = cause {
        eprintln!("  because: {}", inner);
        cause = inner.source();
    }

    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            BinError::invalid_config("port is 0").to_string(),
            "invalid configuration: port is 0"
        );
        assert_eq!(
            BinError::command("Password cannot be empty").to_string(),
            "Password cannot be empty"
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BinError::invalid_config("x").exit_code(), EXIT_CONFIG);
        assert_eq!(BinError::startup("x").exit_code(), EXIT_STARTUP);
        assert_eq!(BinError::command("x").exit_code(), EXIT_COMMAND);
        assert_eq!(
            BinError::from(std::io::Error::other("disk gone")).exit_code(),
            EXIT_IO
        );
        assert_eq!(
            BinError::from(ApiError::internal("bind failed")).exit_code(),
            EXIT_SERVER
        );
    }

    #[test]
    fn test_config_failures_exit_one() {
        let err = BinError::from(ConfigError::missing_field("jwt.secret"));
        assert_eq!(err.exit_code(), 1);

        let err = BinError::from(AuthError::configuration("secret too short"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_anyhow_keeps_context() {
        let err = anyhow::anyhow!("pipe closed").context("Failed to read stdin");
        let err = BinError::from(err);
        assert_eq!(err.exit_code(), EXIT_COMMAND);
        assert_eq!(err.to_string(), "Failed to read stdin: pipe closed");
    }
}
