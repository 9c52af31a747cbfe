// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Command line surface of the `warden` binary.
//!
//! `run` is implied when no subcommand is given. `validate` and
//! `hash-password` never bind a listener.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// warden - bearer token credential service
///
/// Authenticates principals, issues signed bearer tokens carrying their
/// roles and permissions, and revokes tokens on logout.
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    author = "Sylvex <contact@sylvex.io>",
    version = warden_api::VERSION,
    about = "Bearer token credential service",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// YAML, TOML or JSON configuration file
    #[arg(
        short,
        long,
        default_value = "warden.yaml",
        env = "WARDEN_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, env = "WARDEN_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json, compact); overrides the config file
    #[arg(long, env = "WARDEN_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the login, me and logout endpoints
    Run(RunArgs),

    /// Check the configuration and exit
    ///
    /// Exits 1 when the JWT section is incomplete or the directory is
    /// inconsistent.
    Validate(ValidateArgs),

    /// Hash a password for the directory section
    ///
    /// Prints an Argon2id PHC string to paste into a principal's
    /// `password_hash`.
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),

    /// Print version and build details
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Override the configured listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation (secrets redacted)
    #[arg(short, long)]
    pub show_config: bool,

    /// How to print the validation report
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `hash-password` command.
#[derive(Args, Debug, Clone)]
pub struct HashPasswordArgs {
    /// Password to hash
    #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
    pub value: Option<String>,

    /// Read the password from stdin
    #[arg(long)]
    pub stdin: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Multi-line human output
    #[default]
    Text,
    /// One JSON object per event
    Json,
    /// Single-line events without span context
    Compact,
}

impl From<warden_config::LogFormat> for LogFormat {
    fn from(format: warden_config::LogFormat) -> Self {
        match format {
            warden_config::LogFormat::Text => LogFormat::Text,
            warden_config::LogFormat::Json => LogFormat::Json,
            warden_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Report format for one-shot commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain report
    #[default]
    Text,
    /// Machine-readable report
    Json,
}

// =============================================================================
// Effective Settings
// =============================================================================

impl Cli {
    /// Parses `std::env::args`.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The requested subcommand, or `run` with default arguments.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Log level after applying flags.
    ///
    /// `-q` and `-v` win over `--log-level`, which wins over `configured`.
    pub fn effective_log_level<'a>(&'a self, configured: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(configured)
        }
    }

    /// `--log-format` if given, else `configured`.
    pub fn effective_log_format(&self, configured: LogFormat) -> LogFormat {
        self.log_format.unwrap_or(configured)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["warden"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Run(_)));
    }

    #[test]
    fn test_run_port_override() {
        let cli = Cli::parse_from(["warden", "run", "--port", "9000"]);
        match cli.command {
            Some(Commands::Run(args)) => assert_eq!(args.port, Some(9000)),
            other => panic!("Expected Run command, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["warden", "validate", "--format", "json"]);
        match cli.command {
            Some(Commands::Validate(args)) => {
                assert_eq!(args.format, OutputFormat::Json);
                assert!(!args.show_config);
            }
            other => panic!("Expected Validate command, got {:?}", other),
        }
    }

    #[test]
    fn test_hash_password_command() {
        let cli = Cli::parse_from(["warden", "hash-password", "correct-pw"]);
        match cli.command {
            Some(Commands::HashPassword(args)) => {
                assert_eq!(args.value.as_deref(), Some("correct-pw"));
                assert!(!args.stdin);
            }
            other => panic!("Expected HashPassword command, got {:?}", other),
        }

        let cli = Cli::parse_from(["warden", "hash-password", "--stdin"]);
        assert!(matches!(cli.command, Some(Commands::HashPassword(ref a)) if a.stdin));
    }

    #[test]
    fn test_hash_password_requires_input() {
        assert!(Cli::try_parse_from(["warden", "hash-password"]).is_err());
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["warden", "-c", "/etc/warden/warden.yaml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/warden/warden.yaml"));
    }

    #[test]
    fn test_log_level_precedence() {
        let cli = Cli::parse_from(["warden", "-l", "trace"]);
        assert_eq!(cli.effective_log_level("info"), "trace");

        let cli = Cli::parse_from(["warden", "-q", "-l", "trace"]);
        assert_eq!(cli.effective_log_level("info"), "warn");

        let cli = Cli::parse_from(["warden", "-v"]);
        assert_eq!(cli.effective_log_level("info"), "debug");
    }

    #[test]
    fn test_log_format() {
        let cli = Cli::parse_from(["warden", "--log-format", "json"]);
        assert_eq!(cli.effective_log_format(LogFormat::Text), LogFormat::Json);
        assert_eq!(
            LogFormat::from(warden_config::LogFormat::Compact),
            LogFormat::Compact
        );
    }
}
