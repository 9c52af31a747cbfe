// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use warden_config::{ConfigLoader, WardenConfig};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::api_config;

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config = match ConfigLoader::new()
        .load(config_path)
        .map_err(BinError::from)
        .and_then(|config| api_config(&config).map(|_| config))
    {
        Ok(config) => config,
        Err(e) => {
            if args.format == OutputFormat::Json {
                let output = serde_json::json!({
                    "valid": false,
                    "config_path": config_path.display().to_string(),
                    "error": e.to_string(),
                });
                println!("{}", pretty(&output));
            }
            return Err(e);
        }
    };

    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            let jwt = config.jwt.resolve()?;

            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen:       {}:{}", config.server.host, config.server.port);
            println!("  Issuer:       {}", jwt.issuer);
            println!("  Audience:     {}", jwt.audience);
            println!("  Token TTL:    {} min", jwt.expiry_minutes);
            println!("  Roles:        {}", config.directory.roles.len());
            println!("  Principals:   {}", config.directory.principals.len());
            println!(
                "  Rate limit:   {}",
                if config.rate_limit.enabled { "enabled" } else { "disabled" }
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", pretty(&config));
            }
        }
        OutputFormat::Json => {
            let jwt = config.jwt.resolve()?;
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "listen": format!("{}:{}", config.server.host, config.server.port),
                    "issuer": jwt.issuer,
                    "audience": jwt.audience,
                    "expiry_minutes": jwt.expiry_minutes,
                    "role_count": config.directory.roles.len(),
                    "principal_count": config.directory.principals.len(),
                    "rate_limit_enabled": config.rate_limit.enabled,
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!("{}", pretty(&output));
        }
    }

    Ok(())
}

/// Returns non-fatal observations about a valid configuration.
pub(crate) fn collect_warnings(config: &WardenConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.directory.principals.is_empty() {
        warnings.push("No principals configured; every login will be rejected".to_string());
    }

    if !config.rate_limit.enabled {
        warnings.push("Rate limiting is disabled".to_string());
    }

    for role in &config.directory.roles {
        if role.permissions.is_empty() {
            warnings.push(format!("Role '{}' grants no permissions", role.name));
        }
    }

    warnings
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "(serialization error)".to_string())
}

// =============================================================================
// Tests
// =============================================================================
