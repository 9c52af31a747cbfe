// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::{self, Read};

use anyhow::Context;
use warden_core::PasswordHasherConfig;

use crate::cli::{Cli, HashPasswordArgs};
use crate::error::{BinError, BinResult};

/// Executes the `hash-password` command.
///
/// The hash goes to stdout and usage hints to stderr, so the output can be
/// piped straight into a file.
pub fn hash_password(_cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let input = if args.stdin {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read password from stdin")?;
        input
    } else {
        args.value
            .ok_or_else(|| BinError::command("No password provided. Use --stdin or pass a value"))?
    };

    let hash = hash_password_value(&input, PasswordHasherConfig::default())?;

    println!("{}", hash);

    eprintln!();
    eprintln!("Use this value in the directory section of your configuration:");
    eprintln!("  password_hash: \"{}\"", hash);

    Ok(())
}

/// Hashes `input` after dropping one trailing line ending.
pub fn hash_password_value(input: &str, config: PasswordHasherConfig) -> BinResult<String> {
    let password = input
        .strip_suffix('\n')
        .map(|s| s.strip_suffix('\r').unwrap_or(s))
        .unwrap_or(input);

    if password.is_empty() {
        return Err(BinError::command("Password cannot be empty"));
    }

    config
        .hash(password)
        .map_err(|e| BinError::command(format!("Hashing failed: {}", e)))
}

// =============================================================================
// Tests
// =============================================================================
