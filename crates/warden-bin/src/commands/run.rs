// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tracing::info;
use warden_config::ConfigLoader;

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::logging::init_logging;
use crate::runtime::RuntimeBuilder;

/// Executes the `run` command to start the service.
///
/// Configuration errors are returned before logging is installed or any
/// listener is bound.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    let config = ConfigLoader::new().load(&cli.config)?;

    init_logging(
        cli.effective_log_level(config.logging.level.as_str()),
        cli.effective_log_format(config.logging.format.into()),
    )?;
    info!(path = %cli.config.display(), "Configuration loaded");

    let runtime = RuntimeBuilder::new()
        .config(config)
        .port(args.port)
        .build()?;

    runtime.run().await
}
