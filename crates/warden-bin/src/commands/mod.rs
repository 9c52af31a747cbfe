// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! One module per subcommand.

mod hash_password;
mod run;
mod validate;
mod version;

pub use hash_password::{hash_password, hash_password_value};
pub use run::run;
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands, LogFormat};
use crate::error::BinResult;
use crate::logging::init_logging;

/// Dispatches the parsed command.
///
/// `run` installs logging itself once the configuration is known; the other
/// commands log warnings only unless asked otherwise, so that their own
/// output stays readable.
pub async fn execute(cli: Cli) -> BinResult<()> {
    let command = cli.effective_command();

    if !matches!(command, Commands::Run(_)) {
        init_logging(
            cli.effective_log_level("warn"),
            cli.effective_log_format(LogFormat::Text),
        )?;
    }

    match command {
        Commands::Run(args) => run::run(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::HashPassword(args) => hash_password::hash_password(&cli, args),
        Commands::Version => version::version(&cli),
    }
}
