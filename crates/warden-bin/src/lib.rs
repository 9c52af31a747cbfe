// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-bin
//!
//! The `warden` executable. `main` parses a [`Cli`], then
//! [`commands::execute`] dispatches. The `run` command loads the config,
//! installs logging, and hands off to [`WardenRuntime`], which owns the
//! credential directory, the revocation sweeper and the HTTP server until
//! the [`ShutdownCoordinator`] flag is raised.
//!
//! ## Usage
//!
//! ```bash
//! # Start the service (default command)
//! warden -c /etc/warden/warden.yaml
//!
//! # Validate configuration
//! warden validate --format json
//!
//! # Produce a password hash for the directory section
//! echo -n 'correct-pw' | warden hash-password --stdin
//!
//! # Show version
//! warden version
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{RuntimeBuilder, WardenRuntime};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
