// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers.
//!
//! - [`health`]: liveness
//! - [`login`], [`logout`], [`current_user`]: authentication endpoints

mod auth;
mod health;

pub use auth::*;
pub use health::*;
