// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ktz-observability
//!
//! Logging setup shared by the KTz tools, with per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: JSON log file per run in a timestamped folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Log targets that accept `--debug-<name>` flags
pub const KNOWN_CRATES: &[&str] = &["ktz", "ktz-sweep"];

/// Environment variable listing crates to log at debug level
pub const DEBUG_ENV: &str = "KTZ_DEBUG";
