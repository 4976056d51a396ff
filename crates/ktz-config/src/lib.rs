// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # KTz Configuration System
//!
//! Type-safe configuration for KTz parameter sweeps with support for:
//! - TOML file parsing (`ktz_configuration.toml`)
//! - Environment variable overrides
//! - CLI argument overrides
//! - Built-in experiment presets merged under user-defined experiments
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ktz_config::{load_config, validate_config};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//!
//! for (name, experiment) in &config.experiments {
//!     println!("{}: {} steps -> {}", name, experiment.steps, experiment.output_file);
//! }
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    CONFIG_FILE_NAME, CONFIG_PATH_ENV,
};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Re-export for convenience
pub use serde;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Unknown experiment: {0}")]
    UnknownExperiment(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
