// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for sweep execution

use std::path::PathBuf;

use ktz_config::ConfigError;
use ktz_neural::KtzError;

/// Errors raised while preparing or running a sweep
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error(transparent)]
    Model(#[from] KtzError),

    #[error("Cannot open output file {}: {source}", .path.display())]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write results: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid sweep: {0}")]
    InvalidSpec(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type SweepResult<T> = Result<T, SweepError>;
