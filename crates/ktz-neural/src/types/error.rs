// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for KTz map operations

/// Error types for map stepping, grids and spike statistics
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KtzError {
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid sweep grid: {0}")]
    InvalidGrid(String),
}

pub type Result<T> = core::result::Result<T, KtzError>;
pub type Error = KtzError;
