// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Map Types Module
//!
//! Core type definitions shared by the stepper, detectors and sweeps.

pub mod error;
pub mod state;

pub use error::{Error, KtzError, Result};
pub use state::{KtzParameters, KtzState, SweptParameter};
