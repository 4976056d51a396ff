// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Map Model Architecture
//!
//! Trait-based model system. The logistic KTz map is the only model shipped;
//! a new map plugs in by implementing [`MapModel`] with its own state and
//! parameter records.

pub mod ktz;
pub mod traits;

pub use ktz::{logistic, KtzLogisticModel, Trajectory};
pub use traits::{MapModel, ModelParameters};
