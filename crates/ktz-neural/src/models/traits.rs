// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Traits shared by every discrete-time map model

use crate::types::Result;

/// A discrete-time neuron map
///
/// Implementations hold no iteration state: the caller owns the state and
/// drives the step count, which keeps every grid point of a sweep
/// independent of the others.
pub trait MapModel: Send + Sync {
    type State: Copy;
    type Parameters: ModelParameters;

    /// Human readable model name
    fn model_name(&self) -> &'static str;

    /// Advance `state` by one time step
    fn step(&self, state: &Self::State, params: &Self::Parameters) -> Self::State;
}

/// Model-specific parameter record
pub trait ModelParameters: Copy {
    /// Check that the update rule is defined for these values
    fn validate(&self) -> Result<()>;

    fn parameter_count() -> usize;
}
