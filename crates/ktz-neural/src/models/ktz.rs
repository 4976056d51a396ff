// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Logistic KTz Map
//!
//! Three-variable discrete map of an excitable membrane.
//!
//! ## Model Dynamics
//!
//! ```text
//! x(t+1) = F((x(t) - k·y(t) + z(t) + H + I) / T)
//! y(t+1) = x(t)
//! z(t+1) = (1 - δ)·z(t) - λ·(x(t) - x_R)
//!
//! F(u) = u / (1 + |u|)
//! ```
//!
//! `F` saturates to the open interval (-1, 1), so `x` stays bounded for any
//! finite input as long as `T > 0`.

use super::traits::{MapModel, ModelParameters};
use crate::types::{KtzParameters, KtzState, Result};

/// Soft-saturating logistic function `u / (1 + |u|)`
#[inline(always)]
pub fn logistic(u: f64) -> f64 {
    u / (1.0 + u.abs())
}

/// Logistic KTz map
#[derive(Debug, Clone, Copy, Default)]
pub struct KtzLogisticModel;

impl KtzLogisticModel {
    pub fn new() -> Self {
        Self
    }

    /// Lazily iterate the map from `initial`.
    ///
    /// The first item is the state after one update; the initial state
    /// itself is not yielded.
    pub fn trajectory(&self, initial: KtzState, params: KtzParameters) -> Trajectory {
        Trajectory {
            model: *self,
            state: initial,
            params,
        }
    }
}

impl MapModel for KtzLogisticModel {
    type State = KtzState;
    type Parameters = KtzParameters;

    fn model_name(&self) -> &'static str {
        "Logistic KTz map"
    }

    #[inline(always)]
    fn step(&self, state: &KtzState, params: &KtzParameters) -> KtzState {
        KtzState {
            x: logistic((state.x - params.k * state.y + state.z + params.h + params.i) / params.t),
            y: state.x,
            z: (1.0 - params.delta) * state.z - params.lambda * (state.x - params.x_r),
        }
    }
}

impl ModelParameters for KtzParameters {
    fn validate(&self) -> Result<()> {
        KtzParameters::validate(self)
    }

    fn parameter_count() -> usize {
        7 // k, T, H, I, lambda, delta, x_R
    }
}

/// Unbounded iterator over successive map states
#[derive(Debug, Clone)]
pub struct Trajectory {
    model: KtzLogisticModel,
    state: KtzState,
    params: KtzParameters,
}

impl Iterator for Trajectory {
    type Item = KtzState;

    #[inline]
    fn next(&mut self) -> Option<KtzState> {
        self.state = self.model.step(&self.state, &self.params);
        Some(self.state)
    }
}
