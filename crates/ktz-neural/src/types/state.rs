// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! State and parameter records for the KTz map

use core::fmt;
use core::str::FromStr;

use super::error::{KtzError, Result};

/// Three-variable map state
///
/// - `x`: membrane potential
/// - `y`: recovery variable (the previous `x`)
/// - `z`: slow adaptation current responsible for bursting
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KtzState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl KtzState {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// KTz model parameters
///
/// Immutable for the length of one simulation run; a sweep builds a fresh
/// copy for every grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KtzParameters {
    /// Fast-dynamics coupling between `x` and `y`
    pub k: f64,
    /// Fast-dynamics gain ("temperature"). Must be strictly positive.
    pub t: f64,
    /// Bias of the membrane potential
    pub h: f64,
    /// External input current
    pub i: f64,
    /// Damping of the slow variable
    pub lambda: f64,
    /// Recovery rate of the slow variable (sets the refractory period)
    pub delta: f64,
    /// Resting reference of the slow dynamics (controls burst duration)
    pub x_r: f64,
}

impl Default for KtzParameters {
    fn default() -> Self {
        Self {
            k: 0.6,
            t: 0.25,
            h: 0.0,
            i: 0.0,
            lambda: 0.001,
            delta: 0.001,
            x_r: -0.2,
        }
    }
}

impl KtzParameters {
    /// Reject parameter sets that would make the update rule undefined.
    ///
    /// `T` divides the fast-dynamics argument, so zero and negative values
    /// are refused rather than allowed to produce infinities.
    pub fn validate(&self) -> Result<()> {
        for parameter in SweptParameter::ALL {
            let value = parameter.get(self);
            if !value.is_finite() {
                return Err(KtzError::InvalidParameter {
                    name: parameter.label(),
                    value,
                    reason: "must be finite",
                });
            }
        }
        if self.t <= 0.0 {
            return Err(KtzError::InvalidParameter {
                name: SweptParameter::T.label(),
                value: self.t,
                reason: "must be strictly positive",
            });
        }
        Ok(())
    }

    /// Copy with a single parameter replaced
    pub fn with(mut self, parameter: SweptParameter, value: f64) -> Self {
        parameter.apply(&mut self, value);
        self
    }
}

/// Names a parameter that a sweep axis can vary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SweptParameter {
    K,
    T,
    H,
    I,
    Lambda,
    Delta,
    XR,
}

impl SweptParameter {
    pub const ALL: [SweptParameter; 7] = [
        SweptParameter::K,
        SweptParameter::T,
        SweptParameter::H,
        SweptParameter::I,
        SweptParameter::Lambda,
        SweptParameter::Delta,
        SweptParameter::XR,
    ];

    /// Column label used in output headers
    pub fn label(&self) -> &'static str {
        match self {
            SweptParameter::K => "k",
            SweptParameter::T => "T",
            SweptParameter::H => "H",
            SweptParameter::I => "I",
            SweptParameter::Lambda => "lambda",
            SweptParameter::Delta => "delta",
            SweptParameter::XR => "x_R",
        }
    }

    pub fn get(&self, params: &KtzParameters) -> f64 {
        match self {
            SweptParameter::K => params.k,
            SweptParameter::T => params.t,
            SweptParameter::H => params.h,
            SweptParameter::I => params.i,
            SweptParameter::Lambda => params.lambda,
            SweptParameter::Delta => params.delta,
            SweptParameter::XR => params.x_r,
        }
    }

    pub fn apply(&self, params: &mut KtzParameters, value: f64) {
        match self {
            SweptParameter::K => params.k = value,
            SweptParameter::T => params.t = value,
            SweptParameter::H => params.h = value,
            SweptParameter::I => params.i = value,
            SweptParameter::Lambda => params.lambda = value,
            SweptParameter::Delta => params.delta = value,
            SweptParameter::XR => params.x_r = value,
        }
    }
}

impl fmt::Display for SweptParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SweptParameter {
    type Err = KtzError;

    /// Accepts the header label as well as lowercase aliases (`t`, `x_r`, `xr`, `l`, `d`).
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "T" => return Ok(SweptParameter::T),
            "H" => return Ok(SweptParameter::H),
            "I" => return Ok(SweptParameter::I),
            "x_R" => return Ok(SweptParameter::XR),
            _ => {}
        }
        match s.to_ascii_lowercase().as_str() {
            "k" => Ok(SweptParameter::K),
            "t" => Ok(SweptParameter::T),
            "h" => Ok(SweptParameter::H),
            "i" => Ok(SweptParameter::I),
            "lambda" | "l" => Ok(SweptParameter::Lambda),
            "delta" | "d" => Ok(SweptParameter::Delta),
            "x_r" | "xr" => Ok(SweptParameter::XR),
            other => Err(KtzError::InvalidGrid(format!(
                "unknown sweep parameter '{}'",
                other
            ))),
        }
    }
}
