// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # KTz Neural Computation
//!
//! Everything needed to characterise the spiking of a single KTz map:
//! - **Types**: state, parameters and errors
//! - **Models**: the logistic KTz stepper behind the [`MapModel`] trait
//! - **Firing**: streaming spike detectors
//! - **ISI**: inter-spike interval reductions
//! - **Simulation**: fixed-budget runs and the first-return map
//!
//! No I/O happens here; sweeps and output formats live in `ktz-sweep`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod firing;
pub mod isi;
pub mod models;
pub mod simulation;
pub mod types;

pub use firing::{
    DetectionPolicy, Detector, RisingZeroCrossingDetector, SignChangeDetector, SpikeDetector,
    SpikeTrain, ThresholdResetDetector, DEFAULT_RESET_POTENTIAL, DEFAULT_SPIKE_THRESHOLD,
};
pub use isi::{
    inter_spike_intervals, isi_histogram, mean_isi, IsiStatistic, StatisticMode, NO_ISI_SENTINEL,
};
pub use models::{logistic, KtzLogisticModel, MapModel, ModelParameters, Trajectory};
pub use simulation::{simulate, ReturnMap};
pub use types::{Error, KtzError, KtzParameters, KtzState, Result, SweptParameter};
