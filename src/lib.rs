// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # KTz - Excitable Membrane Map Sweeps
//!
//! Simulates the KTz map and characterises its spiking through inter-spike
//! interval (ISI) statistics while one or two parameters are swept.
//!
//! ## Crates
//! - **`neural`**: map stepping, spike detection, ISI reductions
//! - **`sweep`**: grids, the sweep driver and result sinks
//! - **`config`**: `ktz_configuration.toml` loading with overrides
//! - **`observability`**: logging setup and debug flags
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use ktz::prelude::*;
//!
//! let config = load_config(None, None)?;
//! validate_config(&config)?;
//! for name in config.enabled_experiments() {
//!     let summary = run_experiment(&config, name, &NoProgress)?;
//!     println!("{}: {} rows", name, summary.rows_written);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use ktz_config as config;
pub use ktz_neural as neural;
pub use ktz_observability as observability;
pub use ktz_sweep as sweep;

pub mod runner;

pub use runner::{prepare_output_dir, run_experiment};

/// Commonly used items
pub mod prelude {
    pub use crate::runner::run_experiment;
    pub use ktz_config::{load_config, validate_config, ExperimentConfig, ExperimentKind, KtzConfig};
    pub use ktz_neural::{
        simulate, DetectionPolicy, IsiStatistic, KtzLogisticModel, KtzParameters, KtzState,
        MapModel, SpikeDetector, StatisticMode, SweptParameter,
    };
    pub use ktz_sweep::{
        DelimitedTextSink, LogProgress, MemorySink, NoProgress, ProgressReporter, ResultRow,
        ResultSink, SweepDriver, SweepGrid, SweepSpec, SweepSummary,
    };
}
