// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # KTz Parameter Sweeps
//!
//! Runs the KTz map over a 1-D or 2-D grid of parameter values and writes
//! one or more ISI rows per grid point.
//!
//! ```text
//! SweepSpec ──► SweepDriver ──(per point)──► simulate ──► IsiStatistic
//!                    │                                         │
//!                    └──────────── ResultSink ◄── ResultRow ◄──┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ktz_neural::{DetectionPolicy, KtzParameters, KtzState, StatisticMode, SweptParameter};
//! use ktz_sweep::{DelimitedTextSink, NoProgress, SweepAxis, SweepDriver, SweepGrid, SweepSpec};
//!
//! let spec = SweepSpec {
//!     name: "mean_isi".to_string(),
//!     base: KtzParameters::default(),
//!     initial: KtzState::new(-0.35, -0.1, 0.0),
//!     steps: 1000,
//!     detection: DetectionPolicy::default(),
//!     statistic: StatisticMode::Mean,
//!     grid: SweepGrid::single(SweepAxis::linspace(SweptParameter::T, 0.1, 0.4, 50)?),
//!     write_header: false,
//! };
//!
//! let mut sink = DelimitedTextSink::create(std::path::Path::new("mean_isi.dat"))?;
//! let summary = SweepDriver::new().run(&spec, &mut sink, &NoProgress)?;
//! println!("{} rows", summary.rows_written);
//! # Ok::<(), ktz_sweep::SweepError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod driver;
pub mod error;
pub mod grid;
pub mod progress;
pub mod row;
pub mod sink;
pub mod spec;

pub use driver::{SweepDriver, SweepSummary, DEFAULT_CHUNK_SIZE};
pub use error::{SweepError, SweepResult};
pub use grid::{linspace, SweepAxis, SweepGrid, MAX_AXES};
pub use progress::{FnProgress, LogProgress, NoProgress, ProgressReporter};
pub use row::{ResultRow, RowStatistic};
pub use sink::{DelimitedTextSink, MemorySink, ResultSink};
pub use spec::{ReturnMapSpec, SweepSpec};
