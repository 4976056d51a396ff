// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Sweep Driver
//!
//! For each grid point: restart from the fixed initial state, run the map
//! for the step budget, detect spikes, reduce them to the configured ISI
//! statistic and write the resulting rows.
//!
//! ## Parallel mode
//! Grid points are independent. In parallel mode the grid is cut into
//! chunks of `chunk_size` points, each chunk is evaluated on the rayon pool
//! and its rows are written in grid order before the next chunk starts.
//! Output is therefore byte-identical to a sequential run, while memory is
//! bounded by one chunk of results.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use ktz_config::SystemConfig;
use ktz_neural::{simulate, IsiStatistic, KtzLogisticModel, ReturnMap};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::SweepResult;
use crate::progress::ProgressReporter;
use crate::row::ResultRow;
use crate::sink::{DelimitedTextSink, ResultSink};
use crate::spec::{ReturnMapSpec, SweepSpec};

/// Default number of grid points per parallel batch
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Outcome of one completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub grid_points: usize,
    pub rows_written: usize,
    /// Grid points with fewer than two spikes
    pub points_without_isi: usize,
    pub elapsed: Duration,
}

/// Evaluated grid point, before it is turned into rows
struct PointOutcome {
    coordinates: Vec<f64>,
    statistic: IsiStatistic,
    spike_count: usize,
}

/// Runs sweeps sequentially or in ordered parallel chunks
#[derive(Debug, Clone)]
pub struct SweepDriver {
    model: KtzLogisticModel,
    parallel: bool,
    chunk_size: usize,
}

impl Default for SweepDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepDriver {
    /// Sequential driver
    pub fn new() -> Self {
        Self {
            model: KtzLogisticModel::new(),
            parallel: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Driver configured from the `[system]` section
    pub fn from_system(system: &SystemConfig) -> Self {
        Self::new()
            .with_parallel(system.parallel)
            .with_chunk_size(system.chunk_size)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Points per parallel batch (values below 1 are treated as 1)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Run a full ISI sweep into `sink`
    pub fn run<S, P>(&self, spec: &SweepSpec, sink: &mut S, progress: &P) -> SweepResult<SweepSummary>
    where
        S: ResultSink + ?Sized,
        P: ProgressReporter + ?Sized,
    {
        spec.validate()?;

        let started = Instant::now();
        let total = spec.grid.len();
        let header = spec.header();
        sink.begin(spec.write_header.then_some(header.as_str()))?;

        info!(
            target: "ktz-sweep",
            experiment = %spec.name,
            grid_points = total,
            steps = spec.steps,
            parallel = self.parallel,
            "Starting sweep over {}",
            spec.grid.labels().join(" x ")
        );

        let mut summary = SweepSummary {
            grid_points: total,
            rows_written: 0,
            points_without_isi: 0,
            elapsed: Duration::ZERO,
        };

        if self.parallel && total > 1 {
            let completed = AtomicUsize::new(0);
            let mut chunk_start = 0;
            while chunk_start < total {
                let chunk_end = (chunk_start + self.chunk_size).min(total);
                let outcomes: Vec<PointOutcome> = (chunk_start..chunk_end)
                    .into_par_iter()
                    .map(|index| {
                        let outcome = self.evaluate_point(spec, index);
                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        progress.on_point(done, total);
                        outcome
                    })
                    .collect();

                for outcome in &outcomes {
                    write_outcome(sink, outcome, &mut summary)?;
                }
                debug!(
                    target: "ktz-sweep",
                    chunk_start,
                    chunk_end,
                    "Wrote chunk"
                );
                chunk_start = chunk_end;
            }
        } else {
            for index in 0..total {
                let outcome = self.evaluate_point(spec, index);
                write_outcome(sink, &outcome, &mut summary)?;
                progress.on_point(index + 1, total);
            }
        }

        sink.finish()?;
        summary.elapsed = started.elapsed();

        info!(
            target: "ktz-sweep",
            experiment = %spec.name,
            rows = summary.rows_written,
            points_without_isi = summary.points_without_isi,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Sweep complete"
        );
        Ok(summary)
    }

    /// Write the first-return map `(x_t, x_{t+1})` of a single run
    pub fn run_return_map<W, P>(
        &self,
        spec: &ReturnMapSpec,
        sink: &mut DelimitedTextSink<W>,
        progress: &P,
    ) -> SweepResult<SweepSummary>
    where
        W: Write,
        P: ProgressReporter + ?Sized,
    {
        spec.validate()?;

        let started = Instant::now();
        let total = spec.pairs();
        sink.begin(spec.write_header.then_some(spec.header()))?;

        info!(
            target: "ktz-sweep",
            steps = spec.steps,
            transient = spec.transient,
            "Starting return map"
        );

        let pairs = ReturnMap::new(
            self.model,
            spec.initial,
            spec.params,
            spec.steps,
            spec.transient,
        );
        let mut rows_written = 0;
        for (current, next) in pairs {
            sink.write_fields(&[current, next])?;
            rows_written += 1;
            progress.on_point(rows_written, total);
        }
        sink.finish()?;

        let summary = SweepSummary {
            grid_points: 1,
            rows_written,
            points_without_isi: 0,
            elapsed: started.elapsed(),
        };
        info!(
            target: "ktz-sweep",
            rows = rows_written,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Return map complete"
        );
        Ok(summary)
    }

    fn evaluate_point(&self, spec: &SweepSpec, index: usize) -> PointOutcome {
        let coordinates = spec.grid.coordinates(index);
        let params = spec.grid.parameters(&spec.base, &coordinates);
        let mut detector = spec.detection.build();

        let spikes = simulate(&self.model, spec.initial, &params, spec.steps, &mut detector);

        PointOutcome {
            statistic: IsiStatistic::compute(spec.statistic, spikes.as_slice()),
            spike_count: spikes.len(),
            coordinates,
        }
    }
}

fn write_outcome<S>(sink: &mut S, outcome: &PointOutcome, summary: &mut SweepSummary) -> SweepResult<()>
where
    S: ResultSink + ?Sized,
{
    if outcome.spike_count < 2 {
        summary.points_without_isi += 1;
    }
    for row in ResultRow::for_point(&outcome.coordinates, &outcome.statistic) {
        sink.write_row(&row)?;
        summary.rows_written += 1;
    }
    Ok(())
}
