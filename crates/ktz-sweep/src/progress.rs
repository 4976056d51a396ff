// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Progress reporting
//!
//! The driver calls [`ProgressReporter::on_point`] once per finished grid
//! point. In a parallel sweep calls arrive from worker threads and
//! `completed` is a running count, not a grid index.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::info;

pub trait ProgressReporter: Sync {
    fn on_point(&self, completed: usize, total: usize);
}

/// Discards progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    #[inline]
    fn on_point(&self, _completed: usize, _total: usize) {}
}

/// Logs an `info` line each time another `percent_step` percent completes
#[derive(Debug)]
pub struct LogProgress {
    label: String,
    percent_step: f64,
    last_bucket: AtomicUsize,
}

impl LogProgress {
    pub fn new(label: impl Into<String>, percent_step: f64) -> Self {
        let percent_step = if percent_step > 0.0 && percent_step <= 100.0 {
            percent_step
        } else {
            100.0
        };
        Self {
            label: label.into(),
            percent_step,
            last_bucket: AtomicUsize::new(0),
        }
    }
}

impl ProgressReporter for LogProgress {
    fn on_point(&self, completed: usize, total: usize) {
        if total == 0 {
            return;
        }
        let percent = completed as f64 * 100.0 / total as f64;
        let bucket = (percent / self.percent_step).floor() as usize;
        if bucket == 0 {
            return;
        }
        let previous = self.last_bucket.fetch_max(bucket, Ordering::Relaxed);
        if bucket > previous {
            info!(
                target: "ktz-sweep",
                experiment = %self.label,
                completed,
                total,
                "{:.1}% complete",
                percent
            );
        }
    }
}

/// Adapts a closure
pub struct FnProgress<F>(pub F);

impl<F> ProgressReporter for FnProgress<F>
where
    F: Fn(usize, usize) + Sync,
{
    fn on_point(&self, completed: usize, total: usize) {
        (self.0)(completed, total)
    }
}
