// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Inter-Spike Interval Statistics
//!
//! Reduces an ordered sequence of spike step indices to either the mean
//! interval or a frequency table of interval lengths.
//!
//! Fewer than two spikes means no interval exists. This is not an error:
//! the mean degrades to the `0.0` sentinel and the histogram is empty.

use std::collections::BTreeMap;

/// Mean ISI reported when fewer than two spikes were detected
pub const NO_ISI_SENTINEL: f64 = 0.0;

/// Successive differences `t[j] - t[j-1]`
pub fn inter_spike_intervals(spikes: &[usize]) -> Vec<usize> {
    spikes.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Arithmetic mean of the intervals, or [`NO_ISI_SENTINEL`] for fewer than two spikes
pub fn mean_isi(spikes: &[usize]) -> f64 {
    if spikes.len() < 2 {
        return NO_ISI_SENTINEL;
    }
    let total: usize = spikes.windows(2).map(|w| w[1] - w[0]).sum();
    total as f64 / (spikes.len() - 1) as f64
}

/// Raw count of every distinct interval, keys ascending
pub fn isi_histogram(spikes: &[usize]) -> BTreeMap<usize, usize> {
    let mut histogram = BTreeMap::new();
    for w in spikes.windows(2) {
        *histogram.entry(w[1] - w[0]).or_insert(0) += 1;
    }
    histogram
}

/// Which reduction a sweep applies to each spike train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatisticMode {
    #[default]
    Mean,
    Histogram,
}

/// Result of reducing one spike train
#[derive(Debug, Clone, PartialEq)]
pub enum IsiStatistic {
    Mean(f64),
    Histogram(BTreeMap<usize, usize>),
}

impl IsiStatistic {
    pub fn compute(mode: StatisticMode, spikes: &[usize]) -> Self {
        match mode {
            StatisticMode::Mean => IsiStatistic::Mean(mean_isi(spikes)),
            StatisticMode::Histogram => IsiStatistic::Histogram(isi_histogram(spikes)),
        }
    }
}
