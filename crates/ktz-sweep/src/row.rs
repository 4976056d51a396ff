// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Result rows emitted per grid point

use std::fmt;

use ktz_neural::IsiStatistic;

/// Statistic carried by one output row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowStatistic {
    Mean(f64),
    Frequency { isi: usize, count: usize },
}

/// Swept parameter values followed by a statistic
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Axis values, outer axis first
    pub coordinates: Vec<f64>,
    pub statistic: RowStatistic,
}

impl ResultRow {
    pub fn mean(coordinates: Vec<f64>, mean: f64) -> Self {
        Self {
            coordinates,
            statistic: RowStatistic::Mean(mean),
        }
    }

    /// Rows for one grid point.
    ///
    /// A mean always yields exactly one row. A histogram yields one row per
    /// distinct interval in ascending order, and none when it is empty.
    pub fn for_point(coordinates: &[f64], statistic: &IsiStatistic) -> Vec<ResultRow> {
        match statistic {
            IsiStatistic::Mean(mean) => vec![ResultRow::mean(coordinates.to_vec(), *mean)],
            IsiStatistic::Histogram(histogram) => histogram
                .iter()
                .map(|(&isi, &count)| ResultRow {
                    coordinates: coordinates.to_vec(),
                    statistic: RowStatistic::Frequency { isi, count },
                })
                .collect(),
        }
    }
}

impl fmt::Display for ResultRow {
    /// Space-separated fields without a line terminator
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for value in &self.coordinates {
            write!(f, "{} ", value)?;
        }
        match self.statistic {
            RowStatistic::Mean(mean) => write!(f, "{}", mean),
            RowStatistic::Frequency { isi, count } => write!(f, "{} {}", isi, count),
        }
    }
}
