// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `ktz_configuration.toml`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use ktz_neural::{DetectionPolicy, KtzParameters, KtzState, StatisticMode};
use serde::{Deserialize, Serialize};

/// Preset: mean ISI over T with the threshold-and-reset detector
pub const PRESET_MEAN_ISI_THRESHOLD: &str = "mean_isi_threshold";
/// Preset: mean ISI over T with the rising zero-crossing detector
pub const PRESET_MEAN_ISI_CROSSING: &str = "mean_isi_crossing";
/// Preset: ISI frequency table over the (x_R, T) plane
pub const PRESET_ISI_HISTOGRAM: &str = "isi_histogram";
/// Preset: first-return map of the membrane potential
pub const PRESET_RETURN_MAP: &str = "return_map";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KtzConfig {
    pub system: SystemConfig,
    pub model: ModelConfig,
    pub experiments: BTreeMap<String, ExperimentConfig>,
}

impl Default for KtzConfig {
    fn default() -> Self {
        Self {
            system: SystemConfig::default(),
            model: ModelConfig::default(),
            experiments: preset_experiments(),
        }
    }
}

impl KtzConfig {
    /// Names of experiments run when none is requested explicitly
    pub fn enabled_experiments(&self) -> Vec<&str> {
        self.experiments
            .iter()
            .filter(|(_, e)| e.enabled)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Absolute or cwd-relative path of an experiment's output file
    pub fn output_path(&self, experiment: &ExperimentConfig) -> PathBuf {
        self.system.output_dir.join(&experiment.output_file)
    }
}

/// Process-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub log_level: String,
    /// Console line format (full or compact)
    pub log_format: String,
    pub output_dir: PathBuf,
    /// Evaluate grid points on the rayon pool
    pub parallel: bool,
    /// Worker threads for the parallel sweep (0 = rayon default)
    pub max_threads: usize,
    /// Grid points evaluated per parallel batch before rows are written
    pub chunk_size: usize,
    /// Log a progress line every time this many percent complete
    pub progress_percent: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "full".to_string(),
            output_dir: PathBuf::from("."),
            parallel: false,
            max_threads: 0,
            chunk_size: 4096,
            progress_percent: 10.0,
        }
    }
}

/// Fixed model parameters shared by every experiment
///
/// A sweep axis overrides the named parameter per grid point.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub k: f64,
    #[serde(alias = "T")]
    pub t: f64,
    #[serde(alias = "H")]
    pub h: f64,
    #[serde(alias = "I")]
    pub i: f64,
    pub lambda: f64,
    pub delta: f64,
    #[serde(alias = "x_R")]
    pub x_r: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let params = KtzParameters::default();
        Self {
            k: params.k,
            t: params.t,
            h: params.h,
            i: params.i,
            lambda: params.lambda,
            delta: params.delta,
            x_r: params.x_r,
        }
    }
}

impl ModelConfig {
    pub fn to_parameters(&self) -> KtzParameters {
        KtzParameters {
            k: self.k,
            t: self.t,
            h: self.h,
            i: self.i,
            lambda: self.lambda,
            delta: self.delta,
            x_r: self.x_r,
        }
    }
}

/// Initial state every grid point restarts from
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InitialConditionsConfig {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for InitialConditionsConfig {
    fn default() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        }
    }
}

impl InitialConditionsConfig {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_state(&self) -> KtzState {
        KtzState::new(self.x, self.y, self.z)
    }
}

/// What an experiment produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentKind {
    /// ISI statistic per grid point of one or two swept parameters
    #[default]
    IsiSweep,
    /// `(x_t, x_{t+1})` pairs of a single run after a transient
    ReturnMap,
}

/// One evenly spaced sweep axis (inclusive endpoints)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AxisConfig {
    /// Parameter label: `k`, `T`, `H`, `I`, `lambda`, `delta` or `x_R`
    pub parameter: String,
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl AxisConfig {
    pub fn new(parameter: &str, start: f64, end: f64, points: usize) -> Self {
        Self {
            parameter: parameter.to_string(),
            start,
            end,
            points,
        }
    }
}

/// A named experiment
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub kind: ExperimentKind,
    /// Run when no experiment is named on the command line
    pub enabled: bool,
    pub description: String,
    /// File name, resolved against `system.output_dir`
    pub output_file: String,
    /// Write a column header line before the rows
    pub header: bool,
    /// Map updates per grid point
    pub steps: usize,
    /// Leading updates not reported (return map only)
    pub transient: usize,
    pub initial: InitialConditionsConfig,
    pub detector: DetectionPolicy,
    pub statistic: StatisticMode,
    /// One or two axes, first axis outermost
    pub axes: Vec<AxisConfig>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            kind: ExperimentKind::IsiSweep,
            enabled: true,
            description: String::new(),
            output_file: "sweep.dat".to_string(),
            header: false,
            steps: 1000,
            transient: 0,
            initial: InitialConditionsConfig::default(),
            detector: DetectionPolicy::default(),
            statistic: StatisticMode::Mean,
            axes: vec![AxisConfig::new("T", 0.1, 0.4, 50)],
        }
    }
}

/// The built-in experiments
///
/// The two 1-D mean-ISI sweeps run by default. The 2-D histogram scan
/// (10^8 grid points) and the 13-million-step return map only run when
/// requested by name.
pub fn preset_experiments() -> BTreeMap<String, ExperimentConfig> {
    let mut presets = BTreeMap::new();

    presets.insert(
        PRESET_MEAN_ISI_THRESHOLD.to_string(),
        ExperimentConfig {
            kind: ExperimentKind::IsiSweep,
            enabled: true,
            description: "Mean ISI versus T, threshold 0.8 with reset to -0.1".to_string(),
            output_file: "mean_isi_threshold.dat".to_string(),
            header: false,
            steps: 1000,
            transient: 0,
            initial: InitialConditionsConfig::new(-0.35, -0.1, 0.0),
            detector: DetectionPolicy::ThresholdReset {
                threshold: 0.8,
                reset: -0.1,
            },
            statistic: StatisticMode::Mean,
            axes: vec![AxisConfig::new("T", 0.1, 0.4, 50)],
        },
    );

    presets.insert(
        PRESET_MEAN_ISI_CROSSING.to_string(),
        ExperimentConfig {
            kind: ExperimentKind::IsiSweep,
            enabled: true,
            description: "Mean ISI versus T, rising zero crossings".to_string(),
            output_file: "mean_isi_crossing.dat".to_string(),
            header: false,
            steps: 1000,
            transient: 0,
            initial: InitialConditionsConfig::new(1.0, 1.0, 1.0),
            detector: DetectionPolicy::RisingZeroCrossing,
            statistic: StatisticMode::Mean,
            axes: vec![AxisConfig::new("T", 0.23, 0.26, 1000)],
        },
    );

    presets.insert(
        PRESET_ISI_HISTOGRAM.to_string(),
        ExperimentConfig {
            kind: ExperimentKind::IsiSweep,
            enabled: false,
            description: "ISI frequencies over the (x_R, T) plane, upward sign changes".to_string(),
            output_file: "isi_histogram.dat".to_string(),
            header: true,
            steps: 50,
            transient: 0,
            initial: InitialConditionsConfig::new(1.0, 1.0, 1.0),
            detector: DetectionPolicy::SignChange,
            statistic: StatisticMode::Histogram,
            axes: vec![
                AxisConfig::new("x_R", -0.199, -0.191, 10_000),
                AxisConfig::new("T", 0.234, 0.255, 10_000),
            ],
        },
    );

    presets.insert(
        PRESET_RETURN_MAP.to_string(),
        ExperimentConfig {
            kind: ExperimentKind::ReturnMap,
            enabled: false,
            description: "First-return map x(t) -> x(t+1) at the model parameters".to_string(),
            output_file: "return_map.dat".to_string(),
            header: false,
            steps: 13_000_000,
            transient: 2000,
            initial: InitialConditionsConfig::new(1.0, 1.0, 1.0),
            detector: DetectionPolicy::default(),
            statistic: StatisticMode::Mean,
            axes: Vec::new(),
        },
    );

    presets
}
