// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Running named experiments from a loaded configuration

use std::fs;

use ktz_config::{ConfigError, ExperimentKind, KtzConfig};
use ktz_sweep::{
    DelimitedTextSink, ProgressReporter, ReturnMapSpec, SweepDriver, SweepError, SweepResult,
    SweepSpec, SweepSummary,
};
use tracing::info;

/// Create `system.output_dir` if it does not exist
pub fn prepare_output_dir(config: &KtzConfig) -> SweepResult<()> {
    let dir = &config.system.output_dir;
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| SweepError::OutputFile {
            path: dir.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Run one experiment into its output file
///
/// # Errors
/// Unknown experiment names, invalid experiments and I/O failures on the
/// output file are all fatal.
pub fn run_experiment<P>(config: &KtzConfig, name: &str, progress: &P) -> SweepResult<SweepSummary>
where
    P: ProgressReporter + ?Sized,
{
    let experiment = config
        .experiments
        .get(name)
        .ok_or_else(|| ConfigError::UnknownExperiment(name.to_string()))?;

    let driver = SweepDriver::from_system(&config.system);
    let path = config.output_path(experiment);

    // Validate before the output file is created or truncated
    let summary = match experiment.kind {
        ExperimentKind::IsiSweep => {
            let spec = SweepSpec::from_experiment(name, &config.model, experiment)?;
            spec.validate()?;
            prepare_output_dir(config)?;
            let mut sink = DelimitedTextSink::create(&path)?;
            driver.run(&spec, &mut sink, progress)?
        }
        ExperimentKind::ReturnMap => {
            let spec = ReturnMapSpec::from_experiment(name, &config.model, experiment)?;
            spec.validate()?;
            prepare_output_dir(config)?;
            let mut sink = DelimitedTextSink::create(&path)?;
            driver.run_return_map(&spec, &mut sink, progress)?
        }
    };

    info!(
        target: "ktz",
        experiment = name,
        output = %path.display(),
        rows = summary.rows_written,
        "Wrote results"
    );
    Ok(summary)
}
