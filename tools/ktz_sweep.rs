// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! KTz sweep runner.
//!
//! Runs named experiments from `ktz_configuration.toml` (or the built-in
//! presets) and writes one whitespace-separated result file per experiment.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use ktz::config::{load_config, validate_config, ConfigError, KtzConfig};
use ktz::observability::{debug_flags_help, init_logging, parse_debug_flags, LoggingConfig};
use ktz::run_experiment;
use ktz::sweep::LogProgress;

/// KTz sweep runner - ISI statistics of the KTz map over parameter grids
#[derive(Parser, Debug)]
#[command(name = "ktz-sweep", version, author, long_about = None, after_help = debug_flags_help())]
struct Args {
    /// Experiments to run (default: every enabled experiment)
    experiments: Vec<String>,

    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving the result files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Evaluate grid points in parallel (output order is unchanged)
    #[arg(short, long, default_value_t = false)]
    parallel: bool,

    /// Worker threads for --parallel (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Grid points per parallel batch
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Map updates per grid point, for every ISI sweep
    #[arg(long)]
    steps: Option<usize>,

    /// Points per axis, for every sweep axis
    #[arg(long)]
    points: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Console log format (full, compact)
    #[arg(long)]
    log_format: Option<String>,

    /// Also write a JSON log under this directory (requires the file-logging feature)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// List the configured experiments and exit
    #[arg(long, default_value_t = false)]
    list: bool,

    /// Print the resolved configuration as JSON and exit
    #[arg(long, default_value_t = false)]
    print_config: bool,
}

impl Args {
    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(dir) = &self.output_dir {
            overrides.insert("output_dir".to_string(), dir.display().to_string());
        }
        if self.parallel {
            overrides.insert("parallel".to_string(), "true".to_string());
        }
        if let Some(threads) = self.threads {
            overrides.insert("max_threads".to_string(), threads.to_string());
        }
        if let Some(chunk_size) = self.chunk_size {
            overrides.insert("chunk_size".to_string(), chunk_size.to_string());
        }
        if let Some(steps) = self.steps {
            overrides.insert("steps".to_string(), steps.to_string());
        }
        if let Some(points) = self.points {
            overrides.insert("points".to_string(), points.to_string());
        }
        if let Some(level) = &self.log_level {
            overrides.insert("log_level".to_string(), level.clone());
        }
        if let Some(format) = &self.log_format {
            overrides.insert("log_format".to_string(), format.clone());
        }
        overrides
    }
}

fn main() -> Result<()> {
    // `--debug-<crate>` flags are not clap arguments
    let args = Args::parse_from(env::args().filter(|arg| !arg.starts_with("--debug-")));
    let debug_flags = parse_debug_flags();

    let config = load_config(args.config.as_deref(), Some(&args.overrides()))
        .context("Failed to load configuration")?;
    validate_config(&config)?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    if args.list {
        print_experiments(&config);
        return Ok(());
    }

    let logging = LoggingConfig {
        format: config.system.log_format.parse()?,
        log_dir: args.log_dir.clone(),
        ..LoggingConfig::with_level(&config.system.log_level)
    };
    let _logging_guard = init_logging(&debug_flags, &logging)?;

    let names: Vec<String> = if args.experiments.is_empty() {
        config
            .enabled_experiments()
            .into_iter()
            .map(str::to_string)
            .collect()
    } else {
        args.experiments.clone()
    };
    if let Some(unknown) = names.iter().find(|n| !config.experiments.contains_key(*n)) {
        return Err(ConfigError::UnknownExperiment(unknown.clone()).into());
    }
    if names.is_empty() {
        info!(target: "ktz", "No experiments enabled; nothing to do");
        return Ok(());
    }

    if config.system.parallel && config.system.max_threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.system.max_threads)
            .build_global()
            .context("Failed to configure the worker pool")?;
    }

    info!(
        target: "ktz",
        version = env!("CARGO_PKG_VERSION"),
        output_dir = %config.system.output_dir.display(),
        parallel = config.system.parallel,
        "KTz sweep runner: {} experiment(s)",
        names.len()
    );

    for name in &names {
        let progress = LogProgress::new(name.as_str(), config.system.progress_percent);
        match run_experiment(&config, name, &progress) {
            Ok(summary) => info!(
                target: "ktz",
                experiment = %name,
                grid_points = summary.grid_points,
                rows = summary.rows_written,
                points_without_isi = summary.points_without_isi,
                "✓ Finished in {:.2}s",
                summary.elapsed.as_secs_f64()
            ),
            Err(e) => {
                error!(target: "ktz", experiment = %name, "{}", e);
                return Err(e).with_context(|| format!("Experiment {} failed", name));
            }
        }
    }

    Ok(())
}

fn print_experiments(config: &KtzConfig) {
    for (name, experiment) in &config.experiments {
        let axes = experiment
            .axes
            .iter()
            .map(|a| format!("{}[{}..{}; {}]", a.parameter, a.start, a.end, a.points))
            .collect::<Vec<_>>()
            .join(" x ");
        println!(
            "{:<20} {:<8} {:?} n={} {} -> {}",
            name,
            if experiment.enabled { "enabled" } else { "disabled" },
            experiment.kind,
            experiment.steps,
            axes,
            config.output_path(experiment).display()
        );
        if !experiment.description.is_empty() {
            println!("{:<20} {}", "", experiment.description);
        }
    }
}
