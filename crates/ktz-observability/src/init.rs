// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output always goes to stderr so result data written to stdout
//! stays clean. With the `file-logging` feature and a configured log
//! directory, a JSON log is also written into a timestamped run folder:
//!
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── ktz.log
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

/// Prefix of per-run log folders
pub const RUN_FOLDER_PREFIX: &str = "run_";

const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps file writers alive; logs are flushed when dropped
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving the log file, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Filter from `RUST_LOG` when set, otherwise from the level and debug flags
pub fn build_filter(debug_flags: &CrateDebugFlags, level: &str) -> Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid {} directives: {}", EnvFilter::DEFAULT_ENV, directives)),
        _ => {
            let directives = debug_flags.to_filter_string(level);
            EnvFilter::try_new(&directives)
                .with_context(|| format!("Invalid log filter: {}", directives))
        }
    }
}

/// Install the global subscriber
///
/// # Errors
/// Fails when the filter does not parse, the log folder cannot be created,
/// or a global subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(debug_flags.any_enabled());
    let console: BoxedLayer = match config.format {
        LogFormat::Full => console
            .with_filter(build_filter(debug_flags, &config.level)?)
            .boxed(),
        LogFormat::Compact => console
            .compact()
            .with_filter(build_filter(debug_flags, &config.level)?)
            .boxed(),
    };
    layers.push(console);

    #[cfg(feature = "file-logging")]
    let (log_dir, file_guards) = match &config.log_dir {
        Some(base_log_dir) => {
            let now = Utc::now();
            let run_folder = base_log_dir.join(run_folder_name(now));
            std::fs::create_dir_all(&run_folder).with_context(|| {
                format!("Failed to create log directory: {}", run_folder.display())
            })?;
            cleanup_old_logs(
                base_log_dir,
                config.retention_days,
                config.retention_runs.max(1),
                now,
            )?;

            let appender = tracing_appender::rolling::never(&run_folder, "ktz.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(build_filter(debug_flags, &config.level)?)
                .boxed();
            layers.push(file_layer);

            (Some(run_folder), vec![guard])
        }
        None => (None, Vec::new()),
    };

    #[cfg(not(feature = "file-logging"))]
    let log_dir: Option<PathBuf> = None;

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    report_disabled_file_logging(config);

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        log_dir,
    })
}

#[cfg(not(feature = "file-logging"))]
fn report_disabled_file_logging(config: &LoggingConfig) {
    if let Some(requested) = &config.log_dir {
        tracing::warn!(
            "File logging to {} requested but the file-logging feature is disabled",
            requested.display()
        );
    }
}

#[cfg(feature = "file-logging")]
fn report_disabled_file_logging(_config: &LoggingConfig) {}

/// Folder name for a run started at `started`, e.g. `run_20250101_120000`
pub fn run_folder_name(started: DateTime<Utc>) -> String {
    format!("{}{}", RUN_FOLDER_PREFIX, started.format(RUN_TIMESTAMP_FORMAT))
}

/// Start time encoded in a run folder name
pub fn parse_run_folder(name: &str) -> Option<DateTime<Utc>> {
    let timestamp = name.strip_prefix(RUN_FOLDER_PREFIX)?;
    NaiveDateTime::parse_from_str(timestamp, RUN_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Remove run folders older than `retention_days`, then all but the newest
/// `retention_runs`. Other entries of `base_log_dir` are left alone.
///
/// Returns the number of folders removed.
pub fn cleanup_old_logs(
    base_log_dir: &Path,
    retention_days: u64,
    retention_runs: usize,
    now: DateTime<Utc>,
) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = now - Duration::days(retention_days as i64);

    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)
        .with_context(|| format!("Failed to read log directory: {}", base_log_dir.display()))?
    {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(started) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_run_folder)
        {
            runs.push((path, started));
        }
    }

    // Newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (position, (path, started)) in runs.iter().enumerate() {
        if *started >= cutoff && position < retention_runs {
            continue;
        }
        match std::fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!(
                "Warning: Failed to remove old log directory {}: {}",
                path.display(),
                e
            ),
        }
    }

    Ok(removed)
}
