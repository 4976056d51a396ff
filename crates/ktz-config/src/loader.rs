// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (or built-in defaults when no file exists)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::types::{preset_experiments, ExperimentKind};
use crate::{ConfigError, ConfigResult, KtzConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "ktz_configuration.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "KTZ_CONFIG_PATH";

/// Find the KTz configuration file
///
/// Search order:
/// 1. `KTZ_CONFIG_PATH` environment variable
/// 2. Current working directory: `./ktz_configuration.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by {} not found: {}",
                CONFIG_PATH_ENV,
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "KTz configuration file '{}' not found in any of these locations:\n{}\n\nSet {} environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is
///   searched for; when none exists the built-in defaults are used, unless
///   `KTZ_CONFIG_PATH` points at a missing file.
/// * `cli_args` - Optional CLI argument overrides
///
/// Experiments defined in the file replace presets of the same name; the
/// remaining presets stay available.
///
/// # Errors
///
/// Returns error if an explicit config file is missing or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<KtzConfig> {
    let mut config = match config_path {
        Some(path) => parse_file(path)?,
        None => match find_config_file() {
            Ok(path) => parse_file(&path)?,
            Err(ConfigError::FileNotFound(_)) if env::var(CONFIG_PATH_ENV).is_err() => {
                KtzConfig::default()
            }
            Err(e) => return Err(e),
        },
    };

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

fn parse_file(path: &Path) -> ConfigResult<KtzConfig> {
    let content = fs::read_to_string(path)?;
    let mut config: KtzConfig = toml::from_str(&content)?;

    for (name, preset) in preset_experiments() {
        config.experiments.entry(name).or_insert(preset);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `KTZ_OUTPUT_DIR` -> `system.output_dir`
/// - `KTZ_LOG_LEVEL` -> `system.log_level`
/// - `KTZ_LOG_FORMAT` -> `system.log_format`
/// - `KTZ_PARALLEL` -> `system.parallel`
/// - `KTZ_MAX_THREADS` -> `system.max_threads`
/// - `KTZ_CHUNK_SIZE` -> `system.chunk_size`
/// - `KTZ_PROGRESS_PERCENT` -> `system.progress_percent`
///
/// Unparseable numeric values are ignored.
pub fn apply_environment_overrides(config: &mut KtzConfig) {
    if let Ok(value) = env::var("KTZ_OUTPUT_DIR") {
        config.system.output_dir = PathBuf::from(value);
    }
    if let Ok(value) = env::var("KTZ_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("KTZ_LOG_FORMAT") {
        config.system.log_format = value;
    }
    if let Ok(value) = env::var("KTZ_PARALLEL") {
        config.system.parallel = parse_flag(&value);
    }
    if let Ok(value) = env::var("KTZ_MAX_THREADS") {
        if let Ok(threads) = value.parse::<usize>() {
            config.system.max_threads = threads;
        }
    }
    if let Ok(value) = env::var("KTZ_CHUNK_SIZE") {
        if let Ok(chunk_size) = value.parse::<usize>() {
            config.system.chunk_size = chunk_size;
        }
    }
    if let Ok(value) = env::var("KTZ_PROGRESS_PERCENT") {
        if let Ok(percent) = value.parse::<f64>() {
            config.system.progress_percent = percent;
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments, e.g. `{"output_dir": "out", "steps": "500"}`
///
/// `steps` and `points` apply to every ISI sweep (and every axis); the
/// return map keeps its own length.
///
/// # Errors
///
/// Unlike environment variables, a malformed CLI value is reported as
/// `ConfigError::InvalidValue`.
pub fn apply_cli_overrides(
    config: &mut KtzConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("output_dir") {
        config.system.output_dir = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = cli_args.get("log_format") {
        config.system.log_format = value.clone();
    }
    if let Some(value) = cli_args.get("parallel") {
        config.system.parallel = parse_flag(value);
    }
    if let Some(value) = cli_args.get("max_threads") {
        config.system.max_threads = parse_number("max_threads", value)?;
    }
    if let Some(value) = cli_args.get("chunk_size") {
        config.system.chunk_size = parse_number("chunk_size", value)?;
    }
    if let Some(value) = cli_args.get("progress_percent") {
        config.system.progress_percent = parse_number("progress_percent", value)?;
    }

    if let Some(value) = cli_args.get("steps") {
        let steps: usize = parse_number("steps", value)?;
        for experiment in config.experiments.values_mut() {
            if experiment.kind == ExperimentKind::IsiSweep {
                experiment.steps = steps;
            }
        }
    }
    if let Some(value) = cli_args.get("points") {
        let points: usize = parse_number("points", value)?;
        for experiment in config.experiments.values_mut() {
            for axis in &mut experiment.axes {
                axis.points = points;
            }
        }
    }

    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(format!("{} = '{}' is not a valid number", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PRESET_ISI_HISTOGRAM, PRESET_MEAN_ISI_THRESHOLD, PRESET_RETURN_MAP};
    use ktz_neural::{DetectionPolicy, StatisticMode};
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var(CONFIG_PATH_ENV, config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV);

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_missing_env_path_is_an_error() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        env::set_var(CONFIG_PATH_ENV, missing.to_str().unwrap());
        let result = load_config(None, None);
        env::remove_var(CONFIG_PATH_ENV);

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[system]").unwrap();
        writeln!(file, "chunk_size = 128").unwrap();
        writeln!(file, "[model]").unwrap();
        writeln!(file, "T = 0.3").unwrap();
        writeln!(file, "x_R = -0.195").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.system.chunk_size, 128);
        assert_eq!(config.model.t, 0.3);
        assert_eq!(config.model.x_r, -0.195);
        assert_eq!(config.model.k, 0.6);
        assert_eq!(config.experiments.len(), 4);
    }

    #[test]
    fn test_user_experiments_merge_with_presets() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[experiments.mean_isi_threshold]").unwrap();
        writeln!(file, "output_file = \"custom.dat\"").unwrap();
        writeln!(file, "steps = 200").unwrap();
        writeln!(file, "[[experiments.mean_isi_threshold.axes]]").unwrap();
        writeln!(file, "parameter = \"T\"").unwrap();
        writeln!(file, "start = 0.2").unwrap();
        writeln!(file, "end = 0.3").unwrap();
        writeln!(file, "points = 11").unwrap();
        writeln!(file, "[experiments.k_scan]").unwrap();
        writeln!(file, "statistic = \"histogram\"").unwrap();
        writeln!(file, "detector = {{ policy = \"sign_change\" }}").unwrap();
        writeln!(file, "[[experiments.k_scan.axes]]").unwrap();
        writeln!(file, "parameter = \"k\"").unwrap();
        writeln!(file, "start = 0.5").unwrap();
        writeln!(file, "end = 0.7").unwrap();
        writeln!(file, "points = 5").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.experiments.len(), 5);
        let overridden = &config.experiments[PRESET_MEAN_ISI_THRESHOLD];
        assert_eq!(overridden.output_file, "custom.dat");
        assert_eq!(overridden.steps, 200);
        assert_eq!(overridden.axes[0].points, 11);

        let custom = &config.experiments["k_scan"];
        assert_eq!(custom.kind, ExperimentKind::IsiSweep);
        assert_eq!(custom.statistic, StatisticMode::Histogram);
        assert_eq!(custom.detector, DetectionPolicy::SignChange);
        assert_eq!(custom.axes[0].parameter, "k");

        // Untouched presets are still present
        assert!(config.experiments.contains_key(PRESET_ISI_HISTOGRAM));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[system\nparallel = ").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = KtzConfig::default();

        env::set_var("KTZ_OUTPUT_DIR", "/data/ktz");
        env::set_var("KTZ_PARALLEL", "yes");
        env::set_var("KTZ_CHUNK_SIZE", "not-a-number");

        apply_environment_overrides(&mut config);

        env::remove_var("KTZ_OUTPUT_DIR");
        env::remove_var("KTZ_PARALLEL");
        env::remove_var("KTZ_CHUNK_SIZE");

        assert_eq!(config.system.output_dir, PathBuf::from("/data/ktz"));
        assert!(config.system.parallel);
        assert_eq!(config.system.chunk_size, 4096);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = KtzConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("output_dir".to_string(), "results".to_string());
        cli_args.insert("steps".to_string(), "250".to_string());
        cli_args.insert("points".to_string(), "7".to_string());
        cli_args.insert("log_format".to_string(), "compact".to_string());

        apply_cli_overrides(&mut config, &cli_args).unwrap();

        assert_eq!(config.system.output_dir, PathBuf::from("results"));
        assert_eq!(config.system.log_format, "compact");
        assert!(config
            .experiments
            .values()
            .filter(|e| e.kind == ExperimentKind::IsiSweep)
            .all(|e| e.steps == 250));
        assert_eq!(config.experiments[PRESET_RETURN_MAP].steps, 13_000_000);
        assert!(crate::validate_config(&config).is_ok());
        assert!(config
            .experiments
            .values()
            .flat_map(|e| e.axes.iter())
            .all(|a| a.points == 7));
    }

    #[test]
    fn test_cli_rejects_malformed_number() {
        let mut config = KtzConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("chunk_size".to_string(), "lots".to_string());

        let result = apply_cli_overrides(&mut config, &cli_args);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[system]").unwrap();
        writeln!(file, "output_dir = \"file-dir\"").unwrap();
        writeln!(file, "log_level = \"warn\"").unwrap();

        env::set_var("KTZ_OUTPUT_DIR", "env-dir");
        env::set_var("KTZ_LOG_LEVEL", "debug");

        let mut cli_args = HashMap::new();
        cli_args.insert("output_dir".to_string(), "cli-dir".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("KTZ_OUTPUT_DIR");
        env::remove_var("KTZ_LOG_LEVEL");

        // CLI wins for output_dir, env wins for log_level (no CLI override)
        assert_eq!(config.system.output_dir, PathBuf::from("cli-dir"));
        assert_eq!(config.system.log_level, "debug");
    }
}
