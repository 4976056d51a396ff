// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module provides validation logic to ensure configuration values are
//! consistent and within ranges where the KTz update rule is defined.

use crate::types::{AxisConfig, ExperimentConfig, ExperimentKind};
use crate::{ConfigError, ConfigResult, KtzConfig};
use ktz_neural::{KtzParameters, SweptParameter};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["full", "compact"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvalidValue { field: String, reason: String },
    UnknownParameter { field: String, name: String },
    DuplicateAxis { experiment: String, parameter: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::UnknownParameter { field, name } => {
                write!(f, "Unknown sweep parameter '{}' in {}", name, field)
            }
            Self::DuplicateAxis {
                experiment,
                parameter,
            } => {
                write!(
                    f,
                    "Experiment {} sweeps parameter {} on more than one axis",
                    experiment, parameter
                )
            }
        }
    }
}

fn invalid(errors: &mut Vec<ConfigValidationError>, field: String, reason: &str) {
    errors.push(ConfigValidationError::InvalidValue {
        field,
        reason: reason.to_string(),
    });
}

/// Validate the complete configuration
///
/// Checks for:
/// - System settings (log level and format, chunk size, progress interval)
/// - Model parameters (finite, T strictly positive)
/// - Every experiment, enabled or not (step budget, axes, detector, output file)
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &KtzConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

/// Every validation problem, in a stable order
pub fn collect_errors(config: &KtzConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();

    validate_system(config, &mut errors);
    validate_model(config, &mut errors);
    for (name, experiment) in &config.experiments {
        validate_experiment(name, experiment, &mut errors);
    }

    errors
}

fn validate_system(config: &KtzConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.system.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        invalid(
            errors,
            "system.log_level".to_string(),
            "must be one of trace, debug, info, warn, error",
        );
    }
    if !LOG_FORMATS.contains(&config.system.log_format.to_lowercase().as_str()) {
        invalid(
            errors,
            "system.log_format".to_string(),
            "must be one of full, compact",
        );
    }
    if config.system.chunk_size == 0 {
        invalid(errors, "system.chunk_size".to_string(), "must be greater than 0");
    }
    let percent = config.system.progress_percent;
    if !(percent > 0.0 && percent <= 100.0) {
        invalid(
            errors,
            "system.progress_percent".to_string(),
            "must be in (0, 100]",
        );
    }
}

/// Check the model the way each experiment will run it.
///
/// A swept parameter replaces the base value at every grid point, so a base
/// `T = 0` is fine as long as every experiment that would use it sweeps `T`.
/// Axis values themselves are checked per axis.
fn validate_model(config: &KtzConfig, errors: &mut Vec<ConfigValidationError>) {
    let base = config.model.to_parameters();

    let failure = if config.experiments.is_empty() {
        base.validate().err().map(|e| e.to_string())
    } else {
        config.experiments.iter().find_map(|(name, experiment)| {
            effective_parameters(&base, experiment)
                .validate()
                .err()
                .map(|e| format!("{} (used by experiment {})", e, name))
        })
    };

    if let Some(reason) = failure {
        errors.push(ConfigValidationError::InvalidValue {
            field: "model".to_string(),
            reason,
        });
    }
}

/// Base parameters with the first value of every parseable axis applied
fn effective_parameters(base: &KtzParameters, experiment: &ExperimentConfig) -> KtzParameters {
    experiment
        .axes
        .iter()
        .filter_map(|axis| {
            let parameter = axis.parameter.parse::<SweptParameter>().ok()?;
            Some((parameter, axis.start))
        })
        .fold(*base, |params, (parameter, value)| params.with(parameter, value))
}

fn validate_experiment(
    name: &str,
    experiment: &ExperimentConfig,
    errors: &mut Vec<ConfigValidationError>,
) {
    let field = |suffix: &str| format!("experiments.{}.{}", name, suffix);

    if experiment.steps == 0 {
        invalid(errors, field("steps"), "must be greater than 0");
    }
    if experiment.output_file.trim().is_empty() {
        invalid(errors, field("output_file"), "must not be empty");
    }

    let initial = &experiment.initial;
    if !(initial.x.is_finite() && initial.y.is_finite() && initial.z.is_finite()) {
        invalid(errors, field("initial"), "initial conditions must be finite");
    }

    match experiment.kind {
        ExperimentKind::IsiSweep => {
            if experiment.axes.is_empty() || experiment.axes.len() > 2 {
                invalid(errors, field("axes"), "an ISI sweep needs one or two axes");
            }
            if let Err(e) = experiment.detector.validate() {
                errors.push(ConfigValidationError::InvalidValue {
                    field: field("detector"),
                    reason: e.to_string(),
                });
            }

            let mut seen: Vec<SweptParameter> = Vec::new();
            for (idx, axis) in experiment.axes.iter().enumerate() {
                let axis_field = field(&format!("axes[{}]", idx));
                if let Some(parameter) = validate_axis(&axis_field, axis, errors) {
                    if seen.contains(&parameter) {
                        errors.push(ConfigValidationError::DuplicateAxis {
                            experiment: name.to_string(),
                            parameter: parameter.label().to_string(),
                        });
                    }
                    seen.push(parameter);
                }
            }
        }
        ExperimentKind::ReturnMap => {
            if !experiment.axes.is_empty() {
                invalid(errors, field("axes"), "a return map does not sweep parameters");
            }
            if experiment.transient >= experiment.steps {
                invalid(errors, field("transient"), "must be smaller than steps");
            }
        }
    }
}

fn validate_axis(
    field: &str,
    axis: &AxisConfig,
    errors: &mut Vec<ConfigValidationError>,
) -> Option<SweptParameter> {
    if axis.points < 2 {
        invalid(errors, format!("{}.points", field), "must be at least 2");
    }
    if !(axis.start.is_finite() && axis.end.is_finite()) {
        invalid(errors, field.to_string(), "start and end must be finite");
    }

    let parameter = match axis.parameter.parse::<SweptParameter>() {
        Ok(parameter) => parameter,
        Err(_) => {
            errors.push(ConfigValidationError::UnknownParameter {
                field: format!("{}.parameter", field),
                name: axis.parameter.clone(),
            });
            return None;
        }
    };

    // Evenly spaced values lie between the endpoints, so checking both covers the axis
    if parameter == SweptParameter::T && (axis.start <= 0.0 || axis.end <= 0.0) {
        invalid(
            errors,
            field.to_string(),
            "T must be strictly positive over the whole range",
        );
    }

    Some(parameter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PRESET_ISI_HISTOGRAM, PRESET_MEAN_ISI_THRESHOLD, PRESET_RETURN_MAP};
    use ktz_neural::DetectionPolicy;

    #[test]
    fn test_valid_default_config() {
        let config = KtzConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_temperature_range_must_be_positive() {
        let mut config = KtzConfig::default();
        let experiment = config.experiments.get_mut(PRESET_MEAN_ISI_THRESHOLD).unwrap();
        experiment.axes[0].start = 0.0;

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("strictly positive"));
    }

    #[test]
    fn test_single_point_axis_rejected() {
        let mut config = KtzConfig::default();
        let experiment = config.experiments.get_mut(PRESET_MEAN_ISI_THRESHOLD).unwrap();
        experiment.axes[0].points = 1;

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_unknown_and_duplicate_parameters() {
        let mut config = KtzConfig::default();
        let experiment = config.experiments.get_mut(PRESET_ISI_HISTOGRAM).unwrap();
        experiment.axes[0].parameter = "T".to_string();

        let errors = collect_errors(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigValidationError::DuplicateAxis { .. })));

        experiment_mut(&mut config, PRESET_ISI_HISTOGRAM).axes[0].parameter = "voltage".to_string();
        let errors = collect_errors(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigValidationError::UnknownParameter { .. })));
    }

    #[test]
    fn test_return_map_constraints() {
        let mut config = KtzConfig::default();
        let experiment = experiment_mut(&mut config, PRESET_RETURN_MAP);
        experiment.transient = experiment.steps;

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_errors_are_accumulated() {
        let mut config = KtzConfig::default();
        config.system.chunk_size = 0;
        config.system.log_level = "verbose".to_string();
        config.model.t = 0.0;
        let experiment = experiment_mut(&mut config, PRESET_MEAN_ISI_THRESHOLD);
        experiment.steps = 0;
        experiment.detector = DetectionPolicy::ThresholdReset {
            threshold: -0.5,
            reset: 0.0,
        };

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 5);

        match validate_config(&config) {
            Err(ConfigError::ValidationError(message)) => {
                assert!(message.contains("system.chunk_size"));
                assert!(message.contains("experiments.mean_isi_threshold.steps"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let mut config = KtzConfig::default();
        config.system.log_format = "pretty".to_string();

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("system.log_format"));
    }

    #[test]
    fn test_swept_temperature_covers_invalid_base() {
        let mut config = KtzConfig::default();
        config.model.t = 0.0;

        // The return map runs at the base T
        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains(PRESET_RETURN_MAP));

        // Every remaining experiment sweeps T, so the base T is never used
        config.experiments.remove(PRESET_RETURN_MAP);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_base_without_experiments() {
        let mut config = KtzConfig::default();
        config.experiments.clear();
        config.model.k = f64::NAN;

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("model"));
    }

    fn experiment_mut<'a>(config: &'a mut KtzConfig, name: &str) -> &'a mut ExperimentConfig {
        config.experiments.get_mut(name).unwrap()
    }
}
