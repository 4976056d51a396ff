// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Resolved experiment descriptions handed to the driver

use ktz_config::{ExperimentConfig, ExperimentKind, ModelConfig};
use ktz_neural::{DetectionPolicy, KtzParameters, KtzState, StatisticMode, SweptParameter};

use crate::error::{SweepError, SweepResult};
use crate::grid::{SweepAxis, SweepGrid};

/// Everything needed to run one ISI sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSpec {
    pub name: String,
    /// Parameters of every grid point before axis values are applied
    pub base: KtzParameters,
    /// State every grid point restarts from
    pub initial: KtzState,
    /// Map updates per grid point
    pub steps: usize,
    pub detection: DetectionPolicy,
    pub statistic: StatisticMode,
    pub grid: SweepGrid,
    pub write_header: bool,
}

impl SweepSpec {
    /// Build a spec from a named `isi_sweep` experiment
    pub fn from_experiment(
        name: &str,
        model: &ModelConfig,
        experiment: &ExperimentConfig,
    ) -> SweepResult<Self> {
        if experiment.kind != ExperimentKind::IsiSweep {
            return Err(SweepError::InvalidSpec(format!(
                "experiment {} is not an ISI sweep",
                name
            )));
        }

        let axes = experiment
            .axes
            .iter()
            .map(|axis| {
                let parameter: SweptParameter = axis.parameter.parse()?;
                SweepAxis::linspace(parameter, axis.start, axis.end, axis.points)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.to_string(),
            base: model.to_parameters(),
            initial: experiment.initial.to_state(),
            steps: experiment.steps,
            detection: experiment.detector,
            statistic: experiment.statistic,
            grid: SweepGrid::new(axes)?,
            write_header: experiment.header,
        })
    }

    /// Reject specs that would divide by zero or run nothing.
    ///
    /// Parameter checks are independent per parameter, so validating each
    /// axis value on its own covers every point of the Cartesian product.
    pub fn validate(&self) -> SweepResult<()> {
        if self.steps == 0 {
            return Err(SweepError::InvalidSpec(format!(
                "{}: step budget must be greater than 0",
                self.name
            )));
        }
        validate_initial(&self.name, &self.initial)?;
        self.detection.validate()?;

        let first = self.grid.coordinates(0);
        let anchor = self.grid.parameters(&self.base, &first);
        anchor.validate()?;
        for axis in self.grid.axes() {
            for &value in axis.values() {
                anchor.with(axis.parameter, value).validate()?;
            }
        }
        Ok(())
    }

    /// Column header, e.g. `x_R T ISI Frequency` or `T mean_ISI`
    pub fn header(&self) -> String {
        let mut columns = self.grid.labels();
        match self.statistic {
            StatisticMode::Mean => columns.push("mean_ISI"),
            StatisticMode::Histogram => columns.extend(["ISI", "Frequency"]),
        }
        columns.join(" ")
    }
}

/// Everything needed to produce a first-return map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnMapSpec {
    pub params: KtzParameters,
    pub initial: KtzState,
    pub steps: usize,
    /// Leading updates that are iterated but not written
    pub transient: usize,
    pub write_header: bool,
}

impl ReturnMapSpec {
    pub fn from_experiment(
        name: &str,
        model: &ModelConfig,
        experiment: &ExperimentConfig,
    ) -> SweepResult<Self> {
        if experiment.kind != ExperimentKind::ReturnMap {
            return Err(SweepError::InvalidSpec(format!(
                "experiment {} is not a return map",
                name
            )));
        }
        Ok(Self {
            params: model.to_parameters(),
            initial: experiment.initial.to_state(),
            steps: experiment.steps,
            transient: experiment.transient,
            write_header: experiment.header,
        })
    }

    pub fn validate(&self) -> SweepResult<()> {
        self.params.validate()?;
        validate_initial("return map", &self.initial)?;
        if self.transient >= self.steps {
            return Err(SweepError::InvalidSpec(format!(
                "transient ({}) must be smaller than the step budget ({})",
                self.transient, self.steps
            )));
        }
        Ok(())
    }

    /// Number of `(x_t, x_{t+1})` pairs produced
    pub fn pairs(&self) -> usize {
        self.steps.saturating_sub(self.transient)
    }

    pub fn header(&self) -> &'static str {
        "x_t x_t+1"
    }
}

fn validate_initial(name: &str, initial: &KtzState) -> SweepResult<()> {
    if initial.x.is_finite() && initial.y.is_finite() && initial.z.is_finite() {
        Ok(())
    } else {
        Err(SweepError::InvalidSpec(format!(
            "{}: initial conditions must be finite",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktz_config::{KtzConfig, PRESET_ISI_HISTOGRAM, PRESET_MEAN_ISI_THRESHOLD, PRESET_RETURN_MAP};

    fn preset(name: &str) -> (KtzConfig, ExperimentConfig) {
        let config = KtzConfig::default();
        let experiment = config.experiments[name].clone();
        (config, experiment)
    }

    #[test]
    fn test_threshold_preset_spec() {
        let (config, experiment) = preset(PRESET_MEAN_ISI_THRESHOLD);
        let spec = SweepSpec::from_experiment(PRESET_MEAN_ISI_THRESHOLD, &config.model, &experiment)
            .unwrap();

        assert_eq!(spec.grid.len(), 50);
        assert_eq!(spec.steps, 1000);
        assert_eq!(spec.initial, KtzState::new(-0.35, -0.1, 0.0));
        assert_eq!(spec.header(), "T mean_ISI");
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_histogram_header() {
        let (config, mut experiment) = preset(PRESET_ISI_HISTOGRAM);
        for axis in &mut experiment.axes {
            axis.points = 3;
        }
        let spec =
            SweepSpec::from_experiment(PRESET_ISI_HISTOGRAM, &config.model, &experiment).unwrap();
        assert_eq!(spec.header(), "x_R T ISI Frequency");
        assert_eq!(spec.grid.len(), 9);
    }

    #[test]
    fn test_zero_temperature_is_rejected() {
        let (config, mut experiment) = preset(PRESET_MEAN_ISI_THRESHOLD);
        experiment.axes[0].start = 0.0;
        let spec = SweepSpec::from_experiment("zero_t", &config.model, &experiment).unwrap();

        match spec.validate() {
            Err(SweepError::Model(e)) => assert!(e.to_string().contains("T")),
            other => panic!("expected a model error, got {:?}", other),
        }
    }

    #[test]
    fn test_swept_temperature_overrides_invalid_base() {
        let (mut config, experiment) = preset(PRESET_MEAN_ISI_THRESHOLD);
        config.model.t = 0.0;
        let spec = SweepSpec::from_experiment("swept", &config.model, &experiment).unwrap();
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_kind_mismatch() {
        let (config, experiment) = preset(PRESET_RETURN_MAP);
        assert!(SweepSpec::from_experiment(PRESET_RETURN_MAP, &config.model, &experiment).is_err());

        let spec =
            ReturnMapSpec::from_experiment(PRESET_RETURN_MAP, &config.model, &experiment).unwrap();
        assert_eq!(spec.pairs(), 13_000_000 - 2000);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_unknown_axis_parameter() {
        let (config, mut experiment) = preset(PRESET_MEAN_ISI_THRESHOLD);
        experiment.axes[0].parameter = "voltage".to_string();
        assert!(matches!(
            SweepSpec::from_experiment("bad", &config.model, &experiment),
            Err(SweepError::Model(_))
        ));
    }
}
