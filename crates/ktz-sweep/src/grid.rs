// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Sweep Grids
//!
//! Evenly spaced axes and their Cartesian product. With two axes the first
//! one is the outer loop:
//!
//! ```text
//! index = outer * inner_len + inner
//! ```
//!
//! so the grid is enumerated row by row, exactly like two nested loops.

use ktz_neural::{KtzError, KtzParameters, Result, SweptParameter};

/// Maximum number of axes a grid may have
pub const MAX_AXES: usize = 2;

/// `points` evenly spaced values from `start` to `end`, both inclusive.
///
/// Value `i` is `start + i * (end - start) / (points - 1)`. The last value is
/// set to `end` itself so accumulated rounding never moves the endpoint.
pub fn linspace(start: f64, end: f64, points: usize) -> Result<Vec<f64>> {
    if points < 2 {
        return Err(KtzError::InvalidGrid(format!(
            "an axis needs at least 2 points, got {}",
            points
        )));
    }
    if !start.is_finite() || !end.is_finite() {
        return Err(KtzError::InvalidGrid(format!(
            "axis endpoints must be finite, got [{}, {}]",
            start, end
        )));
    }

    let step = (end - start) / (points - 1) as f64;
    let mut values: Vec<f64> = (0..points).map(|i| start + i as f64 * step).collect();
    values[0] = start;
    values[points - 1] = end;
    Ok(values)
}

/// One swept parameter and the values it takes
#[derive(Debug, Clone, PartialEq)]
pub struct SweepAxis {
    pub parameter: SweptParameter,
    values: Vec<f64>,
}

impl SweepAxis {
    pub fn linspace(parameter: SweptParameter, start: f64, end: f64, points: usize) -> Result<Self> {
        Ok(Self {
            parameter,
            values: linspace(start, end, points)?,
        })
    }

    /// Axis over explicit values (at least one)
    pub fn from_values(parameter: SweptParameter, values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(KtzError::InvalidGrid(format!(
                "axis {} has no values",
                parameter
            )));
        }
        Ok(Self { parameter, values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Cartesian product of one or two axes
#[derive(Debug, Clone, PartialEq)]
pub struct SweepGrid {
    axes: Vec<SweepAxis>,
}

impl SweepGrid {
    pub fn new(axes: Vec<SweepAxis>) -> Result<Self> {
        if axes.is_empty() || axes.len() > MAX_AXES {
            return Err(KtzError::InvalidGrid(format!(
                "a sweep has 1 to {} axes, got {}",
                MAX_AXES,
                axes.len()
            )));
        }
        for (idx, axis) in axes.iter().enumerate() {
            if axes[..idx].iter().any(|a| a.parameter == axis.parameter) {
                return Err(KtzError::InvalidGrid(format!(
                    "parameter {} is swept on more than one axis",
                    axis.parameter
                )));
            }
        }
        Ok(Self { axes })
    }

    pub fn single(axis: SweepAxis) -> Self {
        Self { axes: vec![axis] }
    }

    pub fn axes(&self) -> &[SweepAxis] {
        &self.axes
    }

    /// Total number of grid points
    pub fn len(&self) -> usize {
        self.axes.iter().map(SweepAxis::len).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column labels, outer axis first
    pub fn labels(&self) -> Vec<&'static str> {
        self.axes.iter().map(|a| a.parameter.label()).collect()
    }

    /// Axis values of grid point `index`, outer axis first
    pub fn coordinates(&self, index: usize) -> Vec<f64> {
        let mut coordinates = vec![0.0; self.axes.len()];
        let mut remainder = index;
        for (slot, axis) in coordinates.iter_mut().zip(&self.axes).rev() {
            *slot = axis.values[remainder % axis.len()];
            remainder /= axis.len();
        }
        coordinates
    }

    /// Base parameters with every axis value of a grid point applied
    pub fn parameters(&self, base: &KtzParameters, coordinates: &[f64]) -> KtzParameters {
        self.axes
            .iter()
            .zip(coordinates)
            .fold(*base, |params, (axis, &value)| params.with(axis.parameter, value))
    }

    /// Every grid point in output order
    pub fn points(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        (0..self.len()).map(move |index| self.coordinates(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_linspace_endpoints_are_exact() {
        let values = linspace(0.1, 0.4, 50).unwrap();
        assert_eq!(values.len(), 50);
        assert_eq!(values[0], 0.1);
        assert_eq!(values[49], 0.4);

        let step = 0.3 / 49.0;
        for (i, v) in values.iter().enumerate().take(49).skip(1) {
            assert!((v - (0.1 + i as f64 * step)).abs() < 1e-12);
        }
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_linspace_rejects_short_or_infinite_axes() {
        assert!(linspace(0.0, 1.0, 1).is_err());
        assert!(linspace(0.0, 1.0, 0).is_err());
        assert!(linspace(f64::NAN, 1.0, 5).is_err());
        assert!(linspace(0.0, f64::INFINITY, 5).is_err());
    }

    #[test]
    fn test_descending_axis() {
        let values = linspace(1.0, 0.0, 5).unwrap();
        assert_eq!(values, vec![1.0, 0.75, 0.5, 0.25, 0.0]);
    }

    #[test]
    fn test_grid_outer_axis_first() {
        let grid = SweepGrid::new(vec![
            SweepAxis::from_values(SweptParameter::XR, vec![-0.2, -0.1]).unwrap(),
            SweepAxis::from_values(SweptParameter::T, vec![0.1, 0.2, 0.3]).unwrap(),
        ])
        .unwrap();

        assert_eq!(grid.len(), 6);
        assert_eq!(grid.labels(), vec!["x_R", "T"]);
        let points: Vec<Vec<f64>> = grid.points().collect();
        assert_eq!(
            points,
            vec![
                vec![-0.2, 0.1],
                vec![-0.2, 0.2],
                vec![-0.2, 0.3],
                vec![-0.1, 0.1],
                vec![-0.1, 0.2],
                vec![-0.1, 0.3],
            ]
        );
    }

    #[test]
    fn test_grid_applies_coordinates() {
        let grid = SweepGrid::new(vec![
            SweepAxis::from_values(SweptParameter::XR, vec![-0.19]).unwrap(),
            SweepAxis::from_values(SweptParameter::T, vec![0.24]).unwrap(),
        ])
        .unwrap();
        let params = grid.parameters(&KtzParameters::default(), &grid.coordinates(0));
        assert_eq!(params.x_r, -0.19);
        assert_eq!(params.t, 0.24);
        assert_eq!(params.k, 0.6);
    }

    #[test]
    fn test_grid_rejects_bad_axis_sets() {
        let t = SweepAxis::from_values(SweptParameter::T, vec![0.1]).unwrap();
        assert!(SweepGrid::new(Vec::new()).is_err());
        assert!(SweepGrid::new(vec![t.clone(), t.clone()]).is_err());
        assert!(SweepGrid::new(vec![t.clone(), t.clone(), t]).is_err());
        assert!(SweepAxis::from_values(SweptParameter::K, Vec::new()).is_err());
    }

    proptest! {
        #[test]
        fn prop_linspace_shape(start in -10.0f64..10.0, span in 0.001f64..10.0, points in 2usize..500) {
            let end = start + span;
            let values = linspace(start, end, points).unwrap();
            prop_assert_eq!(values.len(), points);
            prop_assert_eq!(values[0], start);
            prop_assert_eq!(values[points - 1], end);
            prop_assert!(values.iter().all(|v| *v >= start && *v <= end));
        }

        #[test]
        fn prop_grid_index_roundtrip(outer in 1usize..20, inner in 1usize..20) {
            let grid = SweepGrid::new(vec![
                SweepAxis::from_values(SweptParameter::K, (0..outer).map(|i| i as f64).collect()).unwrap(),
                SweepAxis::from_values(SweptParameter::H, (0..inner).map(|i| i as f64).collect()).unwrap(),
            ]).unwrap();
            for index in 0..grid.len() {
                let c = grid.coordinates(index);
                prop_assert_eq!(c[0] as usize * inner + c[1] as usize, index);
            }
        }
    }
}
