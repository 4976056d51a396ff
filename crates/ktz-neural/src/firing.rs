// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Spike Detection
//!
//! Detectors consume the membrane potential one state at a time and report
//! whether the newest state is a spike. Three policies are available:
//!
//! ```text
//! ThresholdReset:      x > θ                       (then x ← x_reset)
//! RisingZeroCrossing:  x_prev <= 0 && x > 0
//! SignChange:          x_prev < x && x_prev·x < 0
//! ```
//!
//! `ThresholdReset` is closed-loop: it writes the reset value back into the
//! state so the same excursion cannot fire on consecutive steps. The two
//! crossing policies only read the state.

use crate::types::{KtzError, KtzState, Result};

/// Default threshold of the threshold-and-reset policy
pub const DEFAULT_SPIKE_THRESHOLD: f64 = 0.8;

/// Default value `x` is forced to after a threshold spike
pub const DEFAULT_RESET_POTENTIAL: f64 = -0.1;

/// Streaming spike detector
pub trait SpikeDetector {
    fn policy_name(&self) -> &'static str;

    /// Forget any previous run and start from `initial`
    fn prime(&mut self, initial: &KtzState);

    /// Inspect the newest state, returning `true` when it is a spike.
    ///
    /// At most one spike is reported per call. Closed-loop detectors may
    /// modify `state`; the caller must continue the simulation from the
    /// modified value.
    fn observe(&mut self, state: &mut KtzState) -> bool;
}

/// Fixed threshold with forced reset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdResetDetector {
    pub threshold: f64,
    pub reset: f64,
}

impl ThresholdResetDetector {
    pub fn new(threshold: f64, reset: f64) -> Self {
        Self { threshold, reset }
    }
}

impl Default for ThresholdResetDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SPIKE_THRESHOLD, DEFAULT_RESET_POTENTIAL)
    }
}

impl SpikeDetector for ThresholdResetDetector {
    fn policy_name(&self) -> &'static str {
        "threshold-reset"
    }

    fn prime(&mut self, _initial: &KtzState) {}

    #[inline]
    fn observe(&mut self, state: &mut KtzState) -> bool {
        if state.x > self.threshold {
            state.x = self.reset;
            true
        } else {
            false
        }
    }
}

/// Rising crossing through zero (`x_prev <= 0 && x > 0`)
#[derive(Debug, Clone, Copy, Default)]
pub struct RisingZeroCrossingDetector {
    previous: f64,
}

impl SpikeDetector for RisingZeroCrossingDetector {
    fn policy_name(&self) -> &'static str {
        "rising-zero-crossing"
    }

    fn prime(&mut self, initial: &KtzState) {
        self.previous = initial.x;
    }

    #[inline]
    fn observe(&mut self, state: &mut KtzState) -> bool {
        let fired = self.previous <= 0.0 && state.x > 0.0;
        self.previous = state.x;
        fired
    }
}

/// Upward sign change (`x_prev < x && x_prev·x < 0`)
///
/// Unlike [`RisingZeroCrossingDetector`], landing exactly on zero never counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignChangeDetector {
    previous: f64,
}

impl SpikeDetector for SignChangeDetector {
    fn policy_name(&self) -> &'static str {
        "sign-change"
    }

    fn prime(&mut self, initial: &KtzState) {
        self.previous = initial.x;
    }

    #[inline]
    fn observe(&mut self, state: &mut KtzState) -> bool {
        let fired = self.previous < state.x && self.previous * state.x < 0.0;
        self.previous = state.x;
        fired
    }
}

/// Serializable choice of detection policy
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "policy", rename_all = "snake_case"))]
pub enum DetectionPolicy {
    ThresholdReset { threshold: f64, reset: f64 },
    RisingZeroCrossing,
    SignChange,
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        DetectionPolicy::ThresholdReset {
            threshold: DEFAULT_SPIKE_THRESHOLD,
            reset: DEFAULT_RESET_POTENTIAL,
        }
    }
}

impl DetectionPolicy {
    pub fn validate(&self) -> Result<()> {
        if let DetectionPolicy::ThresholdReset { threshold, reset } = *self {
            if !threshold.is_finite() {
                return Err(KtzError::InvalidParameter {
                    name: "threshold",
                    value: threshold,
                    reason: "must be finite",
                });
            }
            if !reset.is_finite() || reset >= threshold {
                return Err(KtzError::InvalidParameter {
                    name: "reset",
                    value: reset,
                    reason: "must be finite and below the spike threshold",
                });
            }
        }
        Ok(())
    }

    /// Build a fresh detector for one simulation run
    pub fn build(&self) -> Detector {
        match *self {
            DetectionPolicy::ThresholdReset { threshold, reset } => {
                Detector::ThresholdReset(ThresholdResetDetector::new(threshold, reset))
            }
            DetectionPolicy::RisingZeroCrossing => {
                Detector::RisingZeroCrossing(RisingZeroCrossingDetector::default())
            }
            DetectionPolicy::SignChange => Detector::SignChange(SignChangeDetector::default()),
        }
    }
}

/// Enum-dispatched detector built from a [`DetectionPolicy`]
#[derive(Debug, Clone, Copy)]
pub enum Detector {
    ThresholdReset(ThresholdResetDetector),
    RisingZeroCrossing(RisingZeroCrossingDetector),
    SignChange(SignChangeDetector),
}

impl SpikeDetector for Detector {
    fn policy_name(&self) -> &'static str {
        match self {
            Detector::ThresholdReset(d) => d.policy_name(),
            Detector::RisingZeroCrossing(d) => d.policy_name(),
            Detector::SignChange(d) => d.policy_name(),
        }
    }

    fn prime(&mut self, initial: &KtzState) {
        match self {
            Detector::ThresholdReset(d) => d.prime(initial),
            Detector::RisingZeroCrossing(d) => d.prime(initial),
            Detector::SignChange(d) => d.prime(initial),
        }
    }

    #[inline]
    fn observe(&mut self, state: &mut KtzState) -> bool {
        match self {
            Detector::ThresholdReset(d) => d.observe(state),
            Detector::RisingZeroCrossing(d) => d.observe(state),
            Detector::SignChange(d) => d.observe(state),
        }
    }
}

/// Ordered step indices of detected spikes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpikeTrain {
    events: Vec<usize>,
}

impl SpikeTrain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already ordered indices
    pub fn from_events(events: Vec<usize>) -> Self {
        debug_assert!(events.windows(2).all(|w| w[0] <= w[1]));
        Self { events }
    }

    #[inline]
    pub fn record(&mut self, step: usize) {
        debug_assert!(self.events.last().map_or(true, |&last| last <= step));
        self.events.push(step);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.events
    }

    /// Whether at least one interval can be formed
    pub fn has_intervals(&self) -> bool {
        self.events.len() >= 2
    }

    pub fn intervals(&self) -> impl Iterator<Item = usize> + '_ {
        self.events.windows(2).map(|w| w[1] - w[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed<D: SpikeDetector>(detector: &mut D, initial: f64, xs: &[f64]) -> Vec<usize> {
        detector.prime(&KtzState::new(initial, 0.0, 0.0));
        xs.iter()
            .enumerate()
            .filter_map(|(step, &x)| {
                let mut state = KtzState::new(x, 0.0, 0.0);
                detector.observe(&mut state).then_some(step)
            })
            .collect()
    }

    #[test]
    fn test_threshold_fires_above_threshold_only() {
        let mut detector = ThresholdResetDetector::default();
        let spikes = feed(&mut detector, 0.0, &[0.5, 0.8, 0.81, 0.2, 0.95]);
        assert_eq!(spikes, vec![2, 4]);
    }

    #[test]
    fn test_threshold_resets_state() {
        let mut detector = ThresholdResetDetector::default();
        let mut state = KtzState::new(0.9, 0.3, 0.1);
        assert!(detector.observe(&mut state));
        assert_eq!(state.x, DEFAULT_RESET_POTENTIAL);
        assert_eq!(state.y, 0.3);
        assert_eq!(state.z, 0.1);

        // The reset value itself is far below threshold
        assert!(!detector.observe(&mut state));
    }

    #[test]
    fn test_rising_zero_crossing() {
        let mut detector = RisingZeroCrossingDetector::default();
        // 0.0 -> 0.3 counts (previous <= 0), falling crossings never do
        let spikes = feed(&mut detector, -0.2, &[0.0, 0.3, -0.1, -0.4, 0.2, 0.6]);
        assert_eq!(spikes, vec![1, 4]);
    }

    #[test]
    fn test_rising_zero_crossing_uses_initial_state() {
        let mut detector = RisingZeroCrossingDetector::default();
        assert_eq!(feed(&mut detector, -0.5, &[0.5]), vec![0]);
        assert!(feed(&mut detector, 0.1, &[0.5]).is_empty());
    }

    #[test]
    fn test_sign_change_ignores_zero_landing() {
        let mut detector = SignChangeDetector::default();
        let spikes = feed(&mut detector, -0.2, &[0.0, 0.3, -0.1, 0.4]);
        assert_eq!(spikes, vec![3]);
    }

    #[test]
    fn test_policy_validation() {
        assert!(DetectionPolicy::default().validate().is_ok());
        assert!(DetectionPolicy::SignChange.validate().is_ok());
        let inverted = DetectionPolicy::ThresholdReset {
            threshold: 0.1,
            reset: 0.5,
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_built_detector_dispatches() {
        let mut detector = DetectionPolicy::RisingZeroCrossing.build();
        assert_eq!(detector.policy_name(), "rising-zero-crossing");
        assert_eq!(feed(&mut detector, -1.0, &[0.5, -0.5, 0.5]), vec![0, 2]);
    }

    #[test]
    fn test_spike_train_intervals() {
        let train = SpikeTrain::from_events(vec![5, 12, 20, 35]);
        assert!(train.has_intervals());
        assert_eq!(train.intervals().collect::<Vec<_>>(), vec![7, 8, 15]);
        assert!(!SpikeTrain::from_events(vec![3]).has_intervals());
    }
}
