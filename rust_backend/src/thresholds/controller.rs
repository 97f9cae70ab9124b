use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::rules::{propose, AdjustmentRule, ThresholdParameter};
use super::set::{ThresholdSet, ValidRange};
use crate::error::{HandoverError, HandoverResult};
use crate::models::NetworkConditions;

/// Tuning of the closed control loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Fraction of each proposed delta that is applied.
    pub momentum: f64,
    /// Minimum time between two adjustments.
    pub min_adjustment_interval_s: u64,
    /// Adjustment records kept for diagnostics.
    pub history_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            momentum: 0.8,
            min_adjustment_interval_s: 300,
            history_capacity: 100,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> HandoverResult<()> {
        if !(self.momentum > 0.0 && self.momentum <= 1.0) {
            return Err(HandoverError::Configuration(format!(
                "controller momentum must be in (0, 1], got {}",
                self.momentum
            )));
        }
        Ok(())
    }

    pub fn min_interval(&self) -> Duration {
        Duration::seconds(self.min_adjustment_interval_s.min(i64::MAX as u64 / 1000) as i64)
    }
}

/// One applied or rejected parameter change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pub timestamp: DateTime<Utc>,
    pub rule: AdjustmentRule,
    pub parameter: ThresholdParameter,
    pub old_value: f64,
    pub new_value: f64,
    /// False when the damped value fell outside the valid range.
    pub applied: bool,
}

/// Adapts detection thresholds to network conditions between cycles.
#[derive(Debug, Clone)]
pub struct ThresholdController {
    baseline: ThresholdSet,
    current: ThresholdSet,
    config: ControllerConfig,
    last_adjustment: Option<DateTime<Utc>>,
    history: VecDeque<AdjustmentRecord>,
}

impl ThresholdController {
    /// Create a controller whose baseline is `baseline`.
    ///
    /// # Returns
    /// * `Err(HandoverError::Configuration)` if the baseline or tuning is invalid
    pub fn new(baseline: ThresholdSet, config: ControllerConfig) -> HandoverResult<Self> {
        baseline.validate()?;
        config.validate()?;

        Ok(Self {
            baseline,
            current: baseline,
            config,
            last_adjustment: None,
            history: VecDeque::with_capacity(config.history_capacity),
        })
    }

    pub fn current(&self) -> &ThresholdSet {
        &self.current
    }

    pub fn baseline(&self) -> &ThresholdSet {
        &self.baseline
    }

    pub fn last_adjustment(&self) -> Option<DateTime<Utc>> {
        self.last_adjustment
    }

    pub fn history(&self) -> impl Iterator<Item = &AdjustmentRecord> {
        self.history.iter()
    }

    /// Adapt the current thresholds to `conditions`.
    ///
    /// Calls closer than the minimum interval to the last applied adjustment
    /// leave the thresholds untouched. Each damped change that would leave
    /// its valid range is dropped individually. A call that changes nothing
    /// does not restart the interval.
    pub fn adjust(&mut self, conditions: &NetworkConditions, now: DateTime<Utc>) -> &ThresholdSet {
        if let Some(last) = self.last_adjustment {
            if now - last < self.config.min_interval() {
                log::debug!(
                    "Threshold adjustment suppressed, {}s since last",
                    (now - last).num_seconds()
                );
                return &self.current;
            }
        }

        let mut any_applied = false;
        for proposal in propose(conditions) {
            let delta = proposal.delta * self.config.momentum;
            let (old_value, range) = self.read(proposal.parameter);
            let new_value = old_value + delta;
            let applied = range.contains(new_value);

            if applied {
                any_applied = true;
                self.write(proposal.parameter, new_value);
                log::info!(
                    "Threshold {:?} adjusted by {:?}: {:.2} -> {:.2}",
                    proposal.parameter,
                    proposal.rule,
                    old_value,
                    new_value
                );
            } else {
                log::info!(
                    "Threshold {:?} adjustment by {:?} skipped: {:.2} outside [{}, {}]",
                    proposal.parameter,
                    proposal.rule,
                    new_value,
                    range.min,
                    range.max
                );
            }

            self.record(AdjustmentRecord {
                timestamp: now,
                rule: proposal.rule,
                parameter: proposal.parameter,
                old_value,
                new_value,
                applied,
            });
        }

        if any_applied {
            self.last_adjustment = Some(now);
        }

        &self.current
    }

    /// Restore the baseline thresholds and clear the rate limiter.
    pub fn reset_to_baseline(&mut self) {
        self.current = self.baseline;
        self.last_adjustment = None;
        log::info!("Thresholds reset to baseline");
    }

    fn read(&self, parameter: ThresholdParameter) -> (f64, ValidRange) {
        let t = &self.current;
        match parameter {
            ThresholdParameter::A4Threshold => (t.a4.threshold_dbm, t.a4.valid_range),
            ThresholdParameter::A5Threshold1 => (t.a5.threshold1_dbm, t.a5.valid_range),
            ThresholdParameter::A5Threshold2 => (t.a5.threshold2_dbm, t.a5.valid_range),
            ThresholdParameter::D2Threshold1 => (t.d2.threshold1_m.value(), t.d2.valid_range),
            ThresholdParameter::D2Threshold2 => (t.d2.threshold2_m.value(), t.d2.valid_range),
        }
    }

    fn write(&mut self, parameter: ThresholdParameter, value: f64) {
        let t = &mut self.current;
        match parameter {
            ThresholdParameter::A4Threshold => t.a4.threshold_dbm = value,
            ThresholdParameter::A5Threshold1 => t.a5.threshold1_dbm = value,
            ThresholdParameter::A5Threshold2 => t.a5.threshold2_dbm = value,
            ThresholdParameter::D2Threshold1 => t.d2.threshold1_m = qtty::Meters::new(value),
            ThresholdParameter::D2Threshold2 => t.d2.threshold2_m = qtty::Meters::new(value),
        }
    }

    fn record(&mut self, record: AdjustmentRecord) {
        if self.config.history_capacity == 0 {
            return;
        }
        while self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn controller() -> ThresholdController {
        ThresholdController::new(ThresholdSet::default(), ControllerConfig::default()).unwrap()
    }

    fn poor_signal() -> NetworkConditions {
        NetworkConditions::new(0.5, 0.1, 0.9, 0.5)
    }

    #[test]
    fn test_momentum_damps_delta() {
        let mut c = controller();
        let set = *c.adjust(&poor_signal(), t(0));
        assert_relative_eq!(set.a4.threshold_dbm, -106.0 - 1.6, epsilon = 1e-9);
    }

    #[test]
    fn test_second_adjustment_within_interval_is_noop() {
        let mut c = controller();
        let first = *c.adjust(&poor_signal(), t(0));
        let second = *c.adjust(&poor_signal(), t(299));
        assert_eq!(first, second);

        let third = *c.adjust(&poor_signal(), t(300));
        assert!(third.a4.threshold_dbm < second.a4.threshold_dbm);
    }

    #[test]
    fn test_out_of_range_adjustment_is_skipped() {
        let mut baseline = ThresholdSet::default();
        baseline.a4.threshold_dbm = -124.0;
        let mut c = ThresholdController::new(baseline, ControllerConfig::default()).unwrap();

        let set = *c.adjust(&poor_signal(), t(0));
        assert_eq!(set.a4.threshold_dbm, -124.0);
        let record = c.history().last().unwrap();
        assert!(!record.applied);
        assert!(c.last_adjustment().is_none());
    }

    #[test]
    fn test_neutral_call_does_not_start_interval() {
        let mut c = controller();
        let neutral = *c.adjust(&NetworkConditions::default(), t(0));
        assert_eq!(neutral, ThresholdSet::default());
        assert!(c.last_adjustment().is_none());

        let set = *c.adjust(&poor_signal(), t(100));
        assert!(set.a4.threshold_dbm < -106.0);
        assert_eq!(c.last_adjustment(), Some(t(100)));
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut c = controller();
        c.adjust(&NetworkConditions::new(0.9, 0.1, 0.5, 0.5), t(0));
        assert_ne!(c.current(), c.baseline());

        c.reset_to_baseline();
        assert_eq!(c.current(), &ThresholdSet::default());
        assert!(c.last_adjustment().is_none());
    }

    #[test]
    fn test_d2_adjusts_in_metres() {
        let mut c = controller();
        let set = *c.adjust(&NetworkConditions::new(0.95, 0.5, 0.9, 0.5), t(0));
        assert_relative_eq!(set.d2.threshold1_m.value(), 1_500_000.0 - 80_000.0, epsilon = 1e-6);
        assert_relative_eq!(set.d2.threshold2_m.value(), 1_200_000.0 - 80_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_baseline_is_configuration_error() {
        let mut baseline = ThresholdSet::default();
        baseline.d2.threshold1_m = qtty::Meters::new(10.0);
        let err = ThresholdController::new(baseline, ControllerConfig::default()).unwrap_err();
        assert!(matches!(err, HandoverError::Configuration(_)));
    }

    #[test]
    fn test_invalid_momentum_is_configuration_error() {
        let config = ControllerConfig {
            momentum: 0.0,
            ..ControllerConfig::default()
        };
        assert!(ThresholdController::new(ThresholdSet::default(), config).is_err());
    }
}
