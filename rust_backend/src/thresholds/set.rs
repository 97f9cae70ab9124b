use chrono::Duration;
use qtty::{Kilometers, Meters};
use serde::{Deserialize, Serialize};

use crate::error::{HandoverError, HandoverResult};

/// Inclusive range a threshold must stay within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
}

impl ValidRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, name: &str, value: f64) -> HandoverResult<()> {
        if self.min > self.max {
            return Err(HandoverError::Configuration(format!(
                "{} valid range is inverted: [{}, {}]",
                name, self.min, self.max
            )));
        }
        if !self.contains(value) {
            return Err(HandoverError::Configuration(format!(
                "{} = {} is outside its valid range [{}, {}]",
                name, value, self.min, self.max
            )));
        }
        Ok(())
    }
}

fn check_non_negative(name: &str, value: f64) -> HandoverResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(HandoverError::Configuration(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// A4: neighbour becomes better than threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct A4Thresholds {
    pub threshold_dbm: f64,
    pub hysteresis_db: f64,
    pub time_to_trigger_ms: u64,
    pub valid_range: ValidRange,
}

impl Default for A4Thresholds {
    fn default() -> Self {
        Self {
            threshold_dbm: -106.0,
            hysteresis_db: 2.0,
            time_to_trigger_ms: 160,
            valid_range: ValidRange::new(-125.0, -85.0),
        }
    }
}

/// A5: serving worse than threshold 1 and neighbour better than threshold 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct A5Thresholds {
    pub threshold1_dbm: f64,
    pub threshold2_dbm: f64,
    pub hysteresis_db: f64,
    pub time_to_trigger_ms: u64,
    pub valid_range: ValidRange,
}

impl Default for A5Thresholds {
    fn default() -> Self {
        Self {
            threshold1_dbm: -106.0,
            threshold2_dbm: -106.0,
            hysteresis_db: 2.0,
            time_to_trigger_ms: 160,
            valid_range: ValidRange::new(-125.0, -85.0),
        }
    }
}

/// D2: serving reference beyond threshold 1 and candidate within threshold 2.
///
/// Distances are in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct D2Thresholds {
    pub threshold1_m: Meters,
    pub threshold2_m: Meters,
    pub hysteresis_m: Meters,
    pub time_to_trigger_ms: u64,
    pub valid_range: ValidRange,
}

impl Default for D2Thresholds {
    fn default() -> Self {
        Self {
            threshold1_m: Kilometers::new(1500.0).to(),
            threshold2_m: Kilometers::new(1200.0).to(),
            hysteresis_m: Kilometers::new(50.0).to(),
            time_to_trigger_ms: 320,
            valid_range: ValidRange::new(500_000.0, 3_000_000.0),
        }
    }
}

/// Cell-specific and frequency-specific measurement offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementOffsets {
    pub ofn_db: f64,
    pub ocn_db: f64,
}

impl MeasurementOffsets {
    pub fn total_db(&self) -> f64 {
        self.ofn_db + self.ocn_db
    }
}

/// Detection thresholds for all event types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSet {
    pub a4: A4Thresholds,
    pub a5: A5Thresholds,
    pub d2: D2Thresholds,
    pub offsets: MeasurementOffsets,
}

pub fn time_to_trigger(ms: u64) -> Duration {
    Duration::milliseconds(ms.min(i64::MAX as u64) as i64)
}

impl ThresholdSet {
    /// Check every threshold against its valid range and every hysteresis for sign.
    pub fn validate(&self) -> HandoverResult<()> {
        self.a4.valid_range.check("a4.threshold_dbm", self.a4.threshold_dbm)?;
        check_non_negative("a4.hysteresis_db", self.a4.hysteresis_db)?;

        self.a5.valid_range.check("a5.threshold1_dbm", self.a5.threshold1_dbm)?;
        self.a5.valid_range.check("a5.threshold2_dbm", self.a5.threshold2_dbm)?;
        check_non_negative("a5.hysteresis_db", self.a5.hysteresis_db)?;

        self.d2.valid_range.check("d2.threshold1_m", self.d2.threshold1_m.value())?;
        self.d2.valid_range.check("d2.threshold2_m", self.d2.threshold2_m.value())?;
        check_non_negative("d2.hysteresis_m", self.d2.hysteresis_m.value())?;

        if !self.offsets.total_db().is_finite() {
            return Err(HandoverError::Configuration(
                "measurement offsets must be finite".to_string(),
            ));
        }

        Ok(())
    }

    /// True when every adjustable threshold lies within its valid range.
    pub fn within_valid_ranges(&self) -> bool {
        self.a4.valid_range.contains(self.a4.threshold_dbm)
            && self.a5.valid_range.contains(self.a5.threshold1_dbm)
            && self.a5.valid_range.contains(self.a5.threshold2_dbm)
            && self.d2.valid_range.contains(self.d2.threshold1_m.value())
            && self.d2.valid_range.contains(self.d2.threshold2_m.value())
    }
}
