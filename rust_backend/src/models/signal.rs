use chrono::{DateTime, Utc};
use qtty::{Degrees, Kilometers};
use serde::{Deserialize, Serialize};

use super::constellation::Constellation;
use crate::algorithms::statistics::MetricStats;

/// Signal quality grade derived from RSRP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl QualityGrade {
    /// Grade a single RSRP measurement.
    ///
    /// Boundaries are inclusive on the better side: -70 dBm is `Excellent`.
    pub fn from_rsrp(rsrp_dbm: f64) -> Self {
        if rsrp_dbm >= -70.0 {
            QualityGrade::Excellent
        } else if rsrp_dbm >= -80.0 {
            QualityGrade::Good
        } else if rsrp_dbm >= -90.0 {
            QualityGrade::Fair
        } else if rsrp_dbm >= -100.0 {
            QualityGrade::Poor
        } else {
            QualityGrade::VeryPoor
        }
    }

    /// Numeric score of the grade on a 0-100 scale.
    pub fn score(&self) -> f64 {
        match self {
            QualityGrade::Excellent => 100.0,
            QualityGrade::Good => 80.0,
            QualityGrade::Fair => 60.0,
            QualityGrade::Poor => 40.0,
            QualityGrade::VeryPoor => 20.0,
        }
    }
}

/// Signal estimate for one position sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSample {
    pub timestamp: DateTime<Utc>,
    pub rsrp_dbm: f64,
    pub rsrq_db: f64,
    pub rs_sinr_db: f64,
    pub atmospheric_loss_db: f64,
    pub quality_grade: QualityGrade,
    pub elevation_deg: Degrees,
    pub range_km: Kilometers,
    /// False for the below-floor sentinel.
    pub valid: bool,
}

/// Aggregate statistics over the valid samples of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalStatistics {
    pub rsrp: MetricStats,
    pub rsrq: MetricStats,
    pub rs_sinr: MetricStats,
}

/// Per-satellite signal time series for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalProfile {
    pub satellite_id: String,
    pub constellation: Constellation,
    pub samples: Vec<SignalSample>,
    /// `None` when the satellite produced no valid sample this cycle.
    pub statistics: Option<SignalStatistics>,
    pub stability_score: f64,
    pub visible_sample_count: usize,
    pub skipped_sample_count: usize,
    pub total_sample_count: usize,
    pub mean_elevation_deg: Option<Degrees>,
    pub mean_range_km: Option<Kilometers>,
}

impl SignalProfile {
    /// True when no valid sample was produced.
    pub fn is_empty(&self) -> bool {
        self.visible_sample_count == 0
    }

    pub fn average_rsrp(&self) -> Option<f64> {
        self.statistics.map(|s| s.rsrp.mean)
    }

    pub fn rsrp_std_dev(&self) -> Option<f64> {
        self.statistics.map(|s| s.rsrp.std_dev)
    }

    /// Fraction of input samples that produced a valid measurement.
    pub fn visible_fraction(&self) -> f64 {
        if self.total_sample_count == 0 {
            return 0.0;
        }
        self.visible_sample_count as f64 / self.total_sample_count as f64
    }

    pub fn valid_samples(&self) -> impl Iterator<Item = &SignalSample> {
        self.samples.iter().filter(|s| s.valid)
    }

    pub fn grade(&self) -> Option<QualityGrade> {
        self.average_rsrp().map(QualityGrade::from_rsrp)
    }
}
