//! Per-satellite handover suitability.
//!
//! A coarse, human-readable assessment that complements the composite
//! candidate score: it rewards strong and steady signal, penalises satellites
//! whose measurements keep triggering events, and rewards long visibility.

use serde::{Deserialize, Serialize};

use crate::models::{EventSet, SignalProfile};

/// Qualitative observations backing a suitability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuitabilityFactor {
    ExcellentSignal,
    GoodSignal,
    ModerateSignal,
    WeakSignal,
    Stable,
    FairlyStable,
    Unstable,
    LowEventRate,
    ModerateEventRate,
    HighEventRate,
    HighVisibility,
    ModerateVisibility,
    LowVisibility,
}

/// Component scores; maxima are 40, 25, 20 and 15.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityBreakdown {
    pub signal_strength: f64,
    pub stability: f64,
    pub event_frequency: f64,
    pub visibility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoverSuitability {
    pub satellite_id: String,
    pub is_candidate: bool,
    /// Sum of the breakdown, 0 to 100.
    pub score: f64,
    pub factors: Vec<SuitabilityFactor>,
    pub breakdown: SuitabilityBreakdown,
}

const MIN_SUITABILITY_SCORE: f64 = 60.0;
const MIN_AVERAGE_RSRP_DBM: f64 = -105.0;
const MIN_STABILITY_SCORE: f64 = 50.0;

/// Assess one satellite from its profile and detected events.
pub fn assess(profile: &SignalProfile, events: &EventSet) -> HandoverSuitability {
    let mut factors = Vec::with_capacity(4);
    let average_rsrp = profile.average_rsrp().unwrap_or(f64::NEG_INFINITY);

    let signal_strength = if average_rsrp >= -85.0 {
        factors.push(SuitabilityFactor::ExcellentSignal);
        40.0
    } else if average_rsrp >= -95.0 {
        factors.push(SuitabilityFactor::GoodSignal);
        32.0
    } else if average_rsrp >= -105.0 {
        factors.push(SuitabilityFactor::ModerateSignal);
        20.0
    } else {
        factors.push(SuitabilityFactor::WeakSignal);
        5.0
    };

    let stability = profile.stability_score / 100.0 * 25.0;
    factors.push(if profile.stability_score >= 80.0 {
        SuitabilityFactor::Stable
    } else if profile.stability_score >= 60.0 {
        SuitabilityFactor::FairlyStable
    } else {
        SuitabilityFactor::Unstable
    });

    let total_points = profile.total_sample_count;
    let event_frequency = if total_points == 0 {
        0.0
    } else {
        let rate = events.total() as f64 / total_points as f64;
        if rate <= 0.1 {
            factors.push(SuitabilityFactor::LowEventRate);
            20.0
        } else if rate <= 0.2 {
            factors.push(SuitabilityFactor::ModerateEventRate);
            15.0
        } else {
            factors.push(SuitabilityFactor::HighEventRate);
            5.0
        }
    };

    let visibility = if total_points == 0 {
        0.0
    } else {
        let fraction = profile.visible_fraction();
        factors.push(if fraction >= 0.8 {
            SuitabilityFactor::HighVisibility
        } else if fraction >= 0.5 {
            SuitabilityFactor::ModerateVisibility
        } else {
            SuitabilityFactor::LowVisibility
        });
        fraction * 15.0
    };

    let score = signal_strength + stability + event_frequency + visibility;
    let is_candidate = score >= MIN_SUITABILITY_SCORE
        && average_rsrp >= MIN_AVERAGE_RSRP_DBM
        && profile.stability_score >= MIN_STABILITY_SCORE;

    HandoverSuitability {
        satellite_id: profile.satellite_id.clone(),
        is_candidate,
        score,
        factors,
        breakdown: SuitabilityBreakdown {
            signal_strength,
            stability,
            event_frequency,
            visibility,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::statistics::MetricStats;
    use crate::models::{Constellation, SignalStatistics};
    use approx::assert_relative_eq;

    fn profile(avg_rsrp: f64, stability: f64, visible: usize, total: usize) -> SignalProfile {
        let stats = MetricStats {
            mean: avg_rsrp,
            min: avg_rsrp,
            max: avg_rsrp,
            std_dev: 0.0,
            count: visible,
        };
        SignalProfile {
            satellite_id: "SAT".to_string(),
            constellation: Constellation::Starlink,
            samples: Vec::new(),
            statistics: Some(SignalStatistics {
                rsrp: stats,
                rsrq: stats,
                rs_sinr: stats,
            }),
            stability_score: stability,
            visible_sample_count: visible,
            skipped_sample_count: 0,
            total_sample_count: total,
            mean_elevation_deg: None,
            mean_range_km: None,
        }
    }

    #[test]
    fn test_strong_stable_satellite_is_candidate() {
        let result = assess(&profile(-82.0, 90.0, 20, 20), &EventSet::empty("SAT"));
        assert!(result.is_candidate);
        assert_relative_eq!(result.score, 40.0 + 22.5 + 20.0 + 15.0);
        assert!(result.factors.contains(&SuitabilityFactor::ExcellentSignal));
        assert!(result.factors.contains(&SuitabilityFactor::HighVisibility));
    }

    #[test]
    fn test_weak_signal_is_never_candidate() {
        let result = assess(&profile(-110.0, 100.0, 20, 20), &EventSet::empty("SAT"));
        assert!(!result.is_candidate);
        assert!(result.factors.contains(&SuitabilityFactor::WeakSignal));
    }

    #[test]
    fn test_empty_profile() {
        let mut empty = profile(-90.0, 0.0, 0, 0);
        empty.statistics = None;
        let result = assess(&empty, &EventSet::empty("SAT"));
        assert!(!result.is_candidate);
        assert_eq!(result.breakdown.event_frequency, 0.0);
        assert_eq!(result.breakdown.visibility, 0.0);
    }
}
