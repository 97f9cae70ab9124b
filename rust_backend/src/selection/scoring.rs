//! Candidate subscores, each normalized to [0, 100].

use serde::{Deserialize, Serialize};

use crate::error::{HandoverError, HandoverResult};
use crate::models::{CandidateScore, EventSet, EventWeights, SignalProfile, SubScores};

/// Range at which a LEO candidate is considered geometrically ideal.
pub const OPTIMAL_RANGE_KM: f64 = 1500.0;

/// Weights of the composite score. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateWeights {
    pub signal_quality: f64,
    pub event_strength: f64,
    pub stability: f64,
    pub geometric: f64,
}

impl Default for CandidateWeights {
    fn default() -> Self {
        Self {
            signal_quality: 0.40,
            event_strength: 0.25,
            stability: 0.20,
            geometric: 0.15,
        }
    }
}

impl CandidateWeights {
    pub fn validate(&self) -> HandoverResult<()> {
        let weights = [
            self.signal_quality,
            self.event_strength,
            self.stability,
            self.geometric,
        ];
        check_weights("candidate", &weights)
    }

    pub fn composite(&self, s: &SubScores) -> f64 {
        self.signal_quality * s.signal_quality
            + self.event_strength * s.event_strength
            + self.stability * s.stability
            + self.geometric * s.geometric
    }
}

pub(crate) fn check_weights(name: &str, weights: &[f64]) -> HandoverResult<()> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(HandoverError::Configuration(format!(
            "{} weights must be non-negative",
            name
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > 1e-6 {
        return Err(HandoverError::Configuration(format!(
            "{} weights must sum to 1.0, got {:.6}",
            name, sum
        )));
    }
    Ok(())
}

pub fn default_candidate_event_weights() -> EventWeights {
    EventWeights {
        a4: 0.50,
        a5: 0.35,
        d2: 0.15,
    }
}

/// Piecewise-linear score of average RSRP.
pub fn signal_quality_score(average_rsrp_dbm: Option<f64>) -> f64 {
    let Some(rsrp) = average_rsrp_dbm else {
        return 0.0;
    };

    // (upper RSRP, score at upper) segments, descending
    const KNOTS: [(f64, f64); 5] = [
        (-80.0, 100.0),
        (-90.0, 80.0),
        (-100.0, 60.0),
        (-110.0, 40.0),
        (-120.0, 20.0),
    ];

    if rsrp >= KNOTS[0].0 {
        return KNOTS[0].1;
    }
    for pair in KNOTS.windows(2) {
        let (hi_rsrp, hi_score) = pair[0];
        let (lo_rsrp, lo_score) = pair[1];
        if rsrp >= lo_rsrp {
            let t = (rsrp - lo_rsrp) / (hi_rsrp - lo_rsrp);
            return lo_score + t * (hi_score - lo_score);
        }
    }
    5.0
}

/// Blend of the profile's stability score and its RSRP spread.
pub fn stability_score(profile: &SignalProfile) -> f64 {
    let spread_score = profile
        .rsrp_std_dev()
        .map(|sd| (100.0 - 10.0 * sd).max(0.0))
        .unwrap_or(0.0);
    (0.7 * profile.stability_score + 0.3 * spread_score).clamp(0.0, 100.0)
}

/// Blend of mean elevation, closeness of mean range to [`OPTIMAL_RANGE_KM`],
/// and visible fraction.
pub fn geometric_score(profile: &SignalProfile) -> f64 {
    let elevation = profile
        .mean_elevation_deg
        .map(|e| (e.value() / 90.0 * 100.0).clamp(0.0, 100.0))
        .unwrap_or(0.0);
    let range = profile
        .mean_range_km
        .map(|r| {
            let deviation = (r.value() - OPTIMAL_RANGE_KM).abs() / OPTIMAL_RANGE_KM;
            (100.0 - deviation * 100.0).max(0.0)
        })
        .unwrap_or(0.0);
    let visibility = profile.visible_fraction() * 100.0;

    0.4 * elevation + 0.3 * range + 0.3 * visibility
}

/// Score one satellite. The returned score is unranked.
pub fn score_candidate(
    profile: &SignalProfile,
    events: &EventSet,
    weights: &CandidateWeights,
    event_weights: &EventWeights,
) -> CandidateScore {
    let counts = events.counts();
    let subscores = SubScores {
        signal_quality: signal_quality_score(profile.average_rsrp()),
        event_strength: event_weights.strength(&counts),
        stability: stability_score(profile),
        geometric: geometric_score(profile),
    };

    CandidateScore {
        satellite_id: profile.satellite_id.clone(),
        constellation: profile.constellation,
        composite_score: weights.composite(&subscores).clamp(0.0, 100.0),
        subscores,
        rank: 0,
        average_rsrp_dbm: profile.average_rsrp(),
        rsrp_std_dev_db: profile.rsrp_std_dev(),
        stability_score: profile.stability_score,
        event_counts: counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_signal_quality_knots() {
        assert_eq!(signal_quality_score(Some(-70.0)), 100.0);
        assert_eq!(signal_quality_score(Some(-80.0)), 100.0);
        assert_relative_eq!(signal_quality_score(Some(-85.0)), 90.0);
        assert_relative_eq!(signal_quality_score(Some(-100.0)), 60.0);
        assert_relative_eq!(signal_quality_score(Some(-120.0)), 20.0);
        assert_eq!(signal_quality_score(Some(-120.1)), 5.0);
        assert_eq!(signal_quality_score(None), 0.0);
    }

    #[test]
    fn test_signal_quality_is_monotonic() {
        let mut previous = signal_quality_score(Some(-130.0));
        let mut rsrp = -130.0;
        while rsrp <= -60.0 {
            let score = signal_quality_score(Some(rsrp));
            assert!(score >= previous);
            previous = score;
            rsrp += 0.5;
        }
    }

    #[test]
    fn test_default_weights_are_valid() {
        assert!(CandidateWeights::default().validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let weights = CandidateWeights {
            signal_quality: 0.5,
            ..CandidateWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(HandoverError::Configuration(_))
        ));
    }

    #[test]
    fn test_composite_of_perfect_subscores() {
        let s = SubScores {
            signal_quality: 100.0,
            event_strength: 100.0,
            stability: 100.0,
            geometric: 100.0,
        };
        assert_relative_eq!(CandidateWeights::default().composite(&s), 100.0, epsilon = 1e-9);
    }
}
