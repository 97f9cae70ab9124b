//! Entering and leaving conditions of the A4, A5 and D2 events.
//!
//! Notation follows the RRC measurement event definitions: `Mn` neighbour
//! measurement, `Mp` serving measurement, `Ofn + Ocn` the neighbour offsets,
//! `Hys` the hysteresis, `Ml1`/`Ml2` distances to the serving and candidate
//! reference locations.

use super::trigger::{Leaving, TriggerCondition};
use crate::models::{ExitReason, TriggerDetail};
use crate::thresholds::ThresholdSet;

/// Neighbour RSRP observation for A4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighbourObservation {
    pub neighbour_rsrp_dbm: f64,
}

/// Serving and neighbour RSRP at the same instant, for A5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualRsrpObservation {
    pub serving_rsrp_dbm: f64,
    pub neighbour_rsrp_dbm: f64,
}

/// Distances to the serving and candidate reference locations, in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceObservation {
    pub serving_distance_m: f64,
    pub candidate_distance_m: f64,
}

/// A4: `Mn + Ofn + Ocn - Hys > Thresh` to enter, `Mn + Ofn + Ocn + Hys < Thresh` to leave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct A4Condition {
    pub threshold_dbm: f64,
    pub hysteresis_db: f64,
    pub offset_db: f64,
}

impl A4Condition {
    pub fn from_thresholds(set: &ThresholdSet) -> Self {
        Self {
            threshold_dbm: set.a4.threshold_dbm,
            hysteresis_db: set.a4.hysteresis_db,
            offset_db: set.offsets.total_db(),
        }
    }
}

impl TriggerCondition for A4Condition {
    type Observation = NeighbourObservation;

    fn entering(&self, obs: &NeighbourObservation) -> bool {
        obs.neighbour_rsrp_dbm + self.offset_db - self.hysteresis_db > self.threshold_dbm
    }

    fn leaving(&self, obs: &NeighbourObservation) -> Leaving {
        if obs.neighbour_rsrp_dbm + self.offset_db + self.hysteresis_db < self.threshold_dbm {
            Leaving::Leave(None)
        } else {
            Leaving::Stay
        }
    }

    fn detail(&self, obs: &NeighbourObservation) -> TriggerDetail {
        TriggerDetail::A4 {
            neighbour_rsrp_dbm: obs.neighbour_rsrp_dbm,
            threshold_dbm: self.threshold_dbm,
            hysteresis_db: self.hysteresis_db,
            offset_db: self.offset_db,
        }
    }
}

/// A5: both conditions must hold to enter, either leaving condition exits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct A5Condition {
    pub threshold1_dbm: f64,
    pub threshold2_dbm: f64,
    pub hysteresis_db: f64,
    pub offset_db: f64,
}

impl A5Condition {
    pub fn from_thresholds(set: &ThresholdSet) -> Self {
        Self {
            threshold1_dbm: set.a5.threshold1_dbm,
            threshold2_dbm: set.a5.threshold2_dbm,
            hysteresis_db: set.a5.hysteresis_db,
            offset_db: set.offsets.total_db(),
        }
    }
}

impl TriggerCondition for A5Condition {
    type Observation = DualRsrpObservation;

    fn entering(&self, obs: &DualRsrpObservation) -> bool {
        let serving_weak = obs.serving_rsrp_dbm + self.hysteresis_db < self.threshold1_dbm;
        let neighbour_strong =
            obs.neighbour_rsrp_dbm + self.offset_db - self.hysteresis_db > self.threshold2_dbm;
        serving_weak && neighbour_strong
    }

    fn leaving(&self, obs: &DualRsrpObservation) -> Leaving {
        if obs.serving_rsrp_dbm - self.hysteresis_db > self.threshold1_dbm {
            Leaving::Leave(Some(ExitReason::ServingRecovered))
        } else if obs.neighbour_rsrp_dbm + self.offset_db + self.hysteresis_db < self.threshold2_dbm {
            Leaving::Leave(Some(ExitReason::NeighbourDegraded))
        } else {
            Leaving::Stay
        }
    }

    fn detail(&self, obs: &DualRsrpObservation) -> TriggerDetail {
        TriggerDetail::A5 {
            serving_rsrp_dbm: obs.serving_rsrp_dbm,
            neighbour_rsrp_dbm: obs.neighbour_rsrp_dbm,
            threshold1_dbm: self.threshold1_dbm,
            threshold2_dbm: self.threshold2_dbm,
            hysteresis_db: self.hysteresis_db,
            offset_db: self.offset_db,
        }
    }
}

/// D2: `Ml1 - Hys > Thresh1` and `Ml2 + Hys < Thresh2` to enter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct D2Condition {
    pub threshold1_m: f64,
    pub threshold2_m: f64,
    pub hysteresis_m: f64,
}

impl D2Condition {
    pub fn from_thresholds(set: &ThresholdSet) -> Self {
        Self {
            threshold1_m: set.d2.threshold1_m.value(),
            threshold2_m: set.d2.threshold2_m.value(),
            hysteresis_m: set.d2.hysteresis_m.value(),
        }
    }
}

impl TriggerCondition for D2Condition {
    type Observation = DistanceObservation;

    fn entering(&self, obs: &DistanceObservation) -> bool {
        let serving_far = obs.serving_distance_m - self.hysteresis_m > self.threshold1_m;
        let candidate_near = obs.candidate_distance_m + self.hysteresis_m < self.threshold2_m;
        serving_far && candidate_near
    }

    fn leaving(&self, obs: &DistanceObservation) -> Leaving {
        if obs.serving_distance_m + self.hysteresis_m < self.threshold1_m {
            Leaving::Leave(Some(ExitReason::ServingApproached))
        } else if obs.candidate_distance_m - self.hysteresis_m > self.threshold2_m {
            Leaving::Leave(Some(ExitReason::CandidateReceded))
        } else {
            Leaving::Stay
        }
    }

    fn detail(&self, obs: &DistanceObservation) -> TriggerDetail {
        TriggerDetail::D2 {
            serving_distance_m: obs.serving_distance_m,
            candidate_distance_m: obs.candidate_distance_m,
            threshold1_m: self.threshold1_m,
            threshold2_m: self.threshold2_m,
            hysteresis_m: self.hysteresis_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4() -> A4Condition {
        A4Condition {
            threshold_dbm: -106.0,
            hysteresis_db: 2.0,
            offset_db: 0.0,
        }
    }

    #[test]
    fn test_a4_hysteresis_band() {
        let c = a4();
        let obs = |v| NeighbourObservation { neighbour_rsrp_dbm: v };

        assert!(c.entering(&obs(-103.9)));
        assert!(!c.entering(&obs(-104.0)));
        assert_eq!(c.leaving(&obs(-107.0)), Leaving::Stay);
        assert_eq!(c.leaving(&obs(-108.1)), Leaving::Leave(None));
    }

    #[test]
    fn test_a4_offsets_shift_neighbour() {
        let c = A4Condition {
            offset_db: 3.0,
            ..a4()
        };
        assert!(c.entering(&NeighbourObservation { neighbour_rsrp_dbm: -106.0 }));
    }

    #[test]
    fn test_a5_requires_both_conditions() {
        let c = A5Condition {
            threshold1_dbm: -110.0,
            threshold2_dbm: -100.0,
            hysteresis_db: 2.0,
            offset_db: 0.0,
        };
        let both = DualRsrpObservation {
            serving_rsrp_dbm: -115.0,
            neighbour_rsrp_dbm: -95.0,
        };
        let serving_ok = DualRsrpObservation {
            serving_rsrp_dbm: -105.0,
            ..both
        };
        let neighbour_weak = DualRsrpObservation {
            neighbour_rsrp_dbm: -99.0,
            ..both
        };

        assert!(c.entering(&both));
        assert!(!c.entering(&serving_ok));
        assert!(!c.entering(&neighbour_weak));
    }

    #[test]
    fn test_a5_exit_reasons() {
        let c = A5Condition {
            threshold1_dbm: -110.0,
            threshold2_dbm: -100.0,
            hysteresis_db: 2.0,
            offset_db: 0.0,
        };
        let recovered = DualRsrpObservation {
            serving_rsrp_dbm: -107.0,
            neighbour_rsrp_dbm: -95.0,
        };
        let degraded = DualRsrpObservation {
            serving_rsrp_dbm: -115.0,
            neighbour_rsrp_dbm: -103.0,
        };
        assert_eq!(
            c.leaving(&recovered),
            Leaving::Leave(Some(ExitReason::ServingRecovered))
        );
        assert_eq!(
            c.leaving(&degraded),
            Leaving::Leave(Some(ExitReason::NeighbourDegraded))
        );
    }

    #[test]
    fn test_d2_distance_conditions() {
        let c = D2Condition::from_thresholds(&ThresholdSet::default());
        let enter = DistanceObservation {
            serving_distance_m: 1_600_000.0,
            candidate_distance_m: 1_000_000.0,
        };
        assert!(c.entering(&enter));

        let candidate_far = DistanceObservation {
            candidate_distance_m: 1_300_000.0,
            ..enter
        };
        assert!(!c.entering(&candidate_far));
        assert_eq!(
            c.leaving(&candidate_far),
            Leaving::Leave(Some(ExitReason::CandidateReceded))
        );

        let serving_close = DistanceObservation {
            serving_distance_m: 1_400_000.0,
            ..enter
        };
        assert_eq!(
            c.leaving(&serving_close),
            Leaving::Leave(Some(ExitReason::ServingApproached))
        );
    }
}
