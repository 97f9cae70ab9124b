use serde::{Deserialize, Serialize};

use crate::models::NetworkConditions;

/// Adjustable threshold parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdParameter {
    A4Threshold,
    A5Threshold1,
    A5Threshold2,
    D2Threshold1,
    D2Threshold2,
}

/// Heuristic that proposed an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentRule {
    /// Poor average signal: accept weaker neighbours.
    LowSignalQuality,
    /// Good signal under heavy load: demand stronger neighbours.
    HighQualityHighLoad,
    /// Handovers failing: widen the A5 gap.
    LowSuccessRate,
    /// Handovers succeeding on an idle network: narrow the A5 gap.
    HighSuccessLowLoad,
    /// Crowded sky: tighten the D2 distances.
    HighDensity,
    /// Sparse sky: relax the D2 distances.
    LowDensity,
}

/// Undamped change proposed by a rule. Units are dB, or metres for D2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProposedAdjustment {
    pub rule: AdjustmentRule,
    pub parameter: ThresholdParameter,
    pub delta: f64,
}

const KM: f64 = 1000.0;

/// Evaluate every rule against `conditions`.
pub fn propose(conditions: &NetworkConditions) -> Vec<ProposedAdjustment> {
    let mut proposals = Vec::new();
    let mut push = |rule, parameter, delta| {
        proposals.push(ProposedAdjustment {
            rule,
            parameter,
            delta,
        })
    };

    // A4
    if conditions.average_signal_quality < 0.3 {
        push(AdjustmentRule::LowSignalQuality, ThresholdParameter::A4Threshold, -2.0);
    } else if conditions.average_signal_quality > 0.8 && conditions.network_load > 0.7 {
        push(AdjustmentRule::HighQualityHighLoad, ThresholdParameter::A4Threshold, 1.5);
    }

    // A5
    if conditions.handover_success_rate < 0.8 {
        push(AdjustmentRule::LowSuccessRate, ThresholdParameter::A5Threshold1, -1.0);
        push(AdjustmentRule::LowSuccessRate, ThresholdParameter::A5Threshold2, 1.0);
    } else if conditions.handover_success_rate > 0.95 && conditions.network_load < 0.3 {
        push(AdjustmentRule::HighSuccessLowLoad, ThresholdParameter::A5Threshold1, 1.0);
        push(AdjustmentRule::HighSuccessLowLoad, ThresholdParameter::A5Threshold2, -1.0);
    }

    // D2
    if conditions.satellite_density > 0.8 {
        push(AdjustmentRule::HighDensity, ThresholdParameter::D2Threshold1, -100.0 * KM);
        push(AdjustmentRule::HighDensity, ThresholdParameter::D2Threshold2, -100.0 * KM);
    } else if conditions.satellite_density < 0.3 {
        push(AdjustmentRule::LowDensity, ThresholdParameter::D2Threshold1, 150.0 * KM);
        push(AdjustmentRule::LowDensity, ThresholdParameter::D2Threshold2, 150.0 * KM);
    }

    proposals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_conditions_propose_nothing() {
        assert!(propose(&NetworkConditions::default()).is_empty());
    }

    #[test]
    fn test_low_quality_loosens_a4() {
        let proposals = propose(&NetworkConditions::new(0.5, 0.1, 0.9, 0.5));
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].parameter, ThresholdParameter::A4Threshold);
        assert_eq!(proposals[0].delta, -2.0);
    }

    #[test]
    fn test_low_success_moves_a5_apart() {
        let proposals = propose(&NetworkConditions::new(0.5, 0.5, 0.5, 0.5));
        let deltas: Vec<(ThresholdParameter, f64)> =
            proposals.iter().map(|p| (p.parameter, p.delta)).collect();
        assert_eq!(
            deltas,
            vec![
                (ThresholdParameter::A5Threshold1, -1.0),
                (ThresholdParameter::A5Threshold2, 1.0)
            ]
        );
    }

    #[test]
    fn test_density_rules() {
        let dense = propose(&NetworkConditions::new(0.9, 0.5, 0.9, 0.5));
        assert!(dense
            .iter()
            .all(|p| p.rule == AdjustmentRule::HighDensity && p.delta == -100_000.0));

        let sparse = propose(&NetworkConditions::new(0.1, 0.5, 0.9, 0.5));
        assert!(sparse
            .iter()
            .all(|p| p.rule == AdjustmentRule::LowDensity && p.delta == 150_000.0));
    }
}
