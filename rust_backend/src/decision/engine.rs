use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::history::DecisionHistory;
use crate::error::{HandoverError, HandoverResult};
use crate::models::{
    CandidateScore, DecisionFactors, DecisionReasoning, DecisionType, EventWeights,
    FailedCondition, Gate, GateEvaluation, GateMetric, HandoverDecision, QualityGrade,
    ServingAssessment, SignalProfile,
};
use crate::selection::scoring::check_weights;
use crate::signal::INVALID_RSRP_DBM;

/// Serving RSRP below which a handover is an emergency.
pub const EMERGENCY_RSRP_DBM: f64 = -115.0;

/// Weights of the decision score factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionWeights {
    pub signal_improvement: f64,
    pub event_strength: f64,
    pub candidate_quality: f64,
    pub stability_risk: f64,
}

impl Default for DecisionWeights {
    fn default() -> Self {
        Self {
            signal_improvement: 0.35,
            event_strength: 0.25,
            candidate_quality: 0.20,
            stability_risk: 0.20,
        }
    }
}

impl DecisionWeights {
    pub fn score(&self, f: &DecisionFactors) -> f64 {
        self.signal_improvement * f.signal_improvement
            + self.event_strength * f.event_strength
            + self.candidate_quality * f.candidate_quality
            + self.stability_risk * f.stability_risk
    }
}

/// Decision engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub weights: DecisionWeights,
    pub event_weights: EventWeights,
    pub history_capacity: usize,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            weights: DecisionWeights::default(),
            event_weights: EventWeights {
                a4: 0.30,
                a5: 0.50,
                d2: 0.20,
            },
            history_capacity: 100,
        }
    }
}

impl DecisionConfig {
    pub fn validate(&self) -> HandoverResult<()> {
        let w = &self.weights;
        check_weights(
            "decision",
            &[
                w.signal_improvement,
                w.event_strength,
                w.candidate_quality,
                w.stability_risk,
            ],
        )?;
        let e = &self.event_weights;
        check_weights("decision event", &[e.a4, e.a5, e.d2])?;
        if self.history_capacity == 0 {
            return Err(HandoverError::Configuration(
                "decision history_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Grade the serving link on the decision scale, which is stricter than the
/// per-sample scale.
pub fn serving_grade(average_rsrp_dbm: f64) -> QualityGrade {
    if average_rsrp_dbm >= -85.0 {
        QualityGrade::Excellent
    } else if average_rsrp_dbm >= -95.0 {
        QualityGrade::Good
    } else if average_rsrp_dbm >= -105.0 {
        QualityGrade::Fair
    } else if average_rsrp_dbm >= EMERGENCY_RSRP_DBM {
        QualityGrade::Poor
    } else {
        QualityGrade::VeryPoor
    }
}

/// Assess the serving satellite. An empty profile is an emergency.
pub fn assess_serving(profile: &SignalProfile) -> ServingAssessment {
    match profile.average_rsrp() {
        Some(average) => ServingAssessment {
            grade: serving_grade(average),
            average_rsrp_dbm: Some(average),
            stable: profile.stability_score >= 70.0
                && profile.rsrp_std_dev().map_or(false, |sd| sd <= 5.0),
            emergency: average < EMERGENCY_RSRP_DBM,
        },
        None => ServingAssessment {
            grade: QualityGrade::VeryPoor,
            average_rsrp_dbm: None,
            stable: false,
            emergency: true,
        },
    }
}

struct GateCheck {
    gate: Gate,
    failed: Vec<FailedCondition>,
}

impl GateCheck {
    fn new(gate: Gate) -> Self {
        Self {
            gate,
            failed: Vec::new(),
        }
    }

    fn at_least(mut self, metric: GateMetric, actual: f64, required: f64) -> Self {
        if actual < required {
            self.failed.push(FailedCondition {
                metric,
                actual,
                required,
            });
        }
        self
    }

    fn finish(self) -> GateEvaluation {
        GateEvaluation {
            gate: self.gate,
            passed: self.failed.is_empty(),
            failed_conditions: self.failed,
        }
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Turns the serving profile and the candidate pool into a handover decision.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: DecisionConfig,
    history: DecisionHistory,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> HandoverResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            history: DecisionHistory::new(config.history_capacity),
        })
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    pub fn history(&self) -> &DecisionHistory {
        &self.history
    }

    /// Decide whether to hand over from `serving` to the best member of `pool`.
    ///
    /// `pool` is expected ordered by rank; its first entry is the target
    /// considered. The decision is appended to the history.
    pub fn decide(
        &mut self,
        serving: &SignalProfile,
        pool: &[CandidateScore],
        now: DateTime<Utc>,
    ) -> HandoverDecision {
        let assessment = assess_serving(serving);

        let decision = match pool.first() {
            Some(candidate) => {
                self.evaluate_candidate(serving, &assessment, candidate, pool.len(), now)
            }
            None => self.no_candidate(serving, assessment, now),
        };

        log::info!(
            "Decision {:?} for serving {} (target {:?}, confidence {:.2}, score {:.1})",
            decision.decision_type,
            decision.serving_satellite_id,
            decision.target_satellite_id,
            decision.confidence,
            decision.reasoning.decision_score
        );

        self.history.push(decision.clone());
        decision
    }

    /// Compute the four weighted factors for `candidate`.
    pub fn factors(
        &self,
        serving: &SignalProfile,
        candidate: &CandidateScore,
    ) -> DecisionFactors {
        let serving_rsrp = serving.average_rsrp().unwrap_or(INVALID_RSRP_DBM);
        let candidate_rsrp = candidate.average_rsrp_dbm.unwrap_or(INVALID_RSRP_DBM);

        DecisionFactors {
            signal_improvement: (50.0 + 2.5 * (candidate_rsrp - serving_rsrp)).clamp(0.0, 100.0),
            event_strength: self.config.event_weights.strength(&candidate.event_counts),
            candidate_quality: candidate.composite_score.clamp(0.0, 100.0),
            stability_risk: 100.0
                - (serving.stability_score - candidate.stability_score).clamp(0.0, 100.0),
        }
    }

    fn evaluate_candidate(
        &self,
        serving: &SignalProfile,
        assessment: &ServingAssessment,
        candidate: &CandidateScore,
        candidate_count: usize,
        now: DateTime<Utc>,
    ) -> HandoverDecision {
        let factors = self.factors(serving, candidate);
        let score = self.config.weights.score(&factors);

        // Step 1: evaluate every gate so the reasoning is complete
        let gates = vec![
            GateCheck::new(Gate::Emergency)
                .at_least(GateMetric::ServingEmergency, flag(assessment.emergency), 1.0)
                .at_least(GateMetric::CandidateQuality, factors.candidate_quality, 40.0)
                .finish(),
            GateCheck::new(Gate::Immediate)
                .at_least(GateMetric::DecisionScore, score, 75.0)
                .at_least(GateMetric::CandidateQuality, factors.candidate_quality, 80.0)
                .at_least(GateMetric::SignalImprovement, factors.signal_improvement, 60.0)
                .finish(),
            GateCheck::new(Gate::Prepare)
                .at_least(GateMetric::DecisionScore, score, 55.0)
                .at_least(GateMetric::CandidateQuality, factors.candidate_quality, 60.0)
                .finish(),
        ];

        // Step 2: first passing gate in priority order wins
        let selected_gate = gates.iter().find(|g| g.passed).map(|g| g.gate);
        let (decision_type, confidence) = match selected_gate {
            Some(Gate::Emergency) => (DecisionType::EmergencyHandover, 0.95),
            Some(Gate::Immediate) => (DecisionType::ImmediateHandover, (score / 100.0).min(0.95)),
            Some(Gate::Prepare) => (DecisionType::PrepareHandover, (score / 100.0).min(0.85)),
            None => (DecisionType::NoHandover, (1.0 - score / 100.0).max(0.3)),
        };

        HandoverDecision {
            decision_type,
            serving_satellite_id: serving.satellite_id.clone(),
            target_satellite_id: selected_gate.map(|_| candidate.satellite_id.clone()),
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: DecisionReasoning {
                serving: *assessment,
                factors,
                decision_score: score,
                gates,
                selected_gate,
                dominant_event: self.config.event_weights.dominant(&candidate.event_counts),
                candidate_count,
            },
            timestamp: now,
        }
    }

    fn no_candidate(
        &self,
        serving: &SignalProfile,
        assessment: ServingAssessment,
        now: DateTime<Utc>,
    ) -> HandoverDecision {
        let gates = [Gate::Emergency, Gate::Immediate, Gate::Prepare]
            .into_iter()
            .map(|gate| {
                GateCheck::new(gate)
                    .at_least(GateMetric::CandidateAvailable, 0.0, 1.0)
                    .finish()
            })
            .collect();

        if assessment.emergency {
            log::warn!(
                "Serving {} is in emergency state but no candidate is available",
                serving.satellite_id
            );
        }

        HandoverDecision {
            decision_type: DecisionType::NoHandover,
            serving_satellite_id: serving.satellite_id.clone(),
            target_satellite_id: None,
            confidence: 1.0,
            reasoning: DecisionReasoning {
                serving: assessment,
                factors: DecisionFactors::default(),
                decision_score: 0.0,
                gates,
                selected_gate: None,
                dominant_event: None,
                candidate_count: 0,
            },
            timestamp: now,
        }
    }
}
