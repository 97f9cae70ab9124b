use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::EventType;
use super::signal::QualityGrade;

/// Outcome class of a handover decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    NoHandover,
    PrepareHandover,
    ImmediateHandover,
    EmergencyHandover,
}

impl DecisionType {
    pub fn gate(&self) -> Option<Gate> {
        match self {
            DecisionType::NoHandover => None,
            DecisionType::PrepareHandover => Some(Gate::Prepare),
            DecisionType::ImmediateHandover => Some(Gate::Immediate),
            DecisionType::EmergencyHandover => Some(Gate::Emergency),
        }
    }
}

/// Decision gates, evaluated in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    Emergency,
    Immediate,
    Prepare,
}

/// Quantity a gate condition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMetric {
    CandidateAvailable,
    ServingEmergency,
    DecisionScore,
    CandidateQuality,
    SignalImprovement,
}

/// A gate condition that did not hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailedCondition {
    pub metric: GateMetric,
    pub actual: f64,
    pub required: f64,
}

/// Pass/fail record for one gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateEvaluation {
    pub gate: Gate,
    pub passed: bool,
    pub failed_conditions: Vec<FailedCondition>,
}

/// Assessment of the serving link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServingAssessment {
    pub grade: QualityGrade,
    pub average_rsrp_dbm: Option<f64>,
    pub stable: bool,
    pub emergency: bool,
}

/// The four weighted decision factors, each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionFactors {
    pub signal_improvement: f64,
    pub event_strength: f64,
    pub candidate_quality: f64,
    pub stability_risk: f64,
}

/// Structured explanation of a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionReasoning {
    pub serving: ServingAssessment,
    pub factors: DecisionFactors,
    pub decision_score: f64,
    pub gates: Vec<GateEvaluation>,
    pub selected_gate: Option<Gate>,
    pub dominant_event: Option<EventType>,
    pub candidate_count: usize,
}

impl DecisionReasoning {
    pub fn gate(&self, gate: Gate) -> Option<&GateEvaluation> {
        self.gates.iter().find(|g| g.gate == gate)
    }
}

/// One handover decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoverDecision {
    pub decision_type: DecisionType,
    pub serving_satellite_id: String,
    pub target_satellite_id: Option<String>,
    pub confidence: f64,
    pub reasoning: DecisionReasoning,
    pub timestamp: DateTime<Utc>,
}

impl HandoverDecision {
    pub fn is_handover(&self) -> bool {
        self.decision_type != DecisionType::NoHandover
    }
}
