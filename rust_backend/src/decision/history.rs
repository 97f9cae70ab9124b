use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::models::{DecisionType, HandoverDecision};

/// Summary of the decisions currently held in a [`DecisionHistory`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionStatistics {
    pub total: usize,
    pub by_type: BTreeMap<DecisionType, usize>,
    pub average_confidence: f64,
    pub success_rate: f64,
}

/// Bounded record of past decisions, oldest evicted first.
#[derive(Debug, Clone)]
pub struct DecisionHistory {
    capacity: usize,
    entries: VecDeque<HandoverDecision>,
}

impl DecisionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, decision: HandoverDecision) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(decision);
    }

    pub fn latest(&self) -> Option<&HandoverDecision> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandoverDecision> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Fraction of recorded decisions that were not emergencies.
    ///
    /// An empty history counts as fully successful.
    pub fn success_rate(&self) -> f64 {
        if self.entries.is_empty() {
            return 1.0;
        }
        let emergencies = self
            .entries
            .iter()
            .filter(|d| d.decision_type == DecisionType::EmergencyHandover)
            .count();
        1.0 - emergencies as f64 / self.entries.len() as f64
    }

    pub fn statistics(&self) -> DecisionStatistics {
        let mut by_type = BTreeMap::new();
        for decision in &self.entries {
            *by_type.entry(decision.decision_type).or_insert(0) += 1;
        }
        let average_confidence = if self.entries.is_empty() {
            0.0
        } else {
            self.entries.iter().map(|d| d.confidence).sum::<f64>() / self.entries.len() as f64
        };

        DecisionStatistics {
            total: self.entries.len(),
            by_type,
            average_confidence,
            success_rate: self.success_rate(),
        }
    }
}

impl Default for DecisionHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DecisionFactors, DecisionReasoning, QualityGrade, ServingAssessment};
    use chrono::Utc;

    fn decision(decision_type: DecisionType, confidence: f64) -> HandoverDecision {
        HandoverDecision {
            decision_type,
            serving_satellite_id: "serving".to_string(),
            target_satellite_id: None,
            confidence,
            reasoning: DecisionReasoning {
                serving: ServingAssessment {
                    grade: QualityGrade::Fair,
                    average_rsrp_dbm: Some(-100.0),
                    stable: true,
                    emergency: false,
                },
                factors: DecisionFactors::default(),
                decision_score: 0.0,
                gates: Vec::new(),
                selected_gate: None,
                dominant_event: None,
                candidate_count: 0,
            },
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_oldest_entry_is_evicted() {
        let mut history = DecisionHistory::new(2);
        history.push(decision(DecisionType::EmergencyHandover, 0.95));
        history.push(decision(DecisionType::NoHandover, 0.5));
        history.push(decision(DecisionType::PrepareHandover, 0.6));

        assert_eq!(history.len(), 2);
        assert_eq!(
            history.iter().next().map(|d| d.decision_type),
            Some(DecisionType::NoHandover)
        );
        assert_eq!(history.success_rate(), 1.0);
    }

    #[test]
    fn test_statistics_by_type() {
        let mut history = DecisionHistory::default();
        history.push(decision(DecisionType::NoHandover, 0.4));
        history.push(decision(DecisionType::NoHandover, 0.6));
        history.push(decision(DecisionType::EmergencyHandover, 0.95));
        history.push(decision(DecisionType::ImmediateHandover, 0.85));

        let stats = history.statistics();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_type.get(&DecisionType::NoHandover), Some(&2));
        assert_eq!(stats.by_type.get(&DecisionType::PrepareHandover), None);
        assert!((stats.success_rate - 0.75).abs() < 1e-12);
        assert!((stats.average_confidence - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_empty_history_is_successful() {
        let history = DecisionHistory::default();
        assert_eq!(history.success_rate(), 1.0);
        assert_eq!(history.statistics().total, 0);
    }
}
