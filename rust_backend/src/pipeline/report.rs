use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::summary::ConstellationSummary;
use crate::events::HandoverSuitability;
use crate::models::{
    CandidateScore, DecisionType, EventCounts, EventSet, HandoverDecision, NetworkConditions,
    SignalProfile,
};
use crate::thresholds::ThresholdSet;

/// Counters of one cycle. Built per satellite in the map phase and merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleStatistics {
    pub satellites_processed: usize,
    pub empty_profiles: usize,
    pub samples_total: usize,
    pub samples_skipped: usize,
    /// Event evaluations skipped over all event types.
    pub event_samples_skipped: usize,
    pub events_detected: EventCounts,
    pub ongoing_events: usize,
    pub candidates_evaluated: usize,
    pub pool_size: usize,
    pub threshold_adjustments: usize,
}

impl CycleStatistics {
    pub fn for_profile(profile: &SignalProfile) -> Self {
        Self {
            satellites_processed: 1,
            empty_profiles: usize::from(profile.is_empty()),
            samples_total: profile.total_sample_count,
            samples_skipped: profile.skipped_sample_count,
            ..Self::default()
        }
    }

    pub fn for_satellite(profile: &SignalProfile, events: &EventSet) -> Self {
        Self {
            event_samples_skipped: events.skipped_samples,
            events_detected: events.counts(),
            ongoing_events: events.iter().filter(|e| e.ongoing).count(),
            ..Self::for_profile(profile)
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.satellites_processed += other.satellites_processed;
        self.empty_profiles += other.empty_profiles;
        self.samples_total += other.samples_total;
        self.samples_skipped += other.samples_skipped;
        self.event_samples_skipped += other.event_samples_skipped;
        self.events_detected.a4 += other.events_detected.a4;
        self.events_detected.a5 += other.events_detected.a5;
        self.events_detected.d2 += other.events_detected.d2;
        self.ongoing_events += other.ongoing_events;
        self.candidates_evaluated += other.candidates_evaluated;
        self.pool_size += other.pool_size;
        self.threshold_adjustments += other.threshold_adjustments;
        self
    }
}

/// How the last cycle ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    Decided {
        timestamp: DateTime<Utc>,
        decision_type: DecisionType,
        target_satellite_id: Option<String>,
    },
    /// The input was unusable and no decision was made.
    NoDecision {
        timestamp: DateTime<Utc>,
        reason: String,
    },
}

/// Everything one cycle produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub timestamp: DateTime<Utc>,
    pub serving_satellite_id: String,
    pub decision: HandoverDecision,
    /// Every evaluated candidate, best first.
    pub ranked_candidates: Vec<CandidateScore>,
    pub active_pool: Vec<CandidateScore>,
    pub events: Vec<EventSet>,
    pub suitability: Vec<HandoverSuitability>,
    pub constellation_summary: Vec<ConstellationSummary>,
    pub network_conditions: NetworkConditions,
    /// Snapshot the events of this cycle were detected with.
    pub thresholds_used: ThresholdSet,
    /// Thresholds the next cycle will use.
    pub thresholds_next: ThresholdSet,
    pub statistics: CycleStatistics,
}

impl CycleReport {
    pub fn outcome(&self) -> CycleOutcome {
        CycleOutcome::Decided {
            timestamp: self.timestamp,
            decision_type: self.decision.decision_type,
            target_satellite_id: self.decision.target_satellite_id.clone(),
        }
    }

    /// Satellites the suitability assessment marked as handover candidates.
    pub fn suitable_satellites(&self) -> impl Iterator<Item = &str> {
        self.suitability
            .iter()
            .filter(|s| s.is_candidate)
            .map(|s| s.satellite_id.as_str())
    }
}
