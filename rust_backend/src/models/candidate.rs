use serde::{Deserialize, Serialize};

use super::constellation::Constellation;
use super::event::EventCounts;

/// The four normalized components of a candidate's composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub signal_quality: f64,
    pub event_strength: f64,
    pub stability: f64,
    pub geometric: f64,
}

/// Scored handover candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub satellite_id: String,
    pub constellation: Constellation,
    pub subscores: SubScores,
    pub composite_score: f64,
    /// 1-based position inside the active pool, 0 outside it.
    pub rank: usize,
    pub average_rsrp_dbm: Option<f64>,
    pub rsrp_std_dev_db: Option<f64>,
    pub stability_score: f64,
    pub event_counts: EventCounts,
}

impl CandidateScore {
    pub fn in_pool(&self) -> bool {
        self.rank > 0
    }
}

/// Output of one candidate evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    /// Every evaluated satellite, best first.
    pub ranked: Vec<CandidateScore>,
    /// Active pool ordered by rank.
    pub active_pool: Vec<CandidateScore>,
}

impl CandidateEvaluation {
    pub fn best(&self) -> Option<&CandidateScore> {
        self.active_pool.first()
    }
}
