//! Bounded candidate pool maintained across cycles.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::scoring::{
    check_weights, default_candidate_event_weights, score_candidate, CandidateWeights,
};
use crate::error::{HandoverError, HandoverResult};
use crate::models::{CandidateEvaluation, CandidateScore, EventSet, EventWeights, SignalProfile};

/// Bounds and weights of the candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidatePoolConfig {
    pub min_candidates: usize,
    pub max_candidates: usize,
    pub weights: CandidateWeights,
    pub event_weights: EventWeights,
}

impl Default for CandidatePoolConfig {
    fn default() -> Self {
        Self {
            min_candidates: 1,
            max_candidates: 5,
            weights: CandidateWeights::default(),
            event_weights: default_candidate_event_weights(),
        }
    }
}

impl CandidatePoolConfig {
    pub fn validate(&self) -> HandoverResult<()> {
        if self.max_candidates == 0 {
            return Err(HandoverError::Configuration(
                "max_candidates must be at least 1".to_string(),
            ));
        }
        if self.min_candidates > self.max_candidates {
            return Err(HandoverError::Configuration(format!(
                "min_candidates ({}) exceeds max_candidates ({})",
                self.min_candidates, self.max_candidates
            )));
        }
        self.weights.validate()?;
        check_weights(
            "candidate event",
            &[self.event_weights.a4, self.event_weights.a5, self.event_weights.d2],
        )
    }
}

/// Best first; equal scores fall back to satellite id.
fn by_rank(a: &CandidateScore, b: &CandidateScore) -> Ordering {
    b.composite_score
        .partial_cmp(&a.composite_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.satellite_id.cmp(&b.satellite_id))
}

/// Scores every non-serving satellite and maintains the active candidate
/// pool across cycles.
///
/// Pool membership is sticky: a member is only displaced by an outsider with
/// a strictly greater composite score.
#[derive(Debug, Clone)]
pub struct CandidateManager {
    config: CandidatePoolConfig,
    pool: Vec<String>,
}

impl CandidateManager {
    pub fn new(config: CandidatePoolConfig) -> HandoverResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pool: Vec::new(),
        })
    }

    pub fn config(&self) -> &CandidatePoolConfig {
        &self.config
    }

    /// Satellite ids of the current pool, best first.
    pub fn pool_members(&self) -> &[String] {
        &self.pool
    }

    pub fn clear(&mut self) {
        self.pool.clear();
    }

    /// Score `profiles` and update the active pool.
    ///
    /// `events` are matched to profiles by satellite id; a profile without
    /// an event set scores as if no event was detected. The profile of
    /// `serving_satellite_id` is never a candidate.
    pub fn evaluate(
        &mut self,
        profiles: &[SignalProfile],
        events: &[EventSet],
        serving_satellite_id: &str,
    ) -> CandidateEvaluation {
        let events_by_id: HashMap<&str, &EventSet> =
            events.iter().map(|e| (e.satellite_id.as_str(), e)).collect();

        let mut ranked: Vec<CandidateScore> = profiles
            .iter()
            .filter(|p| p.satellite_id != serving_satellite_id)
            .map(|profile| {
                let score = |set: &EventSet| {
                    score_candidate(profile, set, &self.config.weights, &self.config.event_weights)
                };
                match events_by_id.get(profile.satellite_id.as_str()) {
                    Some(set) => score(set),
                    None => score(&EventSet::empty(profile.satellite_id.clone())),
                }
            })
            .collect();
        ranked.sort_by(by_rank);

        let target = self.config.max_candidates.min(ranked.len());
        let score_of = |id: &str| {
            ranked
                .iter()
                .find(|c| c.satellite_id == id)
                .map(|c| c.composite_score)
        };

        // Step 1: drop members that were not evaluated this cycle
        let previous = self.pool.clone();
        self.pool.retain(|id| score_of(id.as_str()).is_some());
        for id in previous.iter().filter(|id| !self.pool.contains(id)) {
            log::debug!("Candidate {} left the pool: no longer evaluated", id);
        }

        // Step 2: fill free slots, then let strictly better outsiders displace the worst
        for outsider in ranked.iter() {
            if self.pool.contains(&outsider.satellite_id) {
                continue;
            }
            if self.pool.len() < target {
                log::debug!(
                    "Candidate {} joined the pool with score {:.1}",
                    outsider.satellite_id,
                    outsider.composite_score
                );
                self.pool.push(outsider.satellite_id.clone());
                continue;
            }

            let worst = self
                .pool
                .iter()
                .enumerate()
                .filter_map(|(i, id)| ranked.iter().find(|c| &c.satellite_id == id).map(|c| (i, c)))
                .max_by(|(_, a), (_, b)| by_rank(a, b));
            let Some((index, member)) = worst else {
                break;
            };
            if outsider.composite_score > member.composite_score {
                log::debug!(
                    "Candidate {} ({:.1}) displaced {} ({:.1})",
                    outsider.satellite_id,
                    outsider.composite_score,
                    member.satellite_id,
                    member.composite_score
                );
                self.pool[index] = outsider.satellite_id.clone();
            } else {
                // outsiders are visited best first
                break;
            }
        }

        // Step 3: rank pool members
        let mut active_pool: Vec<CandidateScore> = ranked
            .iter()
            .filter(|c| self.pool.contains(&c.satellite_id))
            .cloned()
            .collect();
        active_pool.sort_by(by_rank);
        for (i, candidate) in active_pool.iter_mut().enumerate() {
            candidate.rank = i + 1;
        }
        self.pool = active_pool.iter().map(|c| c.satellite_id.clone()).collect();

        for candidate in ranked.iter_mut() {
            candidate.rank = active_pool
                .iter()
                .find(|p| p.satellite_id == candidate.satellite_id)
                .map(|p| p.rank)
                .unwrap_or(0);
        }

        CandidateEvaluation {
            ranked,
            active_pool,
        }
    }
}
