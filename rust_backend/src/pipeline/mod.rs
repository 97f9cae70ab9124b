//! One handover processing cycle, end to end.
//!
//! # Components
//!
//! - [`conditions`]: Network conditions derived from a cycle's results
//! - [`summary`]: Per-constellation signal summary and performance ranking
//! - [`report`]: Cycle report, statistics and outcome
//!
//! The cycle runs in two phases. The map phase computes the signal profile
//! and the measurement events of every neighbour satellite in parallel,
//! against an immutable threshold snapshot. The reduce phase is sequential:
//! candidate pool, decision, network conditions and threshold adjustment.
//! Thresholds adjusted at the end of cycle N are first used by cycle N+1.

pub mod conditions;
pub mod report;
pub mod summary;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::HashSet;

use crate::config::HandoverConfig;
use crate::decision::{DecisionEngine, DecisionHistory};
use crate::error::{HandoverError, HandoverResult};
use crate::events::{assess, MeasurementEventDetector, ServingReference};
use crate::models::{CycleInput, EventSet, SignalProfile};
use crate::selection::CandidateManager;
use crate::signal::SignalQualityCalculator;
use crate::thresholds::ThresholdController;

pub use conditions::{derive_conditions, signal_quality, FULL_DENSITY_SATELLITES};
pub use report::{CycleOutcome, CycleReport, CycleStatistics};
pub use summary::{summarize, ConstellationSummary, PerformanceRank};

/// Map-phase result for one neighbour satellite.
struct SatelliteAnalysis {
    profile: SignalProfile,
    events: EventSet,
    statistics: CycleStatistics,
}

/// Stateful handover pipeline.
///
/// Holds the state that survives between cycles: the candidate pool, the
/// decision history and the adapted thresholds.
pub struct HandoverPipeline {
    calculator: SignalQualityCalculator,
    candidates: CandidateManager,
    decisions: DecisionEngine,
    controller: ThresholdController,
    last_outcome: Option<CycleOutcome>,
}

impl HandoverPipeline {
    /// Build a pipeline from a validated configuration.
    ///
    /// # Returns
    /// * `Err(HandoverError::Configuration)` if any section is invalid
    pub fn new(config: &HandoverConfig) -> HandoverResult<Self> {
        config.validate()?;

        Ok(Self {
            calculator: config.calculator()?,
            candidates: CandidateManager::new(config.pool_config())?,
            decisions: DecisionEngine::new(config.decision_config())?,
            controller: ThresholdController::new(config.thresholds, config.controller_config())?,
            last_outcome: None,
        })
    }

    pub fn controller(&self) -> &ThresholdController {
        &self.controller
    }

    pub fn candidates(&self) -> &CandidateManager {
        &self.candidates
    }

    pub fn decision_history(&self) -> &DecisionHistory {
        self.decisions.history()
    }

    pub fn last_outcome(&self) -> Option<&CycleOutcome> {
        self.last_outcome.as_ref()
    }

    /// Restore the baseline thresholds.
    pub fn reset_thresholds(&mut self) {
        self.controller.reset_to_baseline();
    }

    /// Run one cycle.
    ///
    /// # Returns
    /// * `Err(HandoverError::CycleInput)` if the input has no satellites, lacks the
    ///   serving satellite or repeats a satellite id. The pipeline then records
    ///   [`CycleOutcome::NoDecision`] and keeps its state unchanged.
    pub fn run_cycle(&mut self, input: &CycleInput) -> HandoverResult<CycleReport> {
        if let Err(e) = check_input(input) {
            log::warn!("Cycle at {} rejected: {}", input.timestamp, e);
            self.last_outcome = Some(CycleOutcome::NoDecision {
                timestamp: input.timestamp,
                reason: e.to_string(),
            });
            return Err(e);
        }

        // Step 1: Freeze thresholds for this cycle
        let thresholds_used = *self.controller.current();
        let detector = MeasurementEventDetector::new(thresholds_used);

        // Step 2: Serving profile, shared read-only with the map phase
        let serving_track = input
            .satellites
            .iter()
            .find(|t| t.satellite_id == input.serving_satellite_id)
            .ok_or_else(|| {
                HandoverError::CycleInput(format!(
                    "serving satellite '{}' not in input",
                    input.serving_satellite_id
                ))
            })?;
        let serving_profile = self.calculator.compute(
            &serving_track.satellite_id,
            serving_track.constellation,
            &serving_track.positions,
        );
        let serving_reference = ServingReference::from_profile(&serving_profile);

        // Step 3: Map phase, one task per neighbour
        let calculator = &self.calculator;
        let analyses: Vec<SatelliteAnalysis> = input
            .satellites
            .par_iter()
            .filter(|t| t.satellite_id != input.serving_satellite_id)
            .map(|track| {
                let profile =
                    calculator.compute(&track.satellite_id, track.constellation, &track.positions);
                let events = detector.detect(&profile, Some(&serving_reference));
                let statistics = CycleStatistics::for_satellite(&profile, &events);
                SatelliteAnalysis {
                    profile,
                    events,
                    statistics,
                }
            })
            .collect();

        // Step 4: Reduce phase
        let mut statistics = analyses
            .iter()
            .fold(CycleStatistics::for_profile(&serving_profile), |acc, a| {
                acc.merge(a.statistics)
            });

        let (profiles, events): (Vec<SignalProfile>, Vec<EventSet>) =
            analyses.into_iter().map(|a| (a.profile, a.events)).unzip();

        let suitability = profiles
            .iter()
            .zip(events.iter())
            .map(|(profile, set)| assess(profile, set))
            .collect();

        let evaluation = self
            .candidates
            .evaluate(&profiles, &events, &input.serving_satellite_id);

        let decision = self
            .decisions
            .decide(&serving_profile, &evaluation.active_pool, input.timestamp);

        let all_profiles = || std::iter::once(&serving_profile).chain(profiles.iter());
        let network_conditions = derive_conditions(
            all_profiles(),
            &events,
            self.decisions.history().success_rate(),
        );

        // Step 5: Adapt thresholds for the next cycle
        let thresholds_next = *self.controller.adjust(&network_conditions, input.timestamp);

        statistics.candidates_evaluated = evaluation.ranked.len();
        statistics.pool_size = evaluation.active_pool.len();
        statistics.threshold_adjustments = applied_adjustments(&self.controller, input.timestamp);

        log::info!(
            "Cycle {}: {} satellites, {} events, pool {}, decision {:?}",
            input.timestamp,
            statistics.satellites_processed,
            statistics.events_detected.total(),
            statistics.pool_size,
            decision.decision_type
        );

        let report = CycleReport {
            timestamp: input.timestamp,
            serving_satellite_id: input.serving_satellite_id.clone(),
            constellation_summary: summarize(all_profiles()),
            decision,
            ranked_candidates: evaluation.ranked,
            active_pool: evaluation.active_pool,
            events,
            suitability,
            network_conditions,
            thresholds_used,
            thresholds_next,
            statistics,
        };
        self.last_outcome = Some(report.outcome());

        Ok(report)
    }

    /// Run consecutive cycles. A rejected cycle does not stop the batch.
    pub fn run_cycles(&mut self, inputs: &[CycleInput]) -> Vec<HandoverResult<CycleReport>> {
        inputs.iter().map(|input| self.run_cycle(input)).collect()
    }
}

fn check_input(input: &CycleInput) -> HandoverResult<()> {
    if input.satellites.is_empty() {
        return Err(HandoverError::CycleInput(
            "cycle input contains no satellites".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(input.satellites.len());
    for track in &input.satellites {
        if !seen.insert(track.satellite_id.as_str()) {
            return Err(HandoverError::CycleInput(format!(
                "satellite '{}' appears more than once",
                track.satellite_id
            )));
        }
    }

    if !seen.contains(input.serving_satellite_id.as_str()) {
        return Err(HandoverError::CycleInput(format!(
            "serving satellite '{}' not in input",
            input.serving_satellite_id
        )));
    }

    Ok(())
}

fn applied_adjustments(controller: &ThresholdController, now: DateTime<Utc>) -> usize {
    controller
        .history()
        .filter(|r| r.timestamp == now && r.applied)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Constellation, DecisionType, PositionSample, SatelliteTrack};
    use crate::thresholds::ThresholdSet;
    use chrono::{Duration, TimeZone};
    use qtty::{Degrees, Kilometers};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn track(id: &str, elevation: f64, range_km: f64) -> SatelliteTrack {
        let positions = (0..10)
            .map(|i| {
                PositionSample::new(
                    t0() + Duration::seconds(i),
                    Degrees::new(elevation),
                    Kilometers::new(range_km),
                )
            })
            .collect();
        SatelliteTrack::new(id, Constellation::Starlink, positions)
    }

    fn pipeline() -> HandoverPipeline {
        HandoverPipeline::new(&HandoverConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_input_is_rejected_and_recorded() {
        let mut p = pipeline();
        let input = CycleInput {
            timestamp: t0(),
            serving_satellite_id: "s".to_string(),
            satellites: Vec::new(),
        };

        assert!(matches!(p.run_cycle(&input), Err(HandoverError::CycleInput(_))));
        assert!(matches!(
            p.last_outcome(),
            Some(CycleOutcome::NoDecision { .. })
        ));
        assert!(p.decision_history().is_empty());
    }

    #[test]
    fn test_missing_serving_is_rejected() {
        let mut p = pipeline();
        let input = CycleInput {
            timestamp: t0(),
            serving_satellite_id: "s".to_string(),
            satellites: vec![track("a", 40.0, 800.0)],
        };
        assert!(matches!(p.run_cycle(&input), Err(HandoverError::CycleInput(_))));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut p = pipeline();
        let input = CycleInput {
            timestamp: t0(),
            serving_satellite_id: "s".to_string(),
            satellites: vec![track("s", 40.0, 800.0), track("s", 30.0, 900.0)],
        };
        assert!(p.run_cycle(&input).is_err());
    }

    #[test]
    fn test_cycle_produces_report() {
        let mut p = pipeline();
        let input = CycleInput {
            timestamp: t0(),
            serving_satellite_id: "s".to_string(),
            satellites: vec![
                track("s", 20.0, 1200.0),
                track("a", 60.0, 600.0),
                track("b", 3.0, 2000.0),
            ],
        };

        let report = p.run_cycle(&input).unwrap();
        assert_eq!(report.statistics.satellites_processed, 3);
        assert_eq!(report.statistics.samples_total, 30);
        assert_eq!(report.statistics.empty_profiles, 1);
        assert_eq!(report.ranked_candidates.len(), 2);
        assert!(report
            .ranked_candidates
            .iter()
            .all(|c| c.satellite_id != "s"));
        assert_eq!(report.events.len(), 2);
        assert_eq!(report.suitability.len(), 2);
        assert_eq!(report.thresholds_used, ThresholdSet::default());
        assert!(report.thresholds_next.within_valid_ranges());
        assert_eq!(p.decision_history().len(), 1);
        assert!(matches!(
            p.last_outcome(),
            Some(CycleOutcome::Decided { .. })
        ));
        assert_ne!(report.decision.decision_type, DecisionType::EmergencyHandover);
    }
}
