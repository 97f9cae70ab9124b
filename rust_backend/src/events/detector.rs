//! Runs the A4, A5 and D2 trigger machines over one neighbour's signal profile.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::predicates::{
    A4Condition, A5Condition, D2Condition, DistanceObservation, DualRsrpObservation,
    NeighbourObservation,
};
use super::trigger::{TriggerCondition, TriggerInterval, TriggerMachine};
use crate::error::SampleError;
use crate::models::{EventSet, EventType, MeasurementEvent, SignalProfile};
use crate::thresholds::{time_to_trigger, ThresholdSet};

/// Serving-satellite measurement at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServingPoint {
    /// `None` when the serving sample was below the measurement floor.
    pub rsrp_dbm: Option<f64>,
    pub distance_m: f64,
}

/// Serving satellite's measurements indexed by timestamp.
///
/// A5 and D2 compare each neighbour sample with the serving sample taken at
/// the same instant.
#[derive(Debug, Clone, Default)]
pub struct ServingReference {
    satellite_id: String,
    points: HashMap<DateTime<Utc>, ServingPoint>,
}

impl ServingReference {
    pub fn from_profile(profile: &SignalProfile) -> Self {
        let points = profile
            .samples
            .iter()
            .map(|s| {
                let point = ServingPoint {
                    rsrp_dbm: s.valid.then_some(s.rsrp_dbm),
                    distance_m: s.range_km.value() * 1000.0,
                };
                (s.timestamp, point)
            })
            .collect();

        Self {
            satellite_id: profile.satellite_id.clone(),
            points,
        }
    }

    pub fn satellite_id(&self) -> &str {
        &self.satellite_id
    }

    pub fn at(&self, timestamp: &DateTime<Utc>) -> Option<&ServingPoint> {
        self.points.get(timestamp)
    }
}

/// Detects A4/A5/D2 events against a fixed threshold snapshot.
#[derive(Debug, Clone)]
pub struct MeasurementEventDetector {
    thresholds: ThresholdSet,
}

impl MeasurementEventDetector {
    pub fn new(thresholds: ThresholdSet) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Run all three event machines over one neighbour profile.
    ///
    /// Without a serving reference only A4 can be evaluated; A5 and D2
    /// samples are counted as skipped.
    pub fn detect(
        &self,
        profile: &SignalProfile,
        serving: Option<&ServingReference>,
    ) -> EventSet {
        let mut a4 = TriggerMachine::new(
            A4Condition::from_thresholds(&self.thresholds),
            time_to_trigger(self.thresholds.a4.time_to_trigger_ms),
        );
        let mut a5 = TriggerMachine::new(
            A5Condition::from_thresholds(&self.thresholds),
            time_to_trigger(self.thresholds.a5.time_to_trigger_ms),
        );
        let mut d2 = TriggerMachine::new(
            D2Condition::from_thresholds(&self.thresholds),
            time_to_trigger(self.thresholds.d2.time_to_trigger_ms),
        );

        let mut skipped = 0usize;
        let mut note = |event_type: EventType, result: Result<(), SampleError>| {
            if let Err(e) = result {
                skipped += 1;
                log::debug!(
                    "{} skipped sample of satellite {}: {}",
                    event_type,
                    profile.satellite_id,
                    e
                );
            }
        };

        for sample in &profile.samples {
            let serving_point = serving.and_then(|s| s.at(&sample.timestamp));

            // A4
            let result = if sample.valid {
                a4.step(
                    sample.timestamp,
                    &NeighbourObservation {
                        neighbour_rsrp_dbm: sample.rsrp_dbm,
                    },
                )
            } else {
                Err(SampleError::InvalidSignal)
            };
            note(EventType::A4, result);

            // A5
            let result = match (sample.valid, serving_point) {
                (false, _) => Err(SampleError::InvalidSignal),
                (true, None) => Err(SampleError::MissingServingSample),
                (true, Some(point)) => match point.rsrp_dbm {
                    Some(serving_rsrp_dbm) => a5.step(
                        sample.timestamp,
                        &DualRsrpObservation {
                            serving_rsrp_dbm,
                            neighbour_rsrp_dbm: sample.rsrp_dbm,
                        },
                    ),
                    None => Err(SampleError::InvalidSignal),
                },
            };
            note(EventType::A5, result);

            // D2
            let result = match serving_point {
                Some(point) => d2.step(
                    sample.timestamp,
                    &DistanceObservation {
                        serving_distance_m: point.distance_m,
                        candidate_distance_m: sample.range_km.value() * 1000.0,
                    },
                ),
                None => Err(SampleError::MissingServingSample),
            };
            note(EventType::D2, result);
        }

        let events = EventSet {
            satellite_id: profile.satellite_id.clone(),
            a4: into_events(a4, EventType::A4, &profile.satellite_id),
            a5: into_events(a5, EventType::A5, &profile.satellite_id),
            d2: into_events(d2, EventType::D2, &profile.satellite_id),
            skipped_samples: skipped,
        };

        if events.total() > 0 {
            log::debug!(
                "Satellite {}: {} A4, {} A5, {} D2 events",
                profile.satellite_id,
                events.a4.len(),
                events.a5.len(),
                events.d2.len()
            );
        }

        events
    }
}

fn into_events<C: TriggerCondition>(
    machine: TriggerMachine<C>,
    event_type: EventType,
    satellite_id: &str,
) -> Vec<MeasurementEvent> {
    machine
        .finish()
        .into_iter()
        .map(|interval: TriggerInterval| MeasurementEvent {
            event_type,
            satellite_id: satellite_id.to_string(),
            start_time: interval.start,
            end_time: interval.end,
            ongoing: interval.ongoing,
            trigger_detail: interval.detail,
            exit_reason: interval.exit_reason,
        })
        .collect()
}
