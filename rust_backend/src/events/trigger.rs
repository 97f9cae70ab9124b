//! Generic time-to-trigger state machine.
//!
//! Every event type shares the same lifecycle:
//!
//! ```text
//! Idle --entering--> Accumulating --held for TTT--> Active --leaving--> Idle
//!                        |
//!                        +--entering fails--> Idle
//! ```
//!
//! The event types only differ in their [`TriggerCondition`].

use chrono::{DateTime, Duration, Utc};

use crate::error::SampleError;
use crate::models::{ExitReason, TriggerDetail};

/// Result of evaluating a leaving condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaving {
    Stay,
    Leave(Option<ExitReason>),
}

/// Entering/leaving predicate pair of one event type.
pub trait TriggerCondition: Send + Sync {
    type Observation;

    fn entering(&self, observation: &Self::Observation) -> bool;

    fn leaving(&self, observation: &Self::Observation) -> Leaving;

    /// Audit record captured when the event fires.
    fn detail(&self, observation: &Self::Observation) -> TriggerDetail;
}

/// A completed or still-open trigger interval.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub ongoing: bool,
    pub exit_reason: Option<ExitReason>,
    pub detail: TriggerDetail,
}

#[derive(Debug, Clone, PartialEq)]
enum TriggerState {
    Idle,
    Accumulating {
        since: DateTime<Utc>,
    },
    Active {
        since: DateTime<Utc>,
        detail: TriggerDetail,
    },
}

/// Runs one [`TriggerCondition`] over a time-ordered observation stream.
pub struct TriggerMachine<C: TriggerCondition> {
    condition: C,
    time_to_trigger: Duration,
    state: TriggerState,
    last_timestamp: Option<DateTime<Utc>>,
    intervals: Vec<TriggerInterval>,
}

impl<C: TriggerCondition> TriggerMachine<C> {
    pub fn new(condition: C, time_to_trigger: Duration) -> Self {
        Self {
            condition,
            time_to_trigger,
            state: TriggerState::Idle,
            last_timestamp: None,
            intervals: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TriggerState::Active { .. })
    }

    pub fn is_accumulating(&self) -> bool {
        matches!(self.state, TriggerState::Accumulating { .. })
    }

    /// Feed one observation.
    ///
    /// A timestamp that does not advance past the previous accepted one is
    /// rejected and leaves the machine untouched, so an open accumulation
    /// window survives the bad sample.
    pub fn step(
        &mut self,
        timestamp: DateTime<Utc>,
        observation: &C::Observation,
    ) -> Result<(), SampleError> {
        if let Some(last) = self.last_timestamp {
            if timestamp <= last {
                return Err(SampleError::NonMonotonicTime);
            }
        }
        self.last_timestamp = Some(timestamp);

        match &self.state {
            TriggerState::Idle => {
                if self.condition.entering(observation) {
                    self.state = TriggerState::Accumulating { since: timestamp };
                    self.try_activate(timestamp, observation);
                }
            }
            TriggerState::Accumulating { .. } => {
                if self.condition.entering(observation) {
                    self.try_activate(timestamp, observation);
                } else {
                    self.state = TriggerState::Idle;
                }
            }
            TriggerState::Active { since, detail } => {
                if let Leaving::Leave(exit_reason) = self.condition.leaving(observation) {
                    log::debug!("Event opened at {} closed at {} ({:?})", since, timestamp, exit_reason);
                    self.intervals.push(TriggerInterval {
                        start: *since,
                        end: timestamp,
                        ongoing: false,
                        exit_reason,
                        detail: detail.clone(),
                    });
                    self.state = TriggerState::Idle;
                }
            }
        }

        Ok(())
    }

    fn try_activate(&mut self, timestamp: DateTime<Utc>, observation: &C::Observation) {
        if let TriggerState::Accumulating { since } = self.state {
            if timestamp - since >= self.time_to_trigger {
                log::debug!("Event triggered at {} after entering at {}", timestamp, since);
                self.state = TriggerState::Active {
                    since,
                    detail: self.condition.detail(observation),
                };
            }
        }
    }

    /// Close the stream. An event still active is reported as ongoing,
    /// ending at the last accepted timestamp.
    pub fn finish(mut self) -> Vec<TriggerInterval> {
        if let TriggerState::Active { since, detail } = self.state {
            let end = self.last_timestamp.unwrap_or(since);
            self.intervals.push(TriggerInterval {
                start: since,
                end,
                ongoing: true,
                exit_reason: None,
                detail,
            });
        }
        self.intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Enters above 10, leaves below 5.
    struct Level;

    impl TriggerCondition for Level {
        type Observation = f64;

        fn entering(&self, v: &f64) -> bool {
            *v > 10.0
        }

        fn leaving(&self, v: &f64) -> Leaving {
            if *v < 5.0 {
                Leaving::Leave(None)
            } else {
                Leaving::Stay
            }
        }

        fn detail(&self, v: &f64) -> TriggerDetail {
            TriggerDetail::A4 {
                neighbour_rsrp_dbm: *v,
                threshold_dbm: 10.0,
                hysteresis_db: 0.0,
                offset_db: 0.0,
            }
        }
    }

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::milliseconds(ms)
    }

    fn run(values: &[(i64, f64)], ttt_ms: i64) -> Vec<TriggerInterval> {
        let mut machine = TriggerMachine::new(Level, Duration::milliseconds(ttt_ms));
        for (ms, v) in values {
            let _ = machine.step(t(*ms), v);
        }
        machine.finish()
    }

    #[test]
    fn test_short_dwell_does_not_fire() {
        let intervals = run(&[(0, 11.0), (50, 11.0), (90, 11.0), (100, 0.0)], 100);
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_dwell_reaching_ttt_fires_once() {
        let intervals = run(&[(0, 11.0), (50, 11.0), (100, 11.0), (150, 7.0), (200, 3.0)], 100);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start, t(0));
        assert_eq!(intervals[0].end, t(200));
        assert!(!intervals[0].ongoing);
    }

    #[test]
    fn test_interrupted_window_restarts() {
        let intervals = run(&[(0, 11.0), (60, 9.0), (120, 11.0), (230, 11.0)], 100);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start, t(120));
        assert!(intervals[0].ongoing);
        assert_eq!(intervals[0].end, t(230));
    }

    #[test]
    fn test_zero_ttt_activates_on_first_sample() {
        let intervals = run(&[(0, 11.0), (10, 1.0)], 0);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start, t(0));
        assert_eq!(intervals[0].end, t(10));
    }

    #[test]
    fn test_non_monotonic_sample_preserves_window() {
        let mut machine = TriggerMachine::new(Level, Duration::milliseconds(100));
        machine.step(t(0), &11.0).unwrap();
        machine.step(t(50), &11.0).unwrap();
        assert_eq!(machine.step(t(40), &0.0), Err(SampleError::NonMonotonicTime));
        assert_eq!(machine.step(t(50), &0.0), Err(SampleError::NonMonotonicTime));
        assert!(machine.is_accumulating());
        machine.step(t(100), &11.0).unwrap();
        assert!(machine.is_active());

        let intervals = machine.finish();
        assert_eq!(intervals[0].start, t(0));
    }

    #[test]
    fn test_hysteresis_gap_keeps_event_open() {
        // 7.0 neither enters nor leaves
        let intervals = run(&[(0, 11.0), (100, 11.0), (200, 7.0), (300, 7.0)], 100);
        assert_eq!(intervals.len(), 1);
        assert!(intervals[0].ongoing);
    }

    #[test]
    fn test_multiple_events_in_one_series() {
        let intervals = run(
            &[(0, 11.0), (100, 11.0), (200, 1.0), (300, 12.0), (400, 12.0), (500, 2.0)],
            100,
        );
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[1].start, t(300));
        assert_eq!(intervals[1].end, t(500));
    }
}
