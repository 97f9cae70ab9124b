use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 3GPP measurement report event types handled by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    /// Neighbour becomes better than an absolute threshold.
    A4,
    /// Serving worse than threshold 1 while neighbour better than threshold 2.
    A5,
    /// Distance-based condition for moving reference locations.
    D2,
}

impl EventType {
    pub const ALL: [EventType; 3] = [EventType::A4, EventType::A5, EventType::D2];
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::A4 => "A4",
            EventType::A5 => "A5",
            EventType::D2 => "D2",
        };
        f.write_str(name)
    }
}

/// Which leaving condition closed a dual-condition event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// A5: serving measurement rose back above threshold 1.
    ServingRecovered,
    /// A5: neighbour measurement fell below threshold 2.
    NeighbourDegraded,
    /// D2: serving reference point came back within threshold 1.
    ServingApproached,
    /// D2: candidate reference point moved beyond threshold 2.
    CandidateReceded,
}

/// Measured quantities and configured values at the moment an event fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum TriggerDetail {
    A4 {
        neighbour_rsrp_dbm: f64,
        threshold_dbm: f64,
        hysteresis_db: f64,
        offset_db: f64,
    },
    A5 {
        serving_rsrp_dbm: f64,
        neighbour_rsrp_dbm: f64,
        threshold1_dbm: f64,
        threshold2_dbm: f64,
        hysteresis_db: f64,
        offset_db: f64,
    },
    D2 {
        serving_distance_m: f64,
        candidate_distance_m: f64,
        threshold1_m: f64,
        threshold2_m: f64,
        hysteresis_m: f64,
    },
}

/// One detected event interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementEvent {
    pub event_type: EventType,
    pub satellite_id: String,
    /// Start of the time-to-trigger window that led to the event.
    pub start_time: DateTime<Utc>,
    /// Leaving time, or the last processed sample while still ongoing.
    pub end_time: DateTime<Utc>,
    pub ongoing: bool,
    pub trigger_detail: TriggerDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_reason: Option<ExitReason>,
}

impl MeasurementEvent {
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

/// Per-type event counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    pub a4: usize,
    pub a5: usize,
    pub d2: usize,
}

impl EventCounts {
    pub fn get(&self, event_type: EventType) -> usize {
        match event_type {
            EventType::A4 => self.a4,
            EventType::A5 => self.a5,
            EventType::D2 => self.d2,
        }
    }

    pub fn total(&self) -> usize {
        self.a4 + self.a5 + self.d2
    }
}

/// Relative weight of each event type when events are summarised into a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventWeights {
    pub a4: f64,
    pub a5: f64,
    pub d2: f64,
}

impl EventWeights {
    pub fn get(&self, event_type: EventType) -> f64 {
        match event_type {
            EventType::A4 => self.a4,
            EventType::A5 => self.a5,
            EventType::D2 => self.d2,
        }
    }

    /// Capped weighted score: each event is worth 100 points before weighting.
    pub fn strength(&self, counts: &EventCounts) -> f64 {
        let raw: f64 = EventType::ALL
            .iter()
            .map(|&t| counts.get(t) as f64 * 100.0 * self.get(t))
            .sum();
        raw.min(100.0)
    }

    /// Event type with the largest weighted contribution, if any event exists.
    ///
    /// Ties resolve to the type listed first in [`EventType::ALL`].
    pub fn dominant(&self, counts: &EventCounts) -> Option<EventType> {
        let mut best: Option<(EventType, f64)> = None;
        for &event_type in EventType::ALL.iter() {
            let count = counts.get(event_type);
            if count == 0 {
                continue;
            }
            let contribution = count as f64 * self.get(event_type);
            match best {
                Some((_, b)) if contribution <= b => {}
                _ => best = Some((event_type, contribution)),
            }
        }
        best.map(|(t, _)| t)
    }
}

/// All events detected for one satellite in one cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSet {
    pub satellite_id: String,
    pub a4: Vec<MeasurementEvent>,
    pub a5: Vec<MeasurementEvent>,
    pub d2: Vec<MeasurementEvent>,
    /// Sample evaluations skipped across all event types.
    pub skipped_samples: usize,
}

impl EventSet {
    pub fn empty(satellite_id: impl Into<String>) -> Self {
        Self {
            satellite_id: satellite_id.into(),
            ..Default::default()
        }
    }

    pub fn events(&self, event_type: EventType) -> &[MeasurementEvent] {
        match event_type {
            EventType::A4 => &self.a4,
            EventType::A5 => &self.a5,
            EventType::D2 => &self.d2,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeasurementEvent> {
        self.a4.iter().chain(self.a5.iter()).chain(self.d2.iter())
    }

    pub fn counts(&self) -> EventCounts {
        EventCounts {
            a4: self.a4.len(),
            a5: self.a5.len(),
            d2: self.d2.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.a4.len() + self.a5.len() + self.d2.len()
    }

    pub fn has_ongoing(&self) -> bool {
        self.iter().any(|e| e.ongoing)
    }
}
