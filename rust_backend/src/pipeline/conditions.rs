use crate::algorithms::mean;
use crate::models::{EventSet, NetworkConditions, SignalProfile};

/// Visible satellites at which the sky counts as fully dense.
pub const FULL_DENSITY_SATELLITES: f64 = 20.0;

/// RSRP mapped to 0 signal quality.
const QUALITY_FLOOR_DBM: f64 = -120.0;
/// Width of the RSRP window mapped onto [0, 1].
const QUALITY_SPAN_DB: f64 = 50.0;

/// Map an average RSRP onto [0, 1]: -120 dBm is 0, -70 dBm and above is 1.
pub fn signal_quality(average_rsrp_dbm: f64) -> f64 {
    ((average_rsrp_dbm - QUALITY_FLOOR_DBM) / QUALITY_SPAN_DB).clamp(0.0, 1.0)
}

/// Derive the network conditions of one cycle.
///
/// # Arguments
/// * `profiles` - Every satellite of the cycle, serving included
/// * `events` - Event sets of the satellites that were checked for events
/// * `handover_success_rate` - Success rate of the decision history
pub fn derive_conditions<'a, I>(
    profiles: I,
    events: &[EventSet],
    handover_success_rate: f64,
) -> NetworkConditions
where
    I: IntoIterator<Item = &'a SignalProfile>,
{
    let mut satellite_count = 0usize;
    let mut visible = 0usize;
    let mut qualities = Vec::new();

    for profile in profiles {
        satellite_count += 1;
        if !profile.is_empty() {
            visible += 1;
        }
        if let Some(average) = profile.average_rsrp() {
            qualities.push(signal_quality(average));
        }
    }

    let loaded = events.iter().filter(|e| e.has_ongoing()).count();
    let network_load = if satellite_count == 0 {
        0.0
    } else {
        loaded as f64 / satellite_count as f64
    };

    NetworkConditions::new(
        (visible as f64 / FULL_DENSITY_SATELLITES).min(1.0),
        mean(&qualities).unwrap_or(0.0),
        handover_success_rate,
        network_load,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::MetricStats;
    use crate::models::{
        Constellation, EventType, ExitReason, MeasurementEvent, SignalStatistics, TriggerDetail,
    };
    use approx::assert_relative_eq;
    use chrono::Utc;

    fn profile(id: &str, rsrp: Option<f64>) -> SignalProfile {
        let statistics = rsrp.map(|r| {
            let stats = MetricStats {
                mean: r,
                min: r,
                max: r,
                std_dev: 0.0,
                count: 1,
            };
            SignalStatistics {
                rsrp: stats,
                rsrq: stats,
                rs_sinr: stats,
            }
        });
        SignalProfile {
            satellite_id: id.to_string(),
            constellation: Constellation::Starlink,
            samples: Vec::new(),
            statistics,
            stability_score: 100.0,
            visible_sample_count: usize::from(rsrp.is_some()),
            skipped_sample_count: 0,
            total_sample_count: 1,
            mean_elevation_deg: None,
            mean_range_km: None,
        }
    }

    fn ongoing(id: &str) -> EventSet {
        let now = Utc::now();
        let mut set = EventSet::empty(id);
        set.a4.push(MeasurementEvent {
            event_type: EventType::A4,
            satellite_id: id.to_string(),
            start_time: now,
            end_time: now,
            ongoing: true,
            trigger_detail: TriggerDetail::A4 {
                neighbour_rsrp_dbm: -90.0,
                threshold_dbm: -106.0,
                hysteresis_db: 2.0,
                offset_db: 0.0,
            },
            exit_reason: None::<ExitReason>,
        });
        set
    }

    #[test]
    fn test_signal_quality_mapping() {
        assert_eq!(signal_quality(-130.0), 0.0);
        assert_relative_eq!(signal_quality(-95.0), 0.5);
        assert_eq!(signal_quality(-60.0), 1.0);
    }

    #[test]
    fn test_derive_conditions() {
        let profiles = vec![
            profile("a", Some(-95.0)),
            profile("b", Some(-70.0)),
            profile("c", None),
            profile("d", Some(-120.0)),
        ];
        let events = vec![ongoing("a"), EventSet::empty("b")];

        let c = derive_conditions(&profiles, &events, 0.9);
        assert_relative_eq!(c.satellite_density, 3.0 / 20.0);
        assert_relative_eq!(c.average_signal_quality, 0.5);
        assert_relative_eq!(c.handover_success_rate, 0.9);
        assert_relative_eq!(c.network_load, 0.25);
    }

    #[test]
    fn test_no_satellites() {
        let c = derive_conditions(&Vec::<SignalProfile>::new(), &[], 1.0);
        assert_eq!(c.satellite_density, 0.0);
        assert_eq!(c.network_load, 0.0);
        assert_eq!(c.handover_success_rate, 1.0);
    }
}
