use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::algorithms::mean;
use crate::models::{Constellation, QualityGrade, SignalProfile};

/// Overall standing of a constellation in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceRank {
    Excellent,
    Good,
    Fair,
    Poor,
    InsufficientData,
}

impl PerformanceRank {
    /// Rank from `(avg_rsrp + 120) * 0.7 + avg_stability * 0.3`.
    pub fn from_averages(average_rsrp_dbm: f64, average_stability: f64) -> Self {
        let score = (average_rsrp_dbm + 120.0) * 0.7 + average_stability * 0.3;
        if score >= 80.0 {
            PerformanceRank::Excellent
        } else if score >= 65.0 {
            PerformanceRank::Good
        } else if score >= 50.0 {
            PerformanceRank::Fair
        } else {
            PerformanceRank::Poor
        }
    }
}

/// Aggregate signal picture of one constellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationSummary {
    pub constellation: Constellation,
    pub satellite_count: usize,
    /// Satellites that produced no valid sample.
    pub silent_count: usize,
    pub average_rsrp_dbm: Option<f64>,
    pub best_rsrp_dbm: Option<f64>,
    pub worst_rsrp_dbm: Option<f64>,
    pub average_stability_score: Option<f64>,
    pub quality_distribution: BTreeMap<QualityGrade, usize>,
    pub performance: PerformanceRank,
}

impl ConstellationSummary {
    pub fn rsrp_spread_db(&self) -> Option<f64> {
        Some(self.best_rsrp_dbm? - self.worst_rsrp_dbm?)
    }
}

/// Summarise `profiles` per constellation, in [`Constellation::ALL`] order.
///
/// Constellations without any profile are omitted.
pub fn summarize<'a, I>(profiles: I) -> Vec<ConstellationSummary>
where
    I: IntoIterator<Item = &'a SignalProfile>,
{
    let mut groups: BTreeMap<Constellation, Vec<&SignalProfile>> = BTreeMap::new();
    for profile in profiles {
        groups.entry(profile.constellation).or_default().push(profile);
    }

    Constellation::ALL
        .iter()
        .filter_map(|c| groups.get(c).map(|members| summarize_group(*c, members)))
        .collect()
}

fn summarize_group(
    constellation: Constellation,
    members: &[&SignalProfile],
) -> ConstellationSummary {
    let averages: Vec<f64> = members.iter().filter_map(|p| p.average_rsrp()).collect();
    let stabilities: Vec<f64> = members
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.stability_score)
        .collect();

    let mut quality_distribution = BTreeMap::new();
    for grade in members.iter().filter_map(|p| p.grade()) {
        *quality_distribution.entry(grade).or_insert(0) += 1;
    }

    let average_rsrp_dbm = mean(&averages);
    let average_stability_score = mean(&stabilities);
    let performance = match (average_rsrp_dbm, average_stability_score) {
        (Some(rsrp), Some(stability)) => PerformanceRank::from_averages(rsrp, stability),
        _ => PerformanceRank::InsufficientData,
    };

    ConstellationSummary {
        constellation,
        satellite_count: members.len(),
        silent_count: members.len() - averages.len(),
        average_rsrp_dbm,
        best_rsrp_dbm: averages.iter().copied().reduce(f64::max),
        worst_rsrp_dbm: averages.iter().copied().reduce(f64::min),
        average_stability_score,
        quality_distribution,
        performance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::MetricStats;
    use crate::models::SignalStatistics;

    fn profile(constellation: Constellation, rsrp: Option<f64>, stability: f64) -> SignalProfile {
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
            satellite_id: "x".to_string(),
            constellation,
            samples: Vec::new(),
            statistics,
            stability_score: stability,
            visible_sample_count: usize::from(rsrp.is_some()),
            skipped_sample_count: 0,
            total_sample_count: 1,
            mean_elevation_deg: None,
            mean_range_km: None,
        }
    }

    #[test]
    fn test_performance_rank() {
        assert_eq!(PerformanceRank::from_averages(-10.0, 100.0), PerformanceRank::Excellent);
        assert_eq!(PerformanceRank::from_averages(-40.0, 50.0), PerformanceRank::Good);
        assert_eq!(PerformanceRank::from_averages(-100.0, 50.0), PerformanceRank::Poor);
    }

    #[test]
    fn test_summarize_groups_by_constellation() {
        let profiles = vec![
            profile(Constellation::OneWeb, Some(-90.0), 80.0),
            profile(Constellation::Starlink, Some(-85.0), 90.0),
            profile(Constellation::Starlink, Some(-95.0), 70.0),
            profile(Constellation::Starlink, None, 0.0),
        ];
        let summaries = summarize(&profiles);

        assert_eq!(summaries.len(), 2);
        let starlink = &summaries[0];
        assert_eq!(starlink.constellation, Constellation::Starlink);
        assert_eq!(starlink.satellite_count, 3);
        assert_eq!(starlink.silent_count, 1);
        assert_eq!(starlink.average_rsrp_dbm, Some(-90.0));
        assert_eq!(starlink.rsrp_spread_db(), Some(10.0));
        assert_eq!(starlink.average_stability_score, Some(80.0));
        assert_eq!(starlink.quality_distribution.get(&QualityGrade::Good), None);
        assert_eq!(starlink.quality_distribution.get(&QualityGrade::Fair), Some(&1));
        assert_eq!(starlink.quality_distribution.get(&QualityGrade::Poor), Some(&1));
    }

    #[test]
    fn test_silent_constellation_has_insufficient_data() {
        let summaries = summarize(&vec![profile(Constellation::Other, None, 0.0)]);
        assert_eq!(summaries[0].performance, PerformanceRank::InsufficientData);
    }
}
