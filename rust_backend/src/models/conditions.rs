use serde::{Deserialize, Serialize};

/// Aggregated network state fed to the threshold controller. All fields in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkConditions {
    pub satellite_density: f64,
    pub average_signal_quality: f64,
    pub handover_success_rate: f64,
    pub network_load: f64,
}

impl NetworkConditions {
    /// Build conditions, clamping each field into [0, 1]. NaN becomes 0.
    pub fn new(
        satellite_density: f64,
        average_signal_quality: f64,
        handover_success_rate: f64,
        network_load: f64,
    ) -> Self {
        Self {
            satellite_density: unit_clamp(satellite_density),
            average_signal_quality: unit_clamp(average_signal_quality),
            handover_success_rate: unit_clamp(handover_success_rate),
            network_load: unit_clamp(network_load),
        }
    }
}

impl Default for NetworkConditions {
    /// Neutral conditions that trigger no adjustment rule.
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.9, 0.5)
    }
}

fn unit_clamp(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
