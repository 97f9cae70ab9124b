use chrono::{DateTime, Utc};
use qtty::{Degrees, Kilometers};
use serde::{Deserialize, Serialize};

use super::constellation::Constellation;
use crate::error::SampleError;

fn default_visible() -> bool {
    true
}

/// One geometric visibility sample from the upstream orbit stage.
///
/// Fields are optional because upstream data can have gaps. A sample missing
/// its timestamp, elevation or range cannot be turned into a measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub position_eci_km: [f64; 3],
    #[serde(default)]
    pub velocity_eci_km_s: [f64; 3],
    pub elevation_deg: Option<Degrees>,
    #[serde(default)]
    pub azimuth_deg: Option<Degrees>,
    pub range_km: Option<Kilometers>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

/// Geometry of a sample that passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGeometry {
    pub timestamp: DateTime<Utc>,
    pub elevation: Degrees,
    pub range: Kilometers,
    pub visible: bool,
}

impl PositionSample {
    /// Build a visible sample from topocentric geometry only.
    pub fn new(timestamp: DateTime<Utc>, elevation: Degrees, range: Kilometers) -> Self {
        Self {
            timestamp: Some(timestamp),
            position_eci_km: [0.0; 3],
            velocity_eci_km_s: [0.0; 3],
            elevation_deg: Some(elevation),
            azimuth_deg: None,
            range_km: Some(range),
            visible: true,
        }
    }

    pub fn with_azimuth(mut self, azimuth: Degrees) -> Self {
        self.azimuth_deg = Some(azimuth);
        self
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Speed magnitude from the ECI velocity vector, km/s.
    pub fn speed_km_s(&self) -> f64 {
        let [vx, vy, vz] = self.velocity_eci_km_s;
        (vx * vx + vy * vy + vz * vz).sqrt()
    }

    /// Check the fields needed for a link budget.
    pub fn geometry(&self) -> Result<SampleGeometry, SampleError> {
        let timestamp = self.timestamp.ok_or(SampleError::MissingTimestamp)?;

        let elevation = self
            .elevation_deg
            .filter(|e| e.value().is_finite())
            .ok_or(SampleError::InvalidElevation)?;

        let range = self
            .range_km
            .filter(|r| r.value().is_finite() && r.value() > 0.0)
            .ok_or(SampleError::InvalidRange)?;

        Ok(SampleGeometry {
            timestamp,
            elevation,
            range,
            visible: self.visible,
        })
    }
}

/// Position time series for one satellite over the cycle horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteTrack {
    pub satellite_id: String,
    pub constellation: Constellation,
    #[serde(default)]
    pub positions: Vec<PositionSample>,
}

impl SatelliteTrack {
    pub fn new(
        satellite_id: impl Into<String>,
        constellation: Constellation,
        positions: Vec<PositionSample>,
    ) -> Self {
        Self {
            satellite_id: satellite_id.into(),
            constellation,
            positions,
        }
    }
}

/// Everything one processing cycle consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleInput {
    pub timestamp: DateTime<Utc>,
    pub serving_satellite_id: String,
    #[serde(default)]
    pub satellites: Vec<SatelliteTrack>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_geometry_accepts_complete_sample() {
        let sample = PositionSample::new(t0(), Degrees::new(45.0), Kilometers::new(700.0));
        let geometry = sample.geometry().unwrap();
        assert_eq!(geometry.elevation.value(), 45.0);
        assert_eq!(geometry.range.value(), 700.0);
        assert!(geometry.visible);
    }

    #[test]
    fn test_geometry_rejects_missing_fields() {
        let mut sample = PositionSample::new(t0(), Degrees::new(45.0), Kilometers::new(700.0));
        sample.timestamp = None;
        assert_eq!(sample.geometry(), Err(SampleError::MissingTimestamp));

        let mut sample = PositionSample::new(t0(), Degrees::new(f64::NAN), Kilometers::new(700.0));
        assert_eq!(sample.geometry(), Err(SampleError::InvalidElevation));

        sample.elevation_deg = Some(Degrees::new(30.0));
        sample.range_km = Some(Kilometers::new(-1.0));
        assert_eq!(sample.geometry(), Err(SampleError::InvalidRange));
    }

    #[test]
    fn test_deserialize_sparse_sample() {
        let json = r#"{
            "timestamp": "2025-01-01T00:00:30Z",
            "elevation_deg": 32.5,
            "range_km": 812.0
        }"#;
        let sample: PositionSample = serde_json::from_str(json).unwrap();
        assert!(sample.visible);
        assert_eq!(sample.azimuth_deg, None);
        assert_eq!(sample.range_km.map(|r| r.value()), Some(812.0));
    }

    #[test]
    fn test_speed_from_velocity_vector() {
        let mut sample = PositionSample::new(t0(), Degrees::new(45.0), Kilometers::new(700.0));
        sample.velocity_eci_km_s = [3.0, 4.0, 0.0];
        assert!((sample.speed_km_s() - 5.0).abs() < 1e-12);
    }
}
