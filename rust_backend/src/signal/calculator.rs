//! Link budget and signal profile computation for one satellite.

use qtty::{Degrees, Kilometers};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::propagation::{
    atmospheric_loss_db, dbm_to_mw, free_space_path_loss_db, mw_to_dbm, thermal_noise_mw,
};
use crate::algorithms::statistics::{mean, MetricStats};
use crate::error::SampleError;
use crate::models::{
    Constellation, PositionSample, QualityGrade, SampleGeometry, SignalProfile, SignalSample,
    SignalStatistics,
};

/// Reported RSRP range in dBm.
pub const RSRP_RANGE_DBM: (f64, f64) = (-144.0, -44.0);
/// Reported RSRQ range in dB.
pub const RSRQ_RANGE_DB: (f64, f64) = (-19.5, -3.0);
/// Reported RS-SINR range in dB.
pub const RS_SINR_RANGE_DB: (f64, f64) = (-23.0, 40.0);

/// RSRP reported for samples below the measurement floor.
pub const INVALID_RSRP_DBM: f64 = -140.0;

const RESOURCE_BLOCK_HZ: f64 = 180_000.0;
const ELEVATION_PENALTY_DB_PER_DEG: f64 = 0.2;
const ELEVATION_PENALTY_START_DEG: f64 = 20.0;

pub fn clamp_rsrp(rsrp_dbm: f64) -> f64 {
    rsrp_dbm.clamp(RSRP_RANGE_DBM.0, RSRP_RANGE_DBM.1)
}

pub fn clamp_rsrq(rsrq_db: f64) -> f64 {
    rsrq_db.clamp(RSRQ_RANGE_DB.0, RSRQ_RANGE_DB.1)
}

pub fn clamp_rs_sinr(sinr_db: f64) -> f64 {
    sinr_db.clamp(RS_SINR_RANGE_DB.0, RS_SINR_RANGE_DB.1)
}

/// Downlink parameters of one constellation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstellationParams {
    pub eirp_dbw: f64,
    pub frequency_ghz: f64,
}

impl ConstellationParams {
    pub fn for_constellation(constellation: Constellation) -> Self {
        match constellation {
            Constellation::Starlink => Self {
                eirp_dbw: 37.5,
                frequency_ghz: 12.0,
            },
            Constellation::OneWeb => Self {
                eirp_dbw: 40.0,
                frequency_ghz: 13.25,
            },
            Constellation::Other => Self {
                eirp_dbw: 38.0,
                frequency_ghz: 12.0,
            },
        }
    }

    pub fn eirp_dbm(&self) -> f64 {
        self.eirp_dbw + 30.0
    }
}

/// Receive side of the link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserTerminal {
    pub antenna_gain_dbi: f64,
    pub antenna_efficiency: f64,
    pub system_temperature_k: f64,
    pub cable_loss_db: f64,
}

impl Default for UserTerminal {
    fn default() -> Self {
        Self {
            antenna_gain_dbi: 35.0,
            antenna_efficiency: 0.65,
            system_temperature_k: 150.0,
            cable_loss_db: 0.5,
        }
    }
}

impl UserTerminal {
    /// Effective receive gain in dBi at the given elevation.
    ///
    /// Phased-array terminals lose gain as the beam is steered away from boresight.
    pub fn gain_dbi(&self, elevation: Degrees) -> f64 {
        let el = elevation.value();
        let elevation_factor = if el >= 45.0 {
            1.0
        } else if el >= 20.0 {
            0.9 + 0.1 * (el - 20.0) / 25.0
        } else {
            0.7 + 0.2 * el / 20.0
        };
        self.antenna_gain_dbi * self.antenna_efficiency * elevation_factor
    }
}

/// Fixed measurement configuration of the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementSettings {
    /// Samples below this elevation get the invalid sentinel.
    pub min_elevation_deg: f64,
    pub measurement_bandwidth_rb: u32,
    pub interference_to_noise_db: f64,
}

impl Default for MeasurementSettings {
    fn default() -> Self {
        Self {
            min_elevation_deg: 5.0,
            measurement_bandwidth_rb: 25,
            interference_to_noise_db: 3.0,
        }
    }
}

/// Full link budget of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkBudget {
    pub eirp_dbm: f64,
    pub rx_gain_dbi: f64,
    pub free_space_loss_db: f64,
    pub atmospheric_loss_db: f64,
    pub cable_loss_db: f64,
    pub elevation_penalty_db: f64,
    /// Received power before clamping.
    pub received_power_dbm: f64,
    pub thermal_noise_dbm: f64,
    pub interference_dbm: f64,
}

/// Turns position samples into RSRP/RSRQ/RS-SINR estimates.
#[derive(Debug, Clone)]
pub struct SignalQualityCalculator {
    constellations: HashMap<Constellation, ConstellationParams>,
    terminal: UserTerminal,
    settings: MeasurementSettings,
}

impl Default for SignalQualityCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalQualityCalculator {
    /// Calculator with the built-in constellation table.
    pub fn new() -> Self {
        let constellations = Constellation::ALL
            .iter()
            .map(|&c| (c, ConstellationParams::for_constellation(c)))
            .collect();

        Self {
            constellations,
            terminal: UserTerminal::default(),
            settings: MeasurementSettings::default(),
        }
    }

    pub fn with_terminal(mut self, terminal: UserTerminal) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn with_settings(mut self, settings: MeasurementSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Override the downlink parameters of one constellation.
    pub fn with_constellation(
        mut self,
        constellation: Constellation,
        params: ConstellationParams,
    ) -> Self {
        self.constellations.insert(constellation, params);
        self
    }

    pub fn params(&self, constellation: Constellation) -> ConstellationParams {
        self.constellations
            .get(&constellation)
            .copied()
            .unwrap_or_else(|| ConstellationParams::for_constellation(constellation))
    }

    pub fn settings(&self) -> &MeasurementSettings {
        &self.settings
    }

    fn noise_and_interference_mw(&self) -> (f64, f64) {
        let bandwidth_hz = self.settings.measurement_bandwidth_rb as f64 * RESOURCE_BLOCK_HZ;
        let noise = thermal_noise_mw(self.terminal.system_temperature_k, bandwidth_hz);
        let interference = noise * 10f64.powf(self.settings.interference_to_noise_db / 10.0);
        (noise, interference)
    }

    /// Link budget breakdown for one geometry.
    pub fn link_budget(
        &self,
        constellation: Constellation,
        elevation: Degrees,
        range: Kilometers,
    ) -> LinkBudget {
        let params = self.params(constellation);

        let eirp_dbm = params.eirp_dbm();
        let rx_gain_dbi = self.terminal.gain_dbi(elevation);
        let free_space_loss_db = free_space_path_loss_db(range, params.frequency_ghz);
        let atmospheric = atmospheric_loss_db(elevation, params.frequency_ghz);
        let elevation_penalty_db =
            (ELEVATION_PENALTY_START_DEG - elevation.value()).max(0.0) * ELEVATION_PENALTY_DB_PER_DEG;

        let received_power_dbm = eirp_dbm + rx_gain_dbi
            - free_space_loss_db
            - atmospheric
            - self.terminal.cable_loss_db
            - elevation_penalty_db;

        let (noise, interference) = self.noise_and_interference_mw();

        LinkBudget {
            eirp_dbm,
            rx_gain_dbi,
            free_space_loss_db,
            atmospheric_loss_db: atmospheric,
            cable_loss_db: self.terminal.cable_loss_db,
            elevation_penalty_db,
            received_power_dbm,
            thermal_noise_dbm: mw_to_dbm(noise),
            interference_dbm: mw_to_dbm(interference),
        }
    }

    /// RSRQ for a given RSRP, clamped to [`RSRQ_RANGE_DB`].
    pub fn rsrq_db(&self, rsrp_dbm: f64) -> f64 {
        let (noise, interference) = self.noise_and_interference_mw();
        let rsrp = dbm_to_mw(rsrp_dbm);
        let rssi = rsrp + interference + noise;
        let n = self.settings.measurement_bandwidth_rb as f64;
        clamp_rsrq(10.0 * (n * rsrp / rssi).log10())
    }

    /// RS-SINR for a given RSRP, clamped to [`RS_SINR_RANGE_DB`].
    pub fn rs_sinr_db(&self, rsrp_dbm: f64) -> f64 {
        let (noise, interference) = self.noise_and_interference_mw();
        clamp_rs_sinr(10.0 * (dbm_to_mw(rsrp_dbm) / (interference + noise)).log10())
    }

    fn sentinel(&self, geometry: &SampleGeometry) -> SignalSample {
        SignalSample {
            timestamp: geometry.timestamp,
            rsrp_dbm: INVALID_RSRP_DBM,
            rsrq_db: RSRQ_RANGE_DB.0,
            rs_sinr_db: RS_SINR_RANGE_DB.0,
            atmospheric_loss_db: 0.0,
            quality_grade: QualityGrade::VeryPoor,
            elevation_deg: geometry.elevation,
            range_km: geometry.range,
            valid: false,
        }
    }

    /// Signal estimate for a single position sample.
    ///
    /// # Returns
    /// * `Ok(SignalSample)` - a measurement, or the invalid sentinel when the
    ///   satellite is below the floor or flagged not visible
    /// * `Err(SampleError)` - the sample is unusable and must be skipped
    pub fn compute_sample(
        &self,
        constellation: Constellation,
        sample: &PositionSample,
    ) -> Result<SignalSample, SampleError> {
        let geometry = sample.geometry()?;

        if !geometry.visible || geometry.elevation.value() < self.settings.min_elevation_deg {
            return Ok(self.sentinel(&geometry));
        }

        let budget = self.link_budget(constellation, geometry.elevation, geometry.range);
        let rsrp_dbm = clamp_rsrp(budget.received_power_dbm);

        Ok(SignalSample {
            timestamp: geometry.timestamp,
            rsrp_dbm,
            rsrq_db: self.rsrq_db(rsrp_dbm),
            rs_sinr_db: self.rs_sinr_db(rsrp_dbm),
            atmospheric_loss_db: budget.atmospheric_loss_db,
            quality_grade: QualityGrade::from_rsrp(rsrp_dbm),
            elevation_deg: geometry.elevation,
            range_km: geometry.range,
            valid: true,
        })
    }

    /// Build the signal profile of one satellite.
    ///
    /// Unusable samples are skipped and counted. A satellite with no valid
    /// sample still gets a profile, with no statistics and zero stability.
    pub fn compute(
        &self,
        satellite_id: &str,
        constellation: Constellation,
        positions: &[PositionSample],
    ) -> SignalProfile {
        let mut samples = Vec::with_capacity(positions.len());
        let mut skipped = 0usize;

        for (index, position) in positions.iter().enumerate() {
            match self.compute_sample(constellation, position) {
                Ok(sample) => samples.push(sample),
                Err(e) => {
                    skipped += 1;
                    log::warn!(
                        "Skipping sample {} of satellite {}: {}",
                        index,
                        satellite_id,
                        e
                    );
                }
            }
        }

        let profile = build_profile(satellite_id, constellation, samples, skipped, positions.len());

        if profile.is_empty() {
            log::warn!(
                "Satellite {} produced no valid signal samples ({} input, {} skipped)",
                satellite_id,
                positions.len(),
                skipped
            );
        }

        profile
    }
}

/// Stability score from RSRP spread: 100 for a flat signal, 0 at 20 dB std dev.
pub fn stability_from_std_dev(std_dev_db: f64) -> f64 {
    (100.0 - 5.0 * std_dev_db).max(0.0)
}

fn build_profile(
    satellite_id: &str,
    constellation: Constellation,
    samples: Vec<SignalSample>,
    skipped: usize,
    total: usize,
) -> SignalProfile {
    let valid: Vec<&SignalSample> = samples.iter().filter(|s| s.valid).collect();

    let rsrp: Vec<f64> = valid.iter().map(|s| s.rsrp_dbm).collect();
    let rsrq: Vec<f64> = valid.iter().map(|s| s.rsrq_db).collect();
    let sinr: Vec<f64> = valid.iter().map(|s| s.rs_sinr_db).collect();
    let elevations: Vec<f64> = valid.iter().map(|s| s.elevation_deg.value()).collect();
    let ranges: Vec<f64> = valid.iter().map(|s| s.range_km.value()).collect();

    let statistics = match (
        MetricStats::from_values(&rsrp),
        MetricStats::from_values(&rsrq),
        MetricStats::from_values(&sinr),
    ) {
        (Some(rsrp), Some(rsrq), Some(rs_sinr)) => Some(SignalStatistics {
            rsrp,
            rsrq,
            rs_sinr,
        }),
        _ => None,
    };

    let stability_score = statistics
        .map(|s| stability_from_std_dev(s.rsrp.std_dev))
        .unwrap_or(0.0);
    let visible_sample_count = valid.len();

    SignalProfile {
        satellite_id: satellite_id.to_string(),
        constellation,
        samples,
        statistics,
        stability_score,
        visible_sample_count,
        skipped_sample_count: skipped,
        total_sample_count: total,
        mean_elevation_deg: mean(&elevations).map(Degrees::new),
        mean_range_km: mean(&ranges).map(Kilometers::new),
    }
}
