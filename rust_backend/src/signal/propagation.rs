//! Closed-form propagation models for the satellite downlink.

use qtty::{Degrees, Kilometers};
use std::f64::consts::PI;

/// Speed of light in m/s.
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Boltzmann constant in J/K.
pub const BOLTZMANN_J_K: f64 = 1.380_649e-23;

/// Mean Earth radius in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Equivalent height of the attenuating atmosphere in km.
pub const ATMOSPHERIC_SCALE_HEIGHT_KM: f64 = 8.5;

/// Slant paths through the atmosphere are capped at this length.
pub const MAX_SLANT_PATH_KM: f64 = 100.0;

/// Loss reported for a satellite at or below the horizon.
pub const HORIZON_LOSS_DB: f64 = 100.0;

const WATER_VAPOUR_DENSITY_G_M3: f64 = 7.5;
const CLOUD_LIQUID_WATER_G_M3: f64 = 0.1;

/// Friis free-space path loss in dB.
///
/// FSPL = 20*log10(4π d / λ)
pub fn free_space_path_loss_db(range: Kilometers, frequency_ghz: f64) -> f64 {
    let distance_m = range.value() * 1000.0;
    let wavelength_m = SPEED_OF_LIGHT_M_S / (frequency_ghz * 1e9);
    20.0 * (4.0 * PI * distance_m / wavelength_m).log10()
}

/// Specific oxygen attenuation in dB/km.
pub fn oxygen_attenuation_db_km(frequency_ghz: f64) -> f64 {
    let base = 0.0067 * frequency_ghz.powf(0.8);
    if frequency_ghz < 10.0 {
        base
    } else {
        base * (1.0 + 0.1 * (frequency_ghz - 10.0))
    }
}

/// Specific water vapour attenuation in dB/km.
pub fn water_vapour_attenuation_db_km(frequency_ghz: f64) -> f64 {
    let coefficient = if frequency_ghz < 15.0 {
        0.05 * (frequency_ghz / 10.0).powf(1.6)
    } else {
        0.1 * (frequency_ghz / 10.0).powi(2)
    };
    coefficient * WATER_VAPOUR_DENSITY_G_M3
}

/// Specific cloud attenuation in dB/km.
pub fn cloud_attenuation_db_km(frequency_ghz: f64) -> f64 {
    0.434 * frequency_ghz.powf(1.28) * CLOUD_LIQUID_WATER_G_M3
}

/// Slant path length through the atmosphere in km, capped at [`MAX_SLANT_PATH_KM`].
///
/// Uses the flat-layer approximation above 10° and the spherical-Earth
/// geometry below it, where the flat model diverges.
pub fn slant_path_km(elevation: Degrees) -> f64 {
    let path = if elevation.value() >= 10.0 {
        ATMOSPHERIC_SCALE_HEIGHT_KM / elevation.sin()
    } else {
        let outer = EARTH_RADIUS_KM + ATMOSPHERIC_SCALE_HEIGHT_KM;
        let projected = EARTH_RADIUS_KM * elevation.cos();
        (outer * outer - projected * projected).sqrt() - EARTH_RADIUS_KM * elevation.sin()
    };
    path.min(MAX_SLANT_PATH_KM)
}

/// Total gaseous and cloud attenuation along the slant path, in dB.
pub fn atmospheric_loss_db(elevation: Degrees, frequency_ghz: f64) -> f64 {
    if elevation.value() <= 0.0 {
        return HORIZON_LOSS_DB;
    }

    let specific = oxygen_attenuation_db_km(frequency_ghz)
        + water_vapour_attenuation_db_km(frequency_ghz)
        + cloud_attenuation_db_km(frequency_ghz);

    specific * slant_path_km(elevation)
}

/// Thermal noise power k·T·B in mW.
pub fn thermal_noise_mw(temperature_k: f64, bandwidth_hz: f64) -> f64 {
    BOLTZMANN_J_K * temperature_k * bandwidth_hz * 1000.0
}

pub fn dbm_to_mw(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0)
}

pub fn mw_to_dbm(mw: f64) -> f64 {
    10.0 * mw.log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fspl_doubles_distance_adds_6db() {
        let near = free_space_path_loss_db(Kilometers::new(550.0), 12.0);
        let far = free_space_path_loss_db(Kilometers::new(1100.0), 12.0);
        assert_relative_eq!(far - near, 20.0 * 2f64.log10(), epsilon = 1e-9);
    }

    #[test]
    fn test_fspl_known_value() {
        // 550 km at 12 GHz
        let fspl = free_space_path_loss_db(Kilometers::new(550.0), 12.0);
        assert_relative_eq!(fspl, 168.84, epsilon = 0.01);
    }

    #[test]
    fn test_slant_path_zenith_equals_scale_height() {
        assert_relative_eq!(slant_path_km(Degrees::new(90.0)), ATMOSPHERIC_SCALE_HEIGHT_KM, epsilon = 1e-9);
    }

    #[test]
    fn test_slant_path_is_capped() {
        assert!(slant_path_km(Degrees::new(0.5)) <= MAX_SLANT_PATH_KM);
        assert!(slant_path_km(Degrees::new(5.0)) > slant_path_km(Degrees::new(30.0)));
    }

    #[test]
    fn test_atmospheric_loss_below_horizon() {
        assert_eq!(atmospheric_loss_db(Degrees::new(0.0), 12.0), HORIZON_LOSS_DB);
        assert_eq!(atmospheric_loss_db(Degrees::new(-3.0), 12.0), HORIZON_LOSS_DB);
    }

    #[test]
    fn test_atmospheric_loss_decreases_with_elevation() {
        let low = atmospheric_loss_db(Degrees::new(12.0), 12.0);
        let high = atmospheric_loss_db(Degrees::new(80.0), 12.0);
        assert!(low > high);
        assert!(high > 0.0);
    }

    #[test]
    fn test_water_vapour_model_switches_at_15ghz() {
        assert_relative_eq!(
            water_vapour_attenuation_db_km(20.0),
            0.1 * 4.0 * WATER_VAPOUR_DENSITY_G_M3,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_db_conversions() {
        assert_relative_eq!(dbm_to_mw(0.0), 1.0);
        assert_relative_eq!(mw_to_dbm(dbm_to_mw(-97.3)), -97.3, epsilon = 1e-9);
    }
}
