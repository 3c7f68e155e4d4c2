//! Species preference profiles (read-only catalogue)

use serde::Serialize;

use crate::error::EngineError;
use crate::pressure::PressureTrend;

/// Score points added for each pressure trend bucket
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PressureResponse {
    pub rapid_fall: f64,
    pub falling: f64,
    pub stable: f64,
    pub rising: f64,
    pub rapid_rise: f64,
}

impl PressureResponse {
    pub fn points(&self, trend: PressureTrend) -> f64 {
        match trend {
            PressureTrend::RapidFall => self.rapid_fall,
            PressureTrend::Falling => self.falling,
            PressureTrend::Stable => self.stable,
            PressureTrend::Rising => self.rising,
            PressureTrend::RapidRise => self.rapid_rise,
        }
    }
}

/// Preference and sensitivity constants for one species
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpeciesProfile {
    pub key: &'static str,
    pub name: &'static str,
    /// Water temperature of peak activity, °F
    pub optimal_temp_f: f64,
    /// Half-width of the band around the optimum with no penalty, °F
    pub comfort_band_f: f64,
    /// Falloff scale outside the comfort band, °F
    pub temp_spread_f: f64,
    pub pressure: PressureResponse,
    /// Preferred mean wind, mph
    pub wind_min_mph: f64,
    pub wind_max_mph: f64,
    /// 0 = indifferent to light, 1 = strongly prefers low light
    pub light_sensitivity: f64,
    /// 0 = ignores the moon, 1 = strongly lunar
    pub lunar_sensitivity: f64,
    /// Depth (ft) to suggest when fish are holding deep
    pub deep_holding_ft: f64,
}

impl SpeciesProfile {
    /// Look up a species by key
    pub fn lookup(key: &str) -> Result<&'static SpeciesProfile, EngineError> {
        let wanted = key.trim().to_ascii_lowercase();
        SPECIES_PROFILES
            .iter()
            .find(|p| p.key == wanted)
            .ok_or_else(|| EngineError::UnknownSpecies(key.to_string()))
    }

    pub fn all() -> &'static [SpeciesProfile] {
        SPECIES_PROFILES
    }
}

static SPECIES_PROFILES: &[SpeciesProfile] = &[
    SpeciesProfile {
        key: "bluegill",
        name: "Bluegill",
        optimal_temp_f: 75.0,
        comfort_band_f: 5.0,
        temp_spread_f: 12.0,
        pressure: PressureResponse {
            rapid_fall: 8.0,
            falling: 12.0,
            stable: 4.0,
            rising: -4.0,
            rapid_rise: -12.0,
        },
        wind_min_mph: 2.0,
        wind_max_mph: 10.0,
        light_sensitivity: 0.3,
        lunar_sensitivity: 0.8,
        deep_holding_ft: 12.0,
    },
    SpeciesProfile {
        key: "largemouth_bass",
        name: "Largemouth Bass",
        optimal_temp_f: 72.0,
        comfort_band_f: 6.0,
        temp_spread_f: 14.0,
        pressure: PressureResponse {
            rapid_fall: 12.0,
            falling: 14.0,
            stable: 3.0,
            rising: -5.0,
            rapid_rise: -14.0,
        },
        wind_min_mph: 4.0,
        wind_max_mph: 15.0,
        light_sensitivity: 0.6,
        lunar_sensitivity: 0.5,
        deep_holding_ft: 15.0,
    },
    SpeciesProfile {
        key: "smallmouth_bass",
        name: "Smallmouth Bass",
        optimal_temp_f: 68.0,
        comfort_band_f: 5.0,
        temp_spread_f: 12.0,
        pressure: PressureResponse {
            rapid_fall: 10.0,
            falling: 12.0,
            stable: 4.0,
            rising: -4.0,
            rapid_rise: -12.0,
        },
        wind_min_mph: 5.0,
        wind_max_mph: 16.0,
        light_sensitivity: 0.5,
        lunar_sensitivity: 0.4,
        deep_holding_ft: 20.0,
    },
    SpeciesProfile {
        key: "crappie",
        name: "Crappie",
        optimal_temp_f: 65.0,
        comfort_band_f: 5.0,
        temp_spread_f: 11.0,
        pressure: PressureResponse {
            rapid_fall: 6.0,
            falling: 10.0,
            stable: 6.0,
            rising: -3.0,
            rapid_rise: -10.0,
        },
        wind_min_mph: 0.0,
        wind_max_mph: 8.0,
        light_sensitivity: 0.9,
        lunar_sensitivity: 0.9,
        deep_holding_ft: 18.0,
    },
    SpeciesProfile {
        key: "channel_catfish",
        name: "Channel Catfish",
        optimal_temp_f: 80.0,
        comfort_band_f: 7.0,
        temp_spread_f: 15.0,
        pressure: PressureResponse {
            rapid_fall: 10.0,
            falling: 8.0,
            stable: 4.0,
            rising: -2.0,
            rapid_rise: -8.0,
        },
        wind_min_mph: 0.0,
        wind_max_mph: 12.0,
        light_sensitivity: 0.8,
        lunar_sensitivity: 0.6,
        deep_holding_ft: 20.0,
    },
    SpeciesProfile {
        key: "rainbow_trout",
        name: "Rainbow Trout",
        optimal_temp_f: 56.0,
        comfort_band_f: 4.0,
        temp_spread_f: 9.0,
        pressure: PressureResponse {
            rapid_fall: 8.0,
            falling: 10.0,
            stable: 5.0,
            rising: -3.0,
            rapid_rise: -10.0,
        },
        wind_min_mph: 2.0,
        wind_max_mph: 12.0,
        light_sensitivity: 0.7,
        lunar_sensitivity: 0.3,
        deep_holding_ft: 25.0,
    },
];
