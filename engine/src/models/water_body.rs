//! Water body thermal profiles

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;

/// Kind of water being fished
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum WaterBodyType {
    /// Up to about 5 acres
    Pond,
    #[default]
    Lake,
    Reservoir,
}

impl WaterBodyType {
    pub const ALL: [WaterBodyType; 3] = [
        WaterBodyType::Pond,
        WaterBodyType::Lake,
        WaterBodyType::Reservoir,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            WaterBodyType::Pond => "pond",
            WaterBodyType::Lake => "lake",
            WaterBodyType::Reservoir => "reservoir",
        }
    }

    pub fn profile(&self) -> &'static WaterBodyProfile {
        match self {
            WaterBodyType::Pond => &POND,
            WaterBodyType::Lake => &LAKE,
            WaterBodyType::Reservoir => &RESERVOIR,
        }
    }
}

impl std::fmt::Display for WaterBodyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for WaterBodyType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pond" => Ok(WaterBodyType::Pond),
            "lake" => Ok(WaterBodyType::Lake),
            "reservoir" => Ok(WaterBodyType::Reservoir),
            other => Err(EngineError::UnknownWaterBody(other.to_string())),
        }
    }
}

/// Thermal constants for one water body type
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WaterBodyProfile {
    /// Days for the surface to respond to an air-temperature step
    pub thermal_lag_days: f64,
    /// Fraction of a day's forcing absorbed per day
    pub thermal_inertia_base: f64,
    /// Days the seasonal water peak trails the solstice
    pub seasonal_lag_days: f64,
    /// Seasonal swing either side of the annual mean, °F
    pub annual_amplitude: f64,
    /// Feet
    pub thermocline_depth: f64,
    /// Hard cap on surface change, °F per day
    pub max_daily_change: f64,
    /// Bottom-water asymptote, °F
    pub deep_stable_temp: f64,
    /// Mean wind (mph) above which layering starts to break down
    pub mixing_wind_threshold: f64,
}

static POND: WaterBodyProfile = WaterBodyProfile {
    thermal_lag_days: 6.0,
    thermal_inertia_base: 0.13,
    seasonal_lag_days: 12.0,
    annual_amplitude: 22.0,
    thermocline_depth: 9.0,
    max_daily_change: 2.5,
    deep_stable_temp: 54.0,
    mixing_wind_threshold: 6.0,
};

static LAKE: WaterBodyProfile = WaterBodyProfile {
    thermal_lag_days: 9.0,
    thermal_inertia_base: 0.09,
    seasonal_lag_days: 22.0,
    annual_amplitude: 21.0,
    thermocline_depth: 13.0,
    max_daily_change: 2.2,
    deep_stable_temp: 52.0,
    mixing_wind_threshold: 7.0,
};

static RESERVOIR: WaterBodyProfile = WaterBodyProfile {
    thermal_lag_days: 14.0,
    thermal_inertia_base: 0.05,
    seasonal_lag_days: 35.0,
    annual_amplitude: 18.0,
    thermocline_depth: 25.0,
    max_daily_change: 1.5,
    deep_stable_temp: 45.0,
    mixing_wind_threshold: 10.0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_water_body() {
        assert_eq!("pond".parse::<WaterBodyType>().unwrap(), WaterBodyType::Pond);
        assert_eq!(" Lake ".parse::<WaterBodyType>().unwrap(), WaterBodyType::Lake);
        assert_eq!(
            "RESERVOIR".parse::<WaterBodyType>().unwrap(),
            WaterBodyType::Reservoir
        );
        assert_eq!(
            "ocean".parse::<WaterBodyType>(),
            Err(EngineError::UnknownWaterBody("ocean".to_string()))
        );
    }

    #[test]
    fn test_larger_water_responds_slower() {
        let pond = WaterBodyType::Pond.profile();
        let lake = WaterBodyType::Lake.profile();
        let reservoir = WaterBodyType::Reservoir.profile();

        assert!(pond.thermal_inertia_base > lake.thermal_inertia_base);
        assert!(lake.thermal_inertia_base > reservoir.thermal_inertia_base);
        assert!(pond.max_daily_change > reservoir.max_daily_change);
        assert!(pond.thermocline_depth < reservoir.thermocline_depth);
    }
}
