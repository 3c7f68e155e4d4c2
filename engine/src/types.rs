//! Common types and unit helpers used across the engine

use serde::{Deserialize, Serialize};

/// Location supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub name: String,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Location component of the stability key
    pub fn location_key(&self) -> String {
        location_key(self.latitude, self.longitude)
    }
}

/// `<lat.3f>_<lon.3f>`
pub fn location_key(latitude: f64, longitude: f64) -> String {
    format!("{:.3}_{:.3}", latitude, longitude)
}

/// Unit labels attached to every view-model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Units {
    pub temperature: String,
    pub wind: String,
    pub precipitation: String,
    pub pressure: String,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            temperature: "°F".to_string(),
            wind: "mph".to_string(),
            precipitation: "in".to_string(),
            pressure: "hPa".to_string(),
        }
    }
}

pub fn c_to_f(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn f_to_c(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh / 1.609_344
}

pub fn mph_to_kmh(mph: f64) -> f64 {
    mph * 1.609_344
}

pub fn hpa_to_inhg(hpa: f64) -> f64 {
    hpa * 0.029_53
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass label for a wind direction in degrees
pub fn wind_direction(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return "N";
    }
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

/// Human-readable description for a WMO weather code
pub fn weather_description(code: u8) -> &'static str {
    match code {
        0 => "Clear Sky",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Rime Fog",
        51 => "Light Drizzle",
        53 => "Moderate Drizzle",
        55 => "Dense Drizzle",
        61 => "Slight Rain",
        63 => "Moderate Rain",
        65 => "Heavy Rain",
        71 => "Slight Snow",
        73 => "Moderate Snow",
        75 => "Heavy Snow",
        80 => "Light Showers",
        81 => "Moderate Showers",
        82 => "Violent Showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with Hail",
        99 => "Severe Thunderstorm",
        _ => "Unknown",
    }
}

/// True for WMO codes that indicate a thunderstorm
pub fn is_thunderstorm(code: u8) -> bool {
    code >= 95
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_key_rounds_to_three_decimals() {
        assert_eq!(location_key(33.75, -84.39), "33.750_-84.390");
        assert_eq!(location_key(33.74949, -84.38951), "33.749_-84.390");
    }

    #[test]
    fn test_temperature_conversions() {
        assert!((c_to_f(0.0) - 32.0).abs() < 1e-9);
        assert!((c_to_f(100.0) - 212.0).abs() < 1e-9);
        assert!((f_to_c(c_to_f(21.5)) - 21.5).abs() < 1e-9);
    }

    #[test]
    fn test_wind_conversions() {
        assert!((kmh_to_mph(16.09344) - 10.0).abs() < 1e-9);
        assert!((mph_to_kmh(10.0) - 16.09344).abs() < 1e-9);
    }

    #[test]
    fn test_wind_direction() {
        assert_eq!(wind_direction(0.0), "N");
        assert_eq!(wind_direction(90.0), "E");
        assert_eq!(wind_direction(180.0), "S");
        assert_eq!(wind_direction(350.0), "N");
        assert_eq!(wind_direction(-90.0), "W");
        assert_eq!(wind_direction(f64::NAN), "N");
    }

    #[test]
    fn test_weather_description() {
        assert_eq!(weather_description(0), "Clear Sky");
        assert_eq!(weather_description(61), "Slight Rain");
        assert_eq!(weather_description(42), "Unknown");
        assert!(is_thunderstorm(95));
        assert!(!is_thunderstorm(82));
    }

    #[test]
    fn test_default_units_are_present() {
        let units = Units::default();
        assert!(!units.temperature.is_empty());
        assert!(!units.wind.is_empty());
        assert!(!units.precipitation.is_empty());
    }
}
