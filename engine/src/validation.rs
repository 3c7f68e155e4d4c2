//! Validation utilities for snapshots and caller input

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::WeatherSnapshot;

// ============================================================================
// Snapshot Validations
// ============================================================================

/// Every hourly series must share the length of `hourly.time`
pub fn validate_hourly_alignment(snapshot: &WeatherSnapshot) -> Result<(), &'static str> {
    let hourly = &snapshot.hourly;
    let len = hourly.time.len();
    let lengths = [
        hourly.temperature_f.len(),
        hourly.pressure_hpa.len(),
        hourly.wind_speed_mph.len(),
        hourly.wind_direction_deg.len(),
        hourly.cloud_cover.len(),
        hourly.precipitation_probability.len(),
        hourly.weather_code.len(),
    ];
    if lengths.iter().any(|&l| l != len) {
        return Err("Hourly series must all have the same length");
    }
    if hourly.time.windows(2).any(|w| w[0] >= w[1]) {
        return Err("Hourly timestamps must be strictly increasing");
    }
    Ok(())
}

/// `meta.nowHourIndex` must point into the hourly series
pub fn validate_now_index(snapshot: &WeatherSnapshot) -> Result<(), &'static str> {
    if snapshot.meta.now_hour_index >= snapshot.hourly.len() {
        return Err("nowHourIndex is outside the hourly series");
    }
    Ok(())
}

/// `meta.timezone` must be a provider zone name
pub fn validate_timezone(snapshot: &WeatherSnapshot) -> Result<(), &'static str> {
    let zone = snapshot.meta.timezone.trim();
    if zone.is_empty() {
        return Err("Snapshot timezone is missing");
    }
    if zone.chars().any(char::is_whitespace) {
        return Err("Snapshot timezone is not a zone name");
    }
    Ok(())
}

/// All snapshot invariants, as an engine error
pub fn validate_snapshot(snapshot: &WeatherSnapshot) -> EngineResult<()> {
    validate_hourly_alignment(snapshot)
        .and_then(|_| validate_now_index(snapshot))
        .and_then(|_| validate_timezone(snapshot))
        .map_err(EngineError::InvalidSnapshot)
}

// ============================================================================
// General Validations
// ============================================================================

/// Latitude in [-90, 90] and longitude in [-180, 180]
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), &'static str> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90");
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` date key
pub fn parse_date_key(value: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn snapshot(hours: usize) -> WeatherSnapshot {
        let start = NaiveDateTime::parse_from_str("2026-02-15T00:00", "%Y-%m-%dT%H:%M").unwrap();
        let mut snapshot = WeatherSnapshot::default();
        snapshot.hourly.time = (0..hours)
            .map(|h| start + chrono::Duration::hours(h as i64))
            .collect();
        snapshot.hourly.temperature_f = vec![Some(50.0); hours];
        snapshot.hourly.pressure_hpa = vec![Some(1015.0); hours];
        snapshot.hourly.wind_speed_mph = vec![Some(6.0); hours];
        snapshot.hourly.wind_direction_deg = vec![Some(180.0); hours];
        snapshot.hourly.cloud_cover = vec![Some(40.0); hours];
        snapshot.hourly.precipitation_probability = vec![Some(10.0); hours];
        snapshot.hourly.weather_code = vec![Some(2); hours];
        snapshot.meta.timezone = "America/Chicago".to_string();
        snapshot.meta.now_hour_index = 18;
        snapshot
    }

    #[test]
    fn test_valid_snapshot() {
        assert!(validate_snapshot(&snapshot(48)).is_ok());
    }

    #[test]
    fn test_misaligned_series() {
        let mut s = snapshot(48);
        s.hourly.cloud_cover.pop();
        assert_eq!(
            validate_snapshot(&s),
            Err(EngineError::InvalidSnapshot("Hourly series must all have the same length"))
        );
    }

    #[test]
    fn test_now_index_out_of_range() {
        let mut s = snapshot(12);
        s.meta.now_hour_index = 12;
        assert!(validate_now_index(&s).is_err());
    }

    #[test]
    fn test_missing_timezone() {
        let mut s = snapshot(24);
        s.meta.timezone = "  ".to_string();
        assert!(validate_timezone(&s).is_err());
    }

    #[test]
    fn test_coordinates() {
        assert!(validate_coordinates(33.75, -84.39).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_parse_date_key() {
        assert_eq!(
            parse_date_key("2026-05-11"),
            Ok(NaiveDate::from_ymd_opt(2026, 5, 11).unwrap())
        );
        assert!(matches!(parse_date_key("11/05/2026"), Err(EngineError::InvalidDate(_))));
    }
}
