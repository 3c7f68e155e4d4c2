//! Weather snapshot models
//!
//! A snapshot is exactly what the provider returned for one location: the
//! instantaneous `current` block, index-aligned `hourly` series, per-day
//! `daily` aggregates, optional trailing `historical` days and `meta`.
//! Units are °F, mph, hPa and inches throughout. Every value is optional;
//! [`crate::conditions`] resolves gaps before any component runs.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Complete provider snapshot for one location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    #[serde(default)]
    pub current: CurrentConditions,
    #[serde(default)]
    pub hourly: HourlySeries,
    #[serde(default)]
    pub daily: DailySeries,
    #[serde(default)]
    pub historical: Option<HistoricalSeries>,
    #[serde(default)]
    pub meta: SnapshotMeta,
}

/// Instantaneous conditions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentConditions {
    pub temperature_f: Option<f64>,
    pub apparent_temperature_f: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub wind_speed_mph: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub wind_gust_mph: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub weather_code: Option<u8>,
    pub precipitation_in: Option<f64>,
    pub is_day: Option<bool>,
}

/// Hourly series; all vectors share the index space of `time`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HourlySeries {
    /// Wall-clock timestamps in the provider timezone
    pub time: Vec<NaiveDateTime>,
    pub temperature_f: Vec<Option<f64>>,
    pub pressure_hpa: Vec<Option<f64>>,
    pub wind_speed_mph: Vec<Option<f64>>,
    pub wind_direction_deg: Vec<Option<f64>>,
    pub cloud_cover: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub weather_code: Vec<Option<u8>>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Indices whose timestamp falls on `day`
    pub fn indices_for_day(&self, day: NaiveDate) -> Vec<usize> {
        self.time
            .iter()
            .enumerate()
            .filter(|(_, t)| t.date() == day)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Per-day aggregates; all vectors share the index space of `time`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailySeries {
    pub time: Vec<NaiveDate>,
    pub temperature_max_f: Vec<Option<f64>>,
    pub temperature_min_f: Vec<Option<f64>>,
    pub temperature_mean_f: Vec<Option<f64>>,
    pub pressure_mean_hpa: Vec<Option<f64>>,
    pub wind_speed_mean_mph: Vec<Option<f64>>,
    pub wind_speed_max_mph: Vec<Option<f64>>,
    pub cloud_cover_mean: Vec<Option<f64>>,
    pub precipitation_sum_in: Vec<Option<f64>>,
    pub precipitation_probability_max: Vec<Option<f64>>,
    pub sunrise: Vec<Option<NaiveDateTime>>,
    pub sunset: Vec<Option<NaiveDateTime>>,
    pub weather_code: Vec<Option<u8>>,
}

impl DailySeries {
    pub fn index_of(&self, day: NaiveDate) -> Option<usize> {
        self.time.iter().position(|d| *d == day)
    }
}

/// Trailing observed days before the forecast window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoricalSeries {
    pub time: Vec<NaiveDate>,
    pub temperature_mean_f: Vec<Option<f64>>,
    pub wind_speed_mean_mph: Vec<Option<f64>>,
    pub wind_speed_max_mph: Vec<Option<f64>>,
    pub cloud_cover_mean: Vec<Option<f64>>,
    pub precipitation_sum_in: Vec<Option<f64>>,
}

/// Provider metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotMeta {
    /// IANA zone name reported by the provider
    pub timezone: String,
    /// Offset of `timezone` from UTC at fetch time
    pub utc_offset_seconds: i32,
    /// Index into `hourly` representing "now" in `timezone`
    pub now_hour_index: usize,
}

/// Value at `index`, treating absent and non-finite entries as missing
pub fn value_at(series: &[Option<f64>], index: usize) -> Option<f64> {
    series
        .get(index)
        .copied()
        .flatten()
        .filter(|v| v.is_finite())
}

/// Mean of the present, finite values at `indices`
pub fn mean_at(series: &[Option<f64>], indices: &[usize]) -> Option<f64> {
    let values: Vec<f64> = indices.iter().filter_map(|&i| value_at(series, i)).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
