//! Snapshot fixtures shared by the integration tests

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fishcast_engine::{
    CurrentConditions, DailySeries, HistoricalSeries, HourlySeries, SnapshotMeta, WeatherSnapshot,
};

pub const ATLANTA: (f64, f64) = (33.75, -84.39);

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Daily-only snapshot: `air[i]` is the mean air temperature of the i-th day
/// ending on `end`, with constant wind.
pub fn daily_snapshot(end: NaiveDate, air: &[f64], wind_mean: f64, wind_max: f64) -> WeatherSnapshot {
    let n = air.len() as i64;
    WeatherSnapshot {
        daily: DailySeries {
            time: (0..n).map(|i| end - Duration::days(n - 1 - i)).collect(),
            temperature_mean_f: air.iter().map(|t| Some(*t)).collect(),
            temperature_max_f: air.iter().map(|t| Some(t + 8.0)).collect(),
            temperature_min_f: air.iter().map(|t| Some(t - 8.0)).collect(),
            wind_speed_mean_mph: vec![Some(wind_mean); air.len()],
            wind_speed_max_mph: vec![Some(wind_max); air.len()],
            cloud_cover_mean: vec![Some(40.0); air.len()],
            precipitation_sum_in: vec![Some(0.0); air.len()],
            ..Default::default()
        },
        meta: SnapshotMeta {
            timezone: "America/New_York".to_string(),
            utc_offset_seconds: -4 * 3600,
            now_hour_index: 0,
        },
        ..Default::default()
    }
}

/// Provider-shaped snapshot: three trailing historical days, `days` forecast
/// days with hourly detail, "now" at `now_hour` of the first forecast day.
pub fn provider_snapshot(first_day: NaiveDate, days: usize, now_hour: usize) -> WeatherSnapshot {
    let start: NaiveDateTime = first_day.and_hms_opt(0, 0, 0).unwrap();
    let hours = days * 24;
    let time: Vec<NaiveDateTime> = (0..hours as i64).map(|h| start + Duration::hours(h)).collect();
    let diurnal = |h: usize| 48.0 + 8.0 * ((h % 24) as f64 / 24.0 * std::f64::consts::TAU - 2.0).sin();

    let hourly = HourlySeries {
        temperature_f: (0..hours).map(|h| Some(diurnal(h))).collect(),
        pressure_hpa: (0..hours).map(|h| Some(1020.0 - 0.25 * h as f64)).collect(),
        wind_speed_mph: (0..hours).map(|h| Some(6.0 + (h % 5) as f64)).collect(),
        wind_direction_deg: vec![Some(200.0); hours],
        cloud_cover: (0..hours).map(|h| Some((h * 7 % 100) as f64)).collect(),
        precipitation_probability: (0..hours).map(|h| Some((h * 3 % 60) as f64)).collect(),
        weather_code: vec![Some(2); hours],
        time,
    };

    let daily_dates: Vec<NaiveDate> = (0..days as i64).map(|d| first_day + Duration::days(d)).collect();
    let daily = DailySeries {
        temperature_max_f: vec![Some(56.0); days],
        temperature_min_f: vec![Some(40.0); days],
        temperature_mean_f: vec![Some(48.0); days],
        pressure_mean_hpa: vec![Some(1015.0); days],
        wind_speed_mean_mph: vec![Some(8.0); days],
        wind_speed_max_mph: vec![Some(18.0); days],
        cloud_cover_mean: vec![Some(50.0); days],
        precipitation_sum_in: vec![Some(0.05); days],
        precipitation_probability_max: vec![Some(40.0); days],
        sunrise: daily_dates.iter().map(|d| d.and_hms_opt(7, 10, 0)).collect(),
        sunset: daily_dates.iter().map(|d| d.and_hms_opt(18, 20, 0)).collect(),
        weather_code: vec![Some(3); days],
        time: daily_dates,
    };

    let historical = HistoricalSeries {
        time: (1..=3).rev().map(|d| first_day - Duration::days(d)).collect(),
        temperature_mean_f: vec![Some(46.0), Some(47.0), Some(49.0)],
        wind_speed_mean_mph: vec![Some(7.0); 3],
        wind_speed_max_mph: vec![Some(15.0); 3],
        cloud_cover_mean: vec![Some(60.0); 3],
        precipitation_sum_in: vec![Some(0.0), Some(0.2), Some(0.0)],
    };

    WeatherSnapshot {
        current: CurrentConditions {
            temperature_f: Some(51.0),
            apparent_temperature_f: Some(49.0),
            pressure_hpa: Some(1016.0),
            wind_speed_mph: Some(9.0),
            wind_direction_deg: Some(210.0),
            wind_gust_mph: Some(17.0),
            cloud_cover: Some(45.0),
            relative_humidity: Some(70.0),
            weather_code: Some(2),
            precipitation_in: Some(0.0),
            is_day: Some(false),
        },
        hourly,
        daily,
        historical: Some(historical),
        meta: SnapshotMeta {
            timezone: "America/Chicago".to_string(),
            utc_offset_seconds: -6 * 3600,
            now_hour_index: now_hour,
        },
    }
}
