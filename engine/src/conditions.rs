//! Field resolution with defaults
//!
//! Every optional snapshot field is resolved here, once, through a fixed
//! fallback chain (hourly -> daily -> prior day -> current -> neutral
//! default). Components downstream only ever see plain finite numbers.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{mean_at, value_at, StabilityInputs, WeatherSnapshot};
use crate::pressure::{get_pressure_rate, PressureRate};
use crate::types::mph_to_kmh;

pub const DEFAULT_PRESSURE_HPA: f64 = 1013.25;
pub const DEFAULT_WIND_MPH: f64 = 5.0;
pub const DEFAULT_CLOUD_COVER: f64 = 50.0;
pub const DEFAULT_PRECIP_PROBABILITY: f64 = 0.0;
pub const DEFAULT_AIR_TEMP_F: f64 = 60.0;

/// Hours of pressure readings used for a trend
pub const PRESSURE_WINDOW_HOURS: usize = 6;

/// Days of air forcing fed to the water temperature model
pub const FORCING_DAYS: usize = 7;

/// Fully resolved inputs to the score calculator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConditions {
    pub air_temp_f: f64,
    pub pressure_hpa: f64,
    pub pressure: PressureRate,
    pub wind_mph: f64,
    pub wind_max_mph: f64,
    pub wind_direction_deg: f64,
    pub cloud_cover: f64,
    pub precip_probability: f64,
    pub weather_code: u8,
}

/// Resolved aggregates for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayConditions {
    pub date: NaiveDate,
    pub conditions: ScoringConditions,
    pub temp_mean_f: f64,
    pub temp_min_f: f64,
    pub temp_max_f: f64,
    pub precip_sum_in: f64,
}

impl DayConditions {
    /// Inputs tracked by the stability controller
    pub fn stability_inputs(&self, water_temp_f: f64) -> StabilityInputs {
        StabilityInputs {
            pressure_avg: self.conditions.pressure_hpa,
            wind_avg_kmh: mph_to_kmh(self.conditions.wind_mph),
            precip_prob_avg: self.conditions.precip_probability,
            cloud_avg: self.conditions.cloud_cover,
            temp_avg_f: self.temp_mean_f,
            water_temp_f,
        }
    }
}

/// One day of forcing for the water temperature model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyForcing {
    pub date: Option<NaiveDate>,
    pub air_mean_f: f64,
    pub wind_mean_mph: f64,
    pub wind_max_mph: f64,
    pub cloud_cover: f64,
    pub precip_in: f64,
}

fn first_finite(candidates: &[Option<f64>]) -> Option<f64> {
    candidates.iter().copied().flatten().find(|v| v.is_finite())
}

/// Daily value at `index`, falling back to the prior day
fn daily_or_previous(series: &[Option<f64>], index: usize) -> Option<f64> {
    value_at(series, index).or_else(|| index.checked_sub(1).and_then(|i| value_at(series, i)))
}

/// `meta.nowHourIndex` clamped into the hourly index space
pub fn now_index(snapshot: &WeatherSnapshot) -> Option<usize> {
    let len = snapshot.hourly.len();
    if len == 0 {
        None
    } else {
        Some(snapshot.meta.now_hour_index.min(len - 1))
    }
}

/// Calendar day of "now" in the provider timezone
pub fn today(snapshot: &WeatherSnapshot) -> Option<NaiveDate> {
    now_index(snapshot)
        .map(|i| snapshot.hourly.time[i].date())
        .or_else(|| snapshot.daily.time.first().copied())
}

fn pressure_window(snapshot: &WeatherSnapshot, indices: &[usize]) -> PressureRate {
    let readings: Vec<f64> = indices
        .iter()
        .filter_map(|&i| value_at(&snapshot.hourly.pressure_hpa, i))
        .collect();
    get_pressure_rate(&readings)
}

/// Trend over the next hours from "now", or the trailing hours near the end
fn pressure_from(snapshot: &WeatherSnapshot, start: usize) -> PressureRate {
    let len = snapshot.hourly.len();
    let end = (start + PRESSURE_WINDOW_HOURS).min(len);
    let begin = if end - start < 2 {
        end.saturating_sub(PRESSURE_WINDOW_HOURS)
    } else {
        start
    };
    let indices: Vec<usize> = (begin..end).collect();
    pressure_window(snapshot, &indices)
}

/// Conditions at "now"
pub fn resolve_current(snapshot: &WeatherSnapshot) -> ScoringConditions {
    let current = &snapshot.current;
    let hourly = &snapshot.hourly;
    let daily = &snapshot.daily;
    let now = now_index(snapshot);
    let day = today(snapshot).and_then(|d| daily.index_of(d)).unwrap_or(0);
    let at_now = |series: &[Option<f64>]| now.and_then(|i| value_at(series, i));

    let wind_mph = first_finite(&[
        current.wind_speed_mph,
        at_now(&hourly.wind_speed_mph),
        daily_or_previous(&daily.wind_speed_mean_mph, day),
    ])
    .unwrap_or(DEFAULT_WIND_MPH)
    .max(0.0);

    ScoringConditions {
        air_temp_f: first_finite(&[
            current.temperature_f,
            at_now(&hourly.temperature_f),
            daily_or_previous(&daily.temperature_mean_f, day),
        ])
        .unwrap_or(DEFAULT_AIR_TEMP_F),
        pressure_hpa: first_finite(&[
            current.pressure_hpa,
            at_now(&hourly.pressure_hpa),
            daily_or_previous(&daily.pressure_mean_hpa, day),
        ])
        .unwrap_or(DEFAULT_PRESSURE_HPA),
        pressure: now.map(|i| pressure_from(snapshot, i)).unwrap_or_default(),
        wind_mph,
        wind_max_mph: first_finite(&[
            current.wind_gust_mph,
            daily_or_previous(&daily.wind_speed_max_mph, day),
        ])
        .unwrap_or(wind_mph)
        .max(wind_mph),
        wind_direction_deg: first_finite(&[
            current.wind_direction_deg,
            at_now(&hourly.wind_direction_deg),
        ])
        .unwrap_or(0.0),
        cloud_cover: first_finite(&[
            current.cloud_cover,
            at_now(&hourly.cloud_cover),
            daily_or_previous(&daily.cloud_cover_mean, day),
        ])
        .unwrap_or(DEFAULT_CLOUD_COVER)
        .clamp(0.0, 100.0),
        precip_probability: first_finite(&[
            at_now(&hourly.precipitation_probability),
            daily_or_previous(&daily.precipitation_probability_max, day),
        ])
        .unwrap_or(DEFAULT_PRECIP_PROBABILITY)
        .clamp(0.0, 100.0),
        weather_code: current
            .weather_code
            .or_else(|| now.and_then(|i| hourly.weather_code.get(i).copied().flatten()))
            .unwrap_or(0),
    }
}

/// Aggregated conditions for `day`
pub fn resolve_day(snapshot: &WeatherSnapshot, day: NaiveDate) -> DayConditions {
    let hourly = &snapshot.hourly;
    let daily = &snapshot.daily;
    let current = resolve_current(snapshot);
    let hours = hourly.indices_for_day(day);
    let index = daily.index_of(day);
    let at_day = |series: &[Option<f64>]| index.and_then(|i| daily_or_previous(series, i));

    let pressure = match now_index(snapshot) {
        Some(now) if today(snapshot) == Some(day) => pressure_from(snapshot, now),
        _ if hours.len() >= 2 => pressure_window(snapshot, &hours),
        _ => current.pressure,
    };

    let temp_max_f = first_finite(&[
        at_day(&daily.temperature_max_f),
        hours
            .iter()
            .filter_map(|&i| value_at(&hourly.temperature_f, i))
            .reduce(f64::max),
    ]);
    let temp_min_f = first_finite(&[
        at_day(&daily.temperature_min_f),
        hours
            .iter()
            .filter_map(|&i| value_at(&hourly.temperature_f, i))
            .reduce(f64::min),
    ]);
    let midrange = match (temp_max_f, temp_min_f) {
        (Some(hi), Some(lo)) => Some((hi + lo) / 2.0),
        _ => None,
    };
    let temp_mean_f = first_finite(&[
        at_day(&daily.temperature_mean_f),
        midrange,
        mean_at(&hourly.temperature_f, &hours),
    ])
    .unwrap_or(current.air_temp_f);

    let wind_mph = first_finite(&[
        mean_at(&hourly.wind_speed_mph, &hours),
        at_day(&daily.wind_speed_mean_mph),
    ])
    .unwrap_or(current.wind_mph)
    .max(0.0);

    let conditions = ScoringConditions {
        air_temp_f: temp_mean_f,
        pressure_hpa: first_finite(&[
            mean_at(&hourly.pressure_hpa, &hours),
            at_day(&daily.pressure_mean_hpa),
        ])
        .unwrap_or(current.pressure_hpa),
        pressure,
        wind_mph,
        wind_max_mph: first_finite(&[at_day(&daily.wind_speed_max_mph)])
            .unwrap_or(current.wind_max_mph)
            .max(wind_mph),
        wind_direction_deg: mean_at(&hourly.wind_direction_deg, &hours)
            .unwrap_or(current.wind_direction_deg),
        cloud_cover: first_finite(&[
            mean_at(&hourly.cloud_cover, &hours),
            at_day(&daily.cloud_cover_mean),
        ])
        .unwrap_or(current.cloud_cover)
        .clamp(0.0, 100.0),
        precip_probability: first_finite(&[
            mean_at(&hourly.precipitation_probability, &hours),
            at_day(&daily.precipitation_probability_max),
        ])
        .unwrap_or(current.precip_probability)
        .clamp(0.0, 100.0),
        weather_code: index
            .and_then(|i| daily.weather_code.get(i).copied().flatten())
            .unwrap_or(current.weather_code),
    };

    DayConditions {
        date: day,
        conditions,
        temp_mean_f,
        temp_min_f: temp_min_f.unwrap_or(temp_mean_f),
        temp_max_f: temp_max_f.unwrap_or(temp_mean_f),
        precip_sum_in: at_day(&daily.precipitation_sum_in).unwrap_or(0.0).max(0.0),
    }
}

/// Forcing for the [`FORCING_DAYS`] days ending at `target`, oldest first.
///
/// Forecast days take precedence over historical days with the same date.
/// When no dated day is available the current conditions stand in for a
/// single day.
pub fn forcing_history(snapshot: &WeatherSnapshot, target: NaiveDate) -> Vec<DailyForcing> {
    let current = resolve_current(snapshot);
    let mut by_date: BTreeMap<NaiveDate, DailyForcing> = BTreeMap::new();

    if let Some(historical) = &snapshot.historical {
        for (i, date) in historical.time.iter().enumerate() {
            let Some(air) = value_at(&historical.temperature_mean_f, i) else {
                continue;
            };
            let wind_mean = value_at(&historical.wind_speed_mean_mph, i).unwrap_or(current.wind_mph);
            by_date.insert(
                *date,
                DailyForcing {
                    date: Some(*date),
                    air_mean_f: air,
                    wind_mean_mph: wind_mean,
                    wind_max_mph: value_at(&historical.wind_speed_max_mph, i)
                        .unwrap_or(wind_mean)
                        .max(wind_mean),
                    cloud_cover: value_at(&historical.cloud_cover_mean, i)
                        .unwrap_or(current.cloud_cover),
                    precip_in: value_at(&historical.precipitation_sum_in, i).unwrap_or(0.0),
                },
            );
        }
    }

    let daily = &snapshot.daily;
    for (i, date) in daily.time.iter().enumerate() {
        let hours = snapshot.hourly.indices_for_day(*date);
        let midrange = match (
            value_at(&daily.temperature_max_f, i),
            value_at(&daily.temperature_min_f, i),
        ) {
            (Some(hi), Some(lo)) => Some((hi + lo) / 2.0),
            _ => None,
        };
        let Some(air) = first_finite(&[
            value_at(&daily.temperature_mean_f, i),
            midrange,
            mean_at(&snapshot.hourly.temperature_f, &hours),
        ]) else {
            continue;
        };
        let wind_mean = first_finite(&[
            value_at(&daily.wind_speed_mean_mph, i),
            mean_at(&snapshot.hourly.wind_speed_mph, &hours),
        ])
        .unwrap_or(current.wind_mph);
        by_date.insert(
            *date,
            DailyForcing {
                date: Some(*date),
                air_mean_f: air,
                wind_mean_mph: wind_mean,
                wind_max_mph: value_at(&daily.wind_speed_max_mph, i)
                    .unwrap_or(wind_mean)
                    .max(wind_mean),
                cloud_cover: first_finite(&[
                    value_at(&daily.cloud_cover_mean, i),
                    mean_at(&snapshot.hourly.cloud_cover, &hours),
                ])
                .unwrap_or(current.cloud_cover),
                precip_in: value_at(&daily.precipitation_sum_in, i).unwrap_or(0.0),
            },
        );
    }

    let mut history: Vec<DailyForcing> = by_date
        .into_iter()
        .filter(|(date, _)| *date <= target && (target - *date).num_days() < FORCING_DAYS as i64)
        .map(|(_, forcing)| forcing)
        .collect();
    if history.len() > FORCING_DAYS {
        history.drain(..history.len() - FORCING_DAYS);
    }

    if history.is_empty() {
        tracing::debug!(date = %target, "no dated forcing available, using current conditions");
        history.push(DailyForcing {
            date: None,
            air_mean_f: current.air_temp_f,
            wind_mean_mph: current.wind_mph,
            wind_max_mph: current.wind_max_mph,
            cloud_cover: current.cloud_cover,
            precip_in: 0.0,
        });
    }

    history
}
