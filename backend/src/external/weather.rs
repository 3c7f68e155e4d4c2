//! Open-Meteo client for forecast and trailing-history snapshots
//!
//! Both requests ask for °F, mph, inches and `timezone=auto`, so the provider
//! reports wall-clock times in the location's own zone. The zone name and
//! offset are copied from the response into the snapshot meta, and "now" is
//! aligned against the hourly series using that offset, never the host zone.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use fishcast_engine::{
    CurrentConditions, DailySeries, HistoricalSeries, HourlySeries, SnapshotMeta, WeatherSnapshot,
};
use reqwest::Client;
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

const UNIT_PARAMS: &str =
    "temperature_unit=fahrenheit&wind_speed_unit=mph&precipitation_unit=inch&timezone=auto";

const CURRENT_FIELDS: &str = "temperature_2m,apparent_temperature,relative_humidity_2m,is_day,\
precipitation,weather_code,cloud_cover,surface_pressure,wind_speed_10m,wind_direction_10m,\
wind_gusts_10m";

const HOURLY_FIELDS: &str = "temperature_2m,surface_pressure,wind_speed_10m,wind_direction_10m,\
cloud_cover,precipitation_probability,weather_code";

const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,\
temperature_2m_mean,surface_pressure_mean,wind_speed_10m_mean,wind_speed_10m_max,\
cloud_cover_mean,precipitation_sum,precipitation_probability_max,sunrise,sunset";

const HISTORY_DAILY_FIELDS: &str = "temperature_2m_mean,wind_speed_10m_mean,wind_speed_10m_max,\
cloud_cover_mean,precipitation_sum";

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    history_days: u32,
}

/// Forecast request URL for `days` days of current, hourly and daily data
pub fn forecast_url(base_url: &str, latitude: f64, longitude: f64, days: u32) -> String {
    format!(
        "{}?latitude={:.4}&longitude={:.4}&current={}&hourly={}&daily={}&forecast_days={}&{}",
        base_url, latitude, longitude, CURRENT_FIELDS, HOURLY_FIELDS, DAILY_FIELDS, days, UNIT_PARAMS
    )
}

/// Daily-only request URL for the `past_days` days before today
pub fn history_url(base_url: &str, latitude: f64, longitude: f64, past_days: u32) -> String {
    format!(
        "{}?latitude={:.4}&longitude={:.4}&daily={}&past_days={}&forecast_days=1&{}",
        base_url, latitude, longitude, HISTORY_DAILY_FIELDS, past_days, UNIT_PARAMS
    )
}

/// Index of the hourly slot containing `now` in the provider's local time.
///
/// `times` are provider wall-clock times at `utc_offset_seconds`. Falls back
/// to the first slot when `now` precedes the series and to the last one when
/// it runs past the end.
pub fn now_hour_index(times: &[NaiveDateTime], utc_offset_seconds: i32, now: DateTime<Utc>) -> usize {
    let local_now = now.naive_utc() + Duration::seconds(i64::from(utc_offset_seconds));
    times
        .iter()
        .rposition(|t| *t <= local_now)
        .unwrap_or(0)
}

/// Open-Meteo response; every block is optional so history and forecast
/// share one shape
#[derive(Debug, Default, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    utc_offset_seconds: Option<i32>,
    #[serde(default)]
    current: Option<OMCurrent>,
    #[serde(default)]
    hourly: Option<OMHourly>,
    #[serde(default)]
    daily: Option<OMDaily>,
}

#[derive(Debug, Default, Deserialize)]
struct OMCurrent {
    temperature_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    relative_humidity_2m: Option<f64>,
    is_day: Option<u8>,
    precipitation: Option<f64>,
    weather_code: Option<u8>,
    cloud_cover: Option<f64>,
    surface_pressure: Option<f64>,
    pressure_msl: Option<f64>,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
    wind_gusts_10m: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OMHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    surface_pressure: Vec<Option<f64>>,
    pressure_msl: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
    wind_direction_10m: Vec<Option<f64>>,
    cloud_cover: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<f64>>,
    weather_code: Vec<Option<u8>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OMDaily {
    time: Vec<String>,
    weather_code: Vec<Option<u8>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    temperature_2m_mean: Vec<Option<f64>>,
    surface_pressure_mean: Vec<Option<f64>>,
    wind_speed_10m_mean: Vec<Option<f64>>,
    wind_speed_10m_max: Vec<Option<f64>>,
    cloud_cover_mean: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
    sunrise: Vec<Option<String>>,
    sunset: Vec<Option<String>>,
}

impl WeatherClient {
    /// Create a new WeatherClient from the provider settings
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.forecast_url.clone(),
            history_days: config.history_days,
        })
    }

    /// Fetch trailing history and forecast, merged into one snapshot.
    ///
    /// A failed history request only degrades the water temperature model, so
    /// it is logged and skipped. A failed forecast request is an error.
    pub async fn fetch_snapshot(
        &self,
        latitude: f64,
        longitude: f64,
        days: u32,
    ) -> AppResult<WeatherSnapshot> {
        let history = match self
            .get_json(&history_url(&self.base_url, latitude, longitude, self.history_days))
            .await
        {
            Ok(history) => Some(history),
            Err(e) => {
                tracing::warn!(error = %e, "history request failed, continuing without it");
                None
            }
        };
        let forecast = self
            .get_json(&forecast_url(&self.base_url, latitude, longitude, days))
            .await?;

        convert_response(forecast, history, Utc::now())
    }

    async fn get_json(&self, url: &str) -> AppResult<OpenMeteoResponse> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                tracing::warn!(error = %e, "weather provider unreachable");
                AppError::WeatherServiceUnavailable
            } else {
                AppError::ExternalService(format!("Weather API request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse weather response: {}", e)))
    }
}

/// Provider wall-clock time, with or without seconds or an explicit offset
fn parse_local_time(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").ok())
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok())
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    value
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

/// Pads with `None` or truncates so the series lines up with its time axis
fn align<T>(mut values: Vec<Option<T>>, len: usize) -> Vec<Option<T>> {
    values.resize_with(len, || None);
    values
}

fn convert_response(
    forecast: OpenMeteoResponse,
    history: Option<OpenMeteoResponse>,
    now: DateTime<Utc>,
) -> AppResult<WeatherSnapshot> {
    let timezone = forecast
        .timezone
        .filter(|tz| !tz.trim().is_empty())
        .ok_or_else(|| AppError::ExternalService("provider response has no timezone".into()))?;
    let utc_offset_seconds = forecast.utc_offset_seconds.unwrap_or(0);

    let hourly = convert_hourly(forecast.hourly.unwrap_or_default())?;
    let daily = convert_daily(forecast.daily.unwrap_or_default())?;
    let historical = history
        .and_then(|h| h.daily)
        .and_then(|d| convert_history(d, daily.time.first().copied()));

    let now_index = now_hour_index(&hourly.time, utc_offset_seconds, now);
    tracing::debug!(
        timezone = %timezone,
        utc_offset_seconds,
        now_hour_index = now_index,
        hours = hourly.time.len(),
        "converted provider snapshot"
    );

    Ok(WeatherSnapshot {
        current: convert_current(forecast.current.unwrap_or_default()),
        hourly,
        daily,
        historical,
        meta: SnapshotMeta {
            timezone,
            utc_offset_seconds,
            now_hour_index: now_index,
        },
    })
}

fn convert_current(current: OMCurrent) -> CurrentConditions {
    CurrentConditions {
        temperature_f: current.temperature_2m,
        apparent_temperature_f: current.apparent_temperature,
        pressure_hpa: current.surface_pressure.or(current.pressure_msl),
        wind_speed_mph: current.wind_speed_10m,
        wind_direction_deg: current.wind_direction_10m,
        wind_gust_mph: current.wind_gusts_10m,
        cloud_cover: current.cloud_cover,
        relative_humidity: current.relative_humidity_2m,
        weather_code: current.weather_code,
        precipitation_in: current.precipitation,
        is_day: current.is_day.map(|flag| flag != 0),
    }
}

fn convert_hourly(hourly: OMHourly) -> AppResult<HourlySeries> {
    let time = hourly
        .time
        .iter()
        .map(|t| parse_local_time(t))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| AppError::ExternalService("unparseable hourly time".into()))?;
    let len = time.len();

    let pressure = if hourly.surface_pressure.iter().any(Option::is_some) {
        hourly.surface_pressure
    } else {
        hourly.pressure_msl
    };

    Ok(HourlySeries {
        temperature_f: align(hourly.temperature_2m, len),
        pressure_hpa: align(pressure, len),
        wind_speed_mph: align(hourly.wind_speed_10m, len),
        wind_direction_deg: align(hourly.wind_direction_10m, len),
        cloud_cover: align(hourly.cloud_cover, len),
        precipitation_probability: align(hourly.precipitation_probability, len),
        weather_code: align(hourly.weather_code, len),
        time,
    })
}

fn convert_daily(daily: OMDaily) -> AppResult<DailySeries> {
    let time = daily
        .time
        .iter()
        .map(|d| parse_day(d))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| AppError::ExternalService("unparseable daily date".into()))?;
    let len = time.len();
    let clock = |values: Vec<Option<String>>| {
        align(
            values
                .into_iter()
                .map(|v| v.as_deref().and_then(parse_local_time))
                .collect(),
            len,
        )
    };

    Ok(DailySeries {
        temperature_max_f: align(daily.temperature_2m_max, len),
        temperature_min_f: align(daily.temperature_2m_min, len),
        temperature_mean_f: align(daily.temperature_2m_mean, len),
        pressure_mean_hpa: align(daily.surface_pressure_mean, len),
        wind_speed_mean_mph: align(daily.wind_speed_10m_mean, len),
        wind_speed_max_mph: align(daily.wind_speed_10m_max, len),
        cloud_cover_mean: align(daily.cloud_cover_mean, len),
        precipitation_sum_in: align(daily.precipitation_sum, len),
        precipitation_probability_max: align(daily.precipitation_probability_max, len),
        sunrise: clock(daily.sunrise),
        sunset: clock(daily.sunset),
        weather_code: align(daily.weather_code, len),
        time,
    })
}

/// Keeps only days before the first forecast day. A response without dates
/// is read as consecutive days ending the day before `first_forecast_day`.
fn convert_history(daily: OMDaily, first_forecast_day: Option<NaiveDate>) -> Option<HistoricalSeries> {
    let rows = daily
        .temperature_2m_mean
        .len()
        .max(daily.time.len());
    if rows == 0 {
        return None;
    }

    let dates: Vec<Option<NaiveDate>> = if daily.time.is_empty() {
        let end = first_forecast_day? - Duration::days(1);
        (0..rows)
            .map(|i| Some(end - Duration::days((rows - 1 - i) as i64)))
            .collect()
    } else {
        daily.time.iter().map(|d| parse_day(d)).collect()
    };

    let series = [
        align(daily.temperature_2m_mean, rows),
        align(daily.wind_speed_10m_mean, rows),
        align(daily.wind_speed_10m_max, rows),
        align(daily.cloud_cover_mean, rows),
        align(daily.precipitation_sum, rows),
    ];

    let mut history = HistoricalSeries::default();
    for (i, date) in dates.into_iter().enumerate() {
        let Some(date) = date else { continue };
        if first_forecast_day.is_some_and(|first| date >= first) {
            continue;
        }
        history.time.push(date);
        history.temperature_mean_f.push(series[0][i]);
        history.wind_speed_mean_mph.push(series[1][i]);
        history.wind_speed_max_mph.push(series[2][i]);
        history.cloud_cover_mean.push(series[3][i]);
        history.precipitation_sum_in.push(series[4][i]);
    }

    (!history.time.is_empty()).then_some(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Chicago fixture: hourly from local midnight on 2026-02-15 at -06:00
    fn chicago_forecast() -> OpenMeteoResponse {
        let hours = 48;
        let start = NaiveDate::from_ymd_opt(2026, 2, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let json = serde_json::json!({
            "timezone": "America/Chicago",
            "utc_offset_seconds": -21600,
            "current": {
                "temperature_2m": 51.2,
                "surface_pressure": 1016.4,
                "wind_speed_10m": 9.0,
                "wind_direction_10m": 210,
                "wind_gusts_10m": 17.5,
                "cloud_cover": 45,
                "weather_code": 2,
                "is_day": 0
            },
            "hourly": {
                "time": (0..hours)
                    .map(|h| format!("{}-06:00", (start + Duration::hours(h)).format("%Y-%m-%dT%H:%M:%S")))
                    .collect::<Vec<_>>(),
                "temperature_2m": vec![50.0; hours as usize],
                "surface_pressure": vec![1016.0; hours as usize],
                "wind_speed_10m": vec![8.0; hours as usize],
                "wind_direction_10m": vec![200; hours as usize],
                "cloud_cover": vec![40; hours as usize],
                "precipitation_probability": vec![10; hours as usize],
                "weather_code": vec![2; (hours - 1) as usize]
            },
            "daily": {
                "time": ["2026-02-15", "2026-02-16"],
                "temperature_2m_max": [56.0, 58.0],
                "temperature_2m_min": [40.0, 41.0],
                "temperature_2m_mean": [48.0, 49.5],
                "wind_speed_10m_max": [18.0, 12.0],
                "precipitation_probability_max": [30, 20],
                "sunrise": ["2026-02-15T06:45", "2026-02-16T06:44"],
                "sunset": ["2026-02-15T17:40", null]
            }
        });
        serde_json::from_value(json).unwrap()
    }

    fn chicago_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 16, 0, 30, 0).unwrap()
    }

    #[test]
    fn test_urls_request_provider_timezone_and_us_units() {
        for url in [
            forecast_url("https://api.open-meteo.com/v1/forecast", 33.75, -84.39, 7),
            history_url("https://api.open-meteo.com/v1/forecast", 33.75, -84.39, 7),
        ] {
            assert!(url.contains("timezone=auto"), "{url}");
            assert!(url.contains("temperature_unit=fahrenheit"));
            assert!(url.contains("wind_speed_unit=mph"));
            assert!(url.contains("latitude=33.7500&longitude=-84.3900"));
        }
        assert!(forecast_url("u", 0.0, 0.0, 3).contains("forecast_days=3"));
        assert!(history_url("u", 0.0, 0.0, 5).contains("past_days=5"));
    }

    /// 00:30 UTC on the 16th is 18:30 on the 15th in Chicago
    #[test]
    fn test_now_index_uses_provider_offset() {
        let snapshot = convert_response(chicago_forecast(), None, chicago_now()).unwrap();
        assert_eq!(snapshot.meta.now_hour_index, 18);
        assert_eq!(snapshot.meta.timezone, "America/Chicago");
        assert_eq!(snapshot.meta.utc_offset_seconds, -21600);
        assert_eq!(
            snapshot.hourly.time[18].date(),
            NaiveDate::from_ymd_opt(2026, 2, 15).unwrap()
        );
    }

    #[test]
    fn test_now_index_clamps_outside_series() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let times: Vec<_> = (0..24).map(|h| start + Duration::hours(h)).collect();
        let early = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(now_hour_index(&times, 0, early), 0);
        assert_eq!(now_hour_index(&times, 0, late), 23);
        assert_eq!(now_hour_index(&[], 0, late), 0);
    }

    #[test]
    fn test_conversion_aligns_series() {
        let snapshot = convert_response(chicago_forecast(), None, chicago_now()).unwrap();
        assert_eq!(snapshot.hourly.len(), 48);
        assert_eq!(snapshot.hourly.weather_code.len(), 48);
        assert_eq!(snapshot.hourly.weather_code[47], None);
        assert_eq!(snapshot.daily.cloud_cover_mean, vec![None, None]);
        assert_eq!(snapshot.daily.sunset[1], None);
        assert_eq!(snapshot.current.is_day, Some(false));
        assert_eq!(snapshot.current.pressure_hpa, Some(1016.4));
        assert!(fishcast_engine::validate_snapshot(&snapshot).is_ok());
    }

    #[test]
    fn test_missing_timezone_is_rejected() {
        let mut forecast = chicago_forecast();
        forecast.timezone = None;
        assert!(convert_response(forecast, None, chicago_now()).is_err());
    }

    #[test]
    fn test_undated_history_ends_before_forecast() {
        let history: OpenMeteoResponse = serde_json::from_value(serde_json::json!({
            "daily": {
                "temperature_2m_mean": [44.0, 46.0, 47.0],
                "precipitation_sum": [0.0, 0.3, 0.0]
            }
        }))
        .unwrap();
        let snapshot = convert_response(chicago_forecast(), Some(history), chicago_now()).unwrap();
        let historical = snapshot.historical.unwrap();

        assert_eq!(
            historical.time,
            vec![
                NaiveDate::from_ymd_opt(2026, 2, 12).unwrap(),
                NaiveDate::from_ymd_opt(2026, 2, 13).unwrap(),
                NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
            ]
        );
        assert_eq!(historical.precipitation_sum_in[1], Some(0.3));
        assert_eq!(historical.wind_speed_max_mph, vec![None, None, None]);
    }

    #[test]
    fn test_dated_history_drops_forecast_days() {
        let history: OpenMeteoResponse = serde_json::from_value(serde_json::json!({
            "daily": {
                "time": ["2026-02-14", "2026-02-15"],
                "temperature_2m_mean": [46.0, 48.0]
            }
        }))
        .unwrap();
        let snapshot = convert_response(chicago_forecast(), Some(history), chicago_now()).unwrap();
        assert_eq!(snapshot.historical.unwrap().time.len(), 1);
    }

    mod properties {
        use super::*;
        use crate::config::DEFAULT_FORECAST_URL;
        use chrono::TimeZone;
        use proptest::prelude::*;

        fn hourly_times(hours: usize) -> Vec<NaiveDateTime> {
            let start = NaiveDate::from_ymd_opt(2026, 5, 10)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            (0..hours).map(|h| start + Duration::hours(h as i64)).collect()
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            /// The chosen slot is the last one at or before local now
            #[test]
            fn prop_now_index_is_latest_slot_not_after_now(
                hours in 1usize..96,
                offset_hours in -12i32..=14,
                minutes_after_start in -600i64..7000,
            ) {
                let times = hourly_times(hours);
                let offset = offset_hours * 3600;
                let local_now = times[0] + Duration::minutes(minutes_after_start);
                let now = Utc.from_utc_datetime(&(local_now - Duration::seconds(i64::from(offset))));

                let index = now_hour_index(&times, offset, now);
                prop_assert!(index < times.len());
                if local_now >= times[0] {
                    prop_assert!(times[index] <= local_now);
                    if index + 1 < times.len() {
                        prop_assert!(times[index + 1] > local_now);
                    }
                } else {
                    prop_assert_eq!(index, 0);
                }
            }

            /// Every request carries the unit and zone parameters
            #[test]
            fn prop_urls_carry_units_and_zone(
                lat in -90.0f64..=90.0,
                lon in -180.0f64..=180.0,
                days in 1u32..=16,
            ) {
                let forecast = forecast_url(DEFAULT_FORECAST_URL, lat, lon, days);
                let history = history_url(DEFAULT_FORECAST_URL, lat, lon, days);
                let latitude = format!("latitude={:.4}", lat);
                for url in [&forecast, &history] {
                    prop_assert!(url.starts_with(DEFAULT_FORECAST_URL));
                    prop_assert!(url.contains("timezone=auto"));
                    prop_assert!(url.contains("temperature_unit=fahrenheit"));
                    prop_assert!(url.contains("wind_speed_unit=mph"));
                    prop_assert!(url.contains(&latitude));
                }
                let forecast_days = format!("forecast_days={}&", days);
                prop_assert!(forecast.contains(&forecast_days));
                let past_days = format!("past_days={}&", days);
                prop_assert!(history.contains(&past_days));
            }
        }
    }
}
