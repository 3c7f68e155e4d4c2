//! Surface and depth water temperature estimation
//!
//! The surface estimate starts from a seasonal baseline for the latitude and
//! day of year, then relaxes toward the last week of daily mean air
//! temperature through a first-order lag filter. Mean wind cools the surface
//! by mixing; the effect is bounded and gusts count for much less than
//! sustained wind. The result never tracks air temperature 1:1 and is held
//! inside a seasonal band anchored on the deep-water temperature.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::conditions::{forcing_history, DailyForcing};
use crate::models::{WaterBodyProfile, WaterBodyType, WeatherSnapshot};
use crate::types::Coordinates;

/// Largest cooling wind mixing can apply, °F
pub const MAX_WIND_SHIFT_F: f64 = 3.0;

/// Weight of gust spread relative to sustained wind above the threshold
pub const GUST_WEIGHT: f64 = 0.15;

/// Effective wind (mph) at which mixing reaches ~63% of its maximum
const WIND_MIXING_SCALE_MPH: f64 = 12.0;

/// Days of forcing averaged for the wind term
const WIND_WINDOW_DAYS: usize = 3;

/// Extra warming under clear skies, °F
const SOLAR_GAIN_F: f64 = 1.5;

/// Cooling per inch of rain, °F (capped at 2 inches)
const RAIN_COOLING_F_PER_IN: f64 = 1.0;

/// Headroom above the recent mean air temperature the surface may keep, °F
const FORCING_HEADROOM_F: f64 = 4.0;

/// Fraction of the surface/deep difference lost across the mixed layer
const MIXED_LAYER_GRADIENT: f64 = 0.15;

pub const MIN_SURFACE_TEMP_F: f64 = 32.0;
pub const MAX_SURFACE_TEMP_F: f64 = 95.0;

/// Fallback latitude when the caller's is unusable
const DEFAULT_LATITUDE: f64 = 35.0;

/// Solstice day of year; the water peak trails it by `seasonal_lag_days`
const SOLSTICE_DAY: f64 = 172.0;

const REPORT_MAX_AGE_DAYS: i64 = 3;
const REPORT_MAX_DISTANCE_MILES: f64 = 25.0;
const REPORT_MAX_WEIGHT: f64 = 0.6;

/// Angler-submitted surface reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaterTempReport {
    pub temp_f: f64,
    pub reported_on: NaiveDate,
    pub distance_miles: f64,
}

/// Previously stored estimate used to cap day-over-day movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviousEstimate {
    pub date: NaiveDate,
    pub temp_f: f64,
}

/// Mean annual surface temperature for a latitude, °F
fn annual_mean_f(latitude: f64) -> f64 {
    (80.0 - 0.45 * latitude.abs()).clamp(40.0, 82.0)
}

/// Long-run seasonal surface temperature for `date`
pub fn seasonal_baseline(latitude: f64, profile: &WaterBodyProfile, date: NaiveDate) -> f64 {
    let latitude = if latitude.is_finite() {
        latitude.clamp(-90.0, 90.0)
    } else {
        DEFAULT_LATITUDE
    };
    let mut peak_day = SOLSTICE_DAY + profile.seasonal_lag_days;
    if latitude < 0.0 {
        peak_day += 365.25 / 2.0;
    }
    let phase = 2.0 * std::f64::consts::PI * (f64::from(date.ordinal()) - peak_day) / 365.25;
    annual_mean_f(latitude) + profile.annual_amplitude * phase.cos()
}

/// Lowest and highest surface temperature plausible at this point of the season
fn seasonal_band(baseline: f64, profile: &WaterBodyProfile) -> (f64, f64) {
    let half_swing = 0.5 * profile.annual_amplitude;
    let floor = (profile.deep_stable_temp.min(baseline) - half_swing).max(MIN_SURFACE_TEMP_F);
    let ceiling = (baseline + half_swing).min(MAX_SURFACE_TEMP_F).max(floor);
    (floor, ceiling)
}

/// Narrow the seasonal band so the surface never sits far above the air
/// that has been driving it
fn forcing_band((floor, ceiling): (f64, f64), history: &[DailyForcing]) -> (f64, f64) {
    let air: Vec<f64> = history
        .iter()
        .map(|d| d.air_mean_f)
        .filter(|t| t.is_finite())
        .collect();
    if air.is_empty() {
        return (floor, ceiling);
    }
    let mean_air = air.iter().sum::<f64>() / air.len() as f64;
    let ceiling = ceiling.min(mean_air + FORCING_HEADROOM_F).max(MIN_SURFACE_TEMP_F);
    (floor.min(ceiling), ceiling)
}

/// Per-day fraction of the gap to the forcing closed by the surface
fn response_rate(profile: &WaterBodyProfile) -> f64 {
    let lag_rate = 1.0 / profile.thermal_lag_days.max(1.0);
    (0.5 * (profile.thermal_inertia_base + lag_rate)).clamp(0.01, 0.5)
}

/// Equilibrium the surface is pulled toward on one day
fn forcing_target(day: &DailyForcing) -> f64 {
    let clear_sky = 1.0 - (day.cloud_cover / 100.0).clamp(0.0, 1.0);
    let rain = day.precip_in.clamp(0.0, 2.0);
    day.air_mean_f + SOLAR_GAIN_F * clear_sky - RAIN_COOLING_F_PER_IN * rain
}

/// Cooling from wind mixing, in `[-MAX_WIND_SHIFT_F, 0]`.
///
/// Only mean wind above the mixing threshold and gust spread above the mean
/// contribute; gust spread is weighted by [`GUST_WEIGHT`].
pub fn wind_mixing_shift(
    surface_f: f64,
    mean_wind_mph: f64,
    max_wind_mph: f64,
    profile: &WaterBodyProfile,
) -> f64 {
    let mean = if mean_wind_mph.is_finite() { mean_wind_mph.max(0.0) } else { 0.0 };
    let max = if max_wind_mph.is_finite() { max_wind_mph.max(mean) } else { mean };

    let sustained = (mean - profile.mixing_wind_threshold).max(0.0);
    let gusts = (max - mean.max(profile.mixing_wind_threshold)).max(0.0);
    let effective = sustained + GUST_WEIGHT * gusts;
    if effective <= 0.0 {
        return 0.0;
    }

    let fraction = 1.0 - (-effective / WIND_MIXING_SCALE_MPH).exp();
    // stratified water has more cold water to bring up
    let strength = ((surface_f - profile.deep_stable_temp) / 10.0).clamp(0.25, 1.0);
    -(MAX_WIND_SHIFT_F * fraction * strength)
}

/// Estimated surface temperature (°F) for `target_date`.
///
/// Never fails: missing forcing falls back to current conditions, and an
/// empty snapshot yields the seasonal baseline.
pub fn estimate_water_temp(
    coords: &Coordinates,
    water_body: WaterBodyType,
    target_date: NaiveDate,
    weather: &WeatherSnapshot,
) -> f64 {
    let profile = water_body.profile();
    let baseline = seasonal_baseline(coords.latitude, profile, target_date);
    let history = forcing_history(weather, target_date);
    let (floor, ceiling) = forcing_band(seasonal_band(baseline, profile), &history);
    let rate = response_rate(profile);

    let mut surface = baseline;
    for day in history.iter().filter(|d| d.air_mean_f.is_finite()) {
        let step = rate * (forcing_target(day) - surface);
        surface += step.clamp(-profile.max_daily_change, profile.max_daily_change);
    }

    let recent: Vec<&DailyForcing> = history.iter().rev().take(WIND_WINDOW_DAYS).collect();
    let count = recent.len().max(1) as f64;
    let mean_wind = recent.iter().map(|d| d.wind_mean_mph).sum::<f64>() / count;
    let max_wind = recent.iter().map(|d| d.wind_max_mph).sum::<f64>() / count;
    surface += wind_mixing_shift(surface, mean_wind, max_wind, profile);

    let estimate = if surface.is_finite() { surface.clamp(floor, ceiling) } else { baseline.clamp(floor, ceiling) };

    tracing::debug!(
        water_body = %water_body,
        date = %target_date,
        baseline,
        estimate,
        "estimated surface water temperature"
    );
    estimate
}

/// Surface estimate blended with recent nearby angler reports.
///
/// Reports older than three days, further than 25 miles, dated after
/// `target_date` or outside 32-100 °F are ignored. Reports never account
/// for more than 60% of the result.
pub fn estimate_water_temp_with_reports(
    coords: &Coordinates,
    water_body: WaterBodyType,
    target_date: NaiveDate,
    weather: &WeatherSnapshot,
    reports: &[WaterTempReport],
) -> f64 {
    let modeled = estimate_water_temp(coords, water_body, target_date, weather);

    let weighted: Vec<(f64, f64)> = reports
        .iter()
        .filter(|r| r.temp_f.is_finite() && (32.0..=100.0).contains(&r.temp_f))
        .filter_map(|r| {
            let age = (target_date - r.reported_on).num_days();
            if !(0..=REPORT_MAX_AGE_DAYS).contains(&age) {
                return None;
            }
            let distance = if r.distance_miles.is_finite() { r.distance_miles.max(0.0) } else { return None };
            if distance > REPORT_MAX_DISTANCE_MILES {
                return None;
            }
            let recency = 1.0 - age as f64 / (REPORT_MAX_AGE_DAYS + 1) as f64;
            let proximity = 1.0 - distance / (REPORT_MAX_DISTANCE_MILES * 1.25);
            Some((r.temp_f, recency * proximity))
        })
        .collect();

    let total_weight: f64 = weighted.iter().map(|(_, w)| w).sum();
    if weighted.is_empty() || total_weight <= 0.0 {
        return modeled;
    }

    let report_mean = weighted.iter().map(|(t, w)| t * w).sum::<f64>() / total_weight;
    let strongest = weighted.iter().map(|(_, w)| *w).fold(0.0, f64::max);
    let share = REPORT_MAX_WEIGHT * strongest;
    modeled * (1.0 - share) + report_mean * share
}

/// Keep `estimate` within `max_daily_change` per elapsed day of `previous`
pub fn constrain_to_previous(
    estimate: f64,
    previous: &PreviousEstimate,
    target_date: NaiveDate,
    water_body: WaterBodyType,
) -> f64 {
    if !previous.temp_f.is_finite() {
        return estimate;
    }
    let days = (target_date - previous.date).num_days().unsigned_abs().max(1) as f64;
    let limit = water_body.profile().max_daily_change * days;
    estimate.clamp(previous.temp_f - limit, previous.temp_f + limit)
}

/// Temperature (°F) at `depth_ft` below the surface.
///
/// Above the thermocline the value tracks the surface; below it decays
/// toward the water body's deep stable temperature.
pub fn estimate_temp_by_depth(surface_f: f64, water_body: WaterBodyType, depth_ft: f64) -> f64 {
    if !depth_ft.is_finite() || depth_ft <= 0.0 {
        return surface_f;
    }
    let profile = water_body.profile();
    let thermocline = profile.thermocline_depth;
    let delta = surface_f - profile.deep_stable_temp;

    if depth_ft <= thermocline {
        surface_f - delta * MIXED_LAYER_GRADIENT * (depth_ft / thermocline)
    } else {
        let decay = (-(depth_ft - thermocline) / (0.5 * thermocline)).exp();
        profile.deep_stable_temp + delta * (1.0 - MIXED_LAYER_GRADIENT) * decay
    }
}
