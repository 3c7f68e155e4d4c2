//! Forecast view-model
//!
//! [`build_forecast_view`] is the single output contract consumed by every
//! presentation layer. All numbers in the view are finite and unit labels
//! are always present.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::conditions::{resolve_current, resolve_day, today};
use crate::error::EngineResult;
use crate::models::{FishPhase, Rating, SpeciesProfile, WaterBodyType, WeatherSnapshot};
use crate::pressure::PressureTrend;
use crate::scoring::{score_conditions, technique_tips};
use crate::solunar::{calculate_solunar_with_offset, moon_illumination, SolunarResult};
use crate::stability::{DayScoreRequest, StabilityController, StabilityStore};
use crate::types::{hpa_to_inhg, weather_description, wind_direction, Coordinates, Units};
use crate::water_temp::{
    constrain_to_previous, estimate_temp_by_depth, estimate_water_temp_with_reports,
    PreviousEstimate, WaterTempReport,
};

pub const DEFAULT_FORECAST_DAYS: usize = 7;
pub const MAX_FORECAST_DAYS: usize = 16;

/// Depths reported alongside the surface estimate, ft
const SHALLOW_DEPTH_FT: f64 = 10.0;
const DEEP_DEPTH_FT: f64 = 20.0;

#[derive(Debug, Clone)]
pub struct ForecastRequest<'a> {
    pub coords: &'a Coordinates,
    pub water_body: WaterBodyType,
    pub species_key: &'a str,
    pub snapshot: &'a WeatherSnapshot,
    pub days: usize,
    pub reports: &'a [WaterTempReport],
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesSummary {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentView {
    pub score: u8,
    pub rating: Rating,
    pub color_class: String,
    pub phase: FishPhase,
    pub phase_label: String,
    pub water_temp_f: f64,
    pub water_temp_10ft_f: f64,
    pub water_temp_20ft_f: f64,
    pub air_temp_f: f64,
    pub wind_mph: f64,
    pub wind_gust_mph: f64,
    pub wind_direction: String,
    pub pressure_hpa: f64,
    pub pressure_inhg: f64,
    pub pressure_trend: PressureTrend,
    pub pressure_trend_label: String,
    pub cloud_cover: f64,
    pub precip_probability: f64,
    pub conditions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub date: NaiveDate,
    pub score: u8,
    pub rating: Rating,
    pub color_class: String,
    pub phase: FishPhase,
    pub water_temp_f: f64,
    pub air_high_f: f64,
    pub air_low_f: f64,
    pub wind_mph: f64,
    pub precip_probability: f64,
    pub precip_sum_in: f64,
    pub pressure_trend: PressureTrend,
    pub moon_phase: String,
    pub moon_phase_percent: f64,
    pub conditions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastView {
    pub location: Coordinates,
    pub species: SpeciesSummary,
    pub water_body: WaterBodyType,
    /// Provider timezone the dates and clock times are expressed in
    pub timezone: String,
    pub generated_at: DateTime<Utc>,
    pub current: CurrentView,
    pub solunar: SolunarResult,
    pub tips: Vec<String>,
    pub days: Vec<DayView>,
    pub units: Units,
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Dates to score: from the provider's "today", at most `days` of them
fn forecast_dates(snapshot: &WeatherSnapshot, first: NaiveDate, days: usize) -> Vec<NaiveDate> {
    let days = days.clamp(1, MAX_FORECAST_DAYS);
    let mut dates: Vec<NaiveDate> = snapshot
        .daily
        .time
        .iter()
        .copied()
        .filter(|d| *d >= first)
        .take(days)
        .collect();
    if dates.is_empty() {
        dates.push(first);
    }
    dates
}

/// Assemble the complete forecast view for a location and species.
///
/// Per-day scores go through `controller` and so are stabilized against
/// earlier evaluations of the same day. Fails only for an unknown species.
pub fn build_forecast_view<S: StabilityStore>(
    controller: &StabilityController<S>,
    request: &ForecastRequest<'_>,
) -> EngineResult<ForecastView> {
    let species = SpeciesProfile::lookup(request.species_key)?;
    let snapshot = request.snapshot;
    let coords = request.coords;
    let offset = Duration::seconds(i64::from(snapshot.meta.utc_offset_seconds));
    let first_day = today(snapshot).unwrap_or_else(|| (request.now + offset).date_naive());

    let water_now = estimate_water_temp_with_reports(
        coords,
        request.water_body,
        first_day,
        snapshot,
        request.reports,
    );
    let current = resolve_current(snapshot);
    let moon_now = moon_illumination(first_day);
    let scored = score_conditions(&current, water_now, species, Some(moon_now));
    let tips = technique_tips(&scored, water_now, &current, species);

    let current_view = CurrentView {
        score: scored.score,
        rating: scored.rating,
        color_class: scored.color_class.clone(),
        phase: scored.phase,
        phase_label: scored.phase.to_string(),
        water_temp_f: finite_or(water_now, species.optimal_temp_f),
        water_temp_10ft_f: finite_or(
            estimate_temp_by_depth(water_now, request.water_body, SHALLOW_DEPTH_FT),
            species.optimal_temp_f,
        ),
        water_temp_20ft_f: finite_or(
            estimate_temp_by_depth(water_now, request.water_body, DEEP_DEPTH_FT),
            species.optimal_temp_f,
        ),
        air_temp_f: current.air_temp_f,
        wind_mph: current.wind_mph,
        wind_gust_mph: current.wind_max_mph,
        wind_direction: wind_direction(current.wind_direction_deg).to_string(),
        pressure_hpa: current.pressure_hpa,
        pressure_inhg: hpa_to_inhg(current.pressure_hpa),
        pressure_trend: current.pressure.trend,
        pressure_trend_label: current.pressure.trend.label().to_string(),
        cloud_cover: current.cloud_cover,
        precip_probability: current.precip_probability,
        conditions: weather_description(current.weather_code).to_string(),
    };

    let location_key = coords.location_key();
    let mut previous: Option<PreviousEstimate> = None;
    let mut days = Vec::new();
    for date in forecast_dates(snapshot, first_day, request.days) {
        let estimate = estimate_water_temp_with_reports(
            coords,
            request.water_body,
            date,
            snapshot,
            request.reports,
        );
        let water = match &previous {
            Some(prev) => constrain_to_previous(estimate, prev, date, request.water_body),
            None => estimate,
        };
        let water = finite_or(water, water_now);
        previous = Some(PreviousEstimate { date, temp_f: water });

        let result = controller.calculate_species_aware_day_score(&DayScoreRequest {
            snapshot,
            day_key: date,
            species_key: species.key,
            water_temp_f: water,
            location_key: &location_key,
            now: request.now,
        })?;
        let day = resolve_day(snapshot, date);
        let solunar =
            calculate_solunar_with_offset(coords.latitude, date, snapshot.meta.utc_offset_seconds);

        days.push(DayView {
            date,
            score: result.score,
            rating: result.rating,
            color_class: result.color_class,
            phase: result.phase,
            water_temp_f: water,
            air_high_f: day.temp_max_f,
            air_low_f: day.temp_min_f,
            wind_mph: day.conditions.wind_mph,
            precip_probability: day.conditions.precip_probability,
            precip_sum_in: day.precip_sum_in,
            pressure_trend: day.conditions.pressure.trend,
            moon_phase: solunar.moon_phase,
            moon_phase_percent: solunar.moon_phase_percent,
            conditions: weather_description(day.conditions.weather_code).to_string(),
        });
    }

    tracing::debug!(
        location = %location_key,
        species = species.key,
        days = days.len(),
        "built forecast view"
    );

    Ok(ForecastView {
        location: coords.clone(),
        species: SpeciesSummary {
            key: species.key.to_string(),
            name: species.name.to_string(),
        },
        water_body: request.water_body,
        timezone: snapshot.meta.timezone.clone(),
        generated_at: request.now,
        current: current_view,
        solunar: calculate_solunar_with_offset(
            coords.latitude,
            first_day,
            snapshot.meta.utc_offset_seconds,
        ),
        tips,
        days,
        units: Units::default(),
    })
}
