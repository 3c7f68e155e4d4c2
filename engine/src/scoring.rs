//! Species-aware fishing score

use crate::conditions::{resolve_current, ScoringConditions, DEFAULT_PRESSURE_HPA};
use crate::error::EngineResult;
use crate::models::{
    clamp_score, FishPhase, Rating, ScoreBreakdown, ScoreResult, SpeciesProfile, WeatherSnapshot,
};
use crate::types::is_thunderstorm;

/// Points from a perfect temperature fit
const TEMPERATURE_WEIGHT: f64 = 0.6;
/// Points every evaluation starts with
const BASE_POINTS: f64 = 20.0;

const WIND_IN_BAND_POINTS: f64 = 6.0;
const WIND_CALM_POINTS: f64 = 2.0;
const WIND_MAX_PENALTY: f64 = -8.0;

/// Cloud points for a fully light-sensitive species at 0% or 100% cover
const CLOUD_SWING_POINTS: f64 = 6.0;

const PRECIP_LIGHT_POINTS: f64 = 2.0;
const PRECIP_HEAVY_POINTS: f64 = -6.0;
const THUNDERSTORM_POINTS: f64 = -8.0;

/// Moon points for a fully lunar species at new or full moon
const MOON_SWING_POINTS: f64 = 4.0;

/// Absolute pressure nudge, capped either way
const ABSOLUTE_PRESSURE_POINTS: f64 = 2.0;

/// Temperature fit below which fish are treated as inactive
const INACTIVE_FIT: f64 = 30.0;

/// 0-100 fit of `water_temp_f` to the species' temperature curve.
///
/// Flat inside the comfort band, Gaussian falloff outside it, so the fit
/// never increases as the temperature moves away from the optimum.
pub fn temperature_fit(water_temp_f: f64, species: &SpeciesProfile) -> f64 {
    if !water_temp_f.is_finite() {
        return 50.0;
    }
    let outside = ((water_temp_f - species.optimal_temp_f).abs() - species.comfort_band_f).max(0.0);
    let z = outside / species.temp_spread_f;
    100.0 * (-0.5 * z * z).exp()
}

fn pressure_points(conditions: &ScoringConditions, species: &SpeciesProfile) -> f64 {
    let trend = species.pressure.points(conditions.pressure.trend);
    let absolute = ((DEFAULT_PRESSURE_HPA - conditions.pressure_hpa) / 10.0)
        .clamp(-ABSOLUTE_PRESSURE_POINTS, ABSOLUTE_PRESSURE_POINTS);
    trend + absolute
}

fn wind_points(wind_mph: f64, species: &SpeciesProfile) -> f64 {
    let wind = wind_mph.max(0.0);
    if wind < species.wind_min_mph {
        let reach = wind / species.wind_min_mph;
        WIND_CALM_POINTS + (WIND_IN_BAND_POINTS - WIND_CALM_POINTS) * reach
    } else if wind <= species.wind_max_mph {
        WIND_IN_BAND_POINTS
    } else {
        (WIND_IN_BAND_POINTS - (wind - species.wind_max_mph)).max(WIND_MAX_PENALTY)
    }
}

fn cloud_points(cloud_cover: f64, species: &SpeciesProfile) -> f64 {
    let cover = (cloud_cover / 100.0).clamp(0.0, 1.0);
    species.light_sensitivity * (cover - 0.5) * 2.0 * CLOUD_SWING_POINTS
}

fn precipitation_points(probability: f64, weather_code: u8) -> f64 {
    if is_thunderstorm(weather_code) {
        return THUNDERSTORM_POINTS;
    }
    let p = probability.clamp(0.0, 100.0);
    if p <= 30.0 {
        PRECIP_LIGHT_POINTS
    } else if p <= 70.0 {
        PRECIP_LIGHT_POINTS - (p - 30.0) / 40.0 * (2.0 * PRECIP_LIGHT_POINTS)
    } else {
        -PRECIP_LIGHT_POINTS + (p - 70.0) / 30.0 * (PRECIP_HEAVY_POINTS + PRECIP_LIGHT_POINTS)
    }
}

/// Positive near new and full moon, negative at the quarters
fn moon_points(moon_phase_percent: Option<f64>, species: &SpeciesProfile) -> f64 {
    match moon_phase_percent.filter(|p| p.is_finite()) {
        Some(pct) => {
            let extremity = (pct.clamp(0.0, 100.0) - 50.0).abs() / 50.0;
            MOON_SWING_POINTS * species.lunar_sensitivity * (extremity * 2.0 - 1.0)
        }
        None => 0.0,
    }
}

fn dominant_phase(breakdown: &ScoreBreakdown, conditions: &ScoringConditions) -> FishPhase {
    if breakdown.temperature_fit < INACTIVE_FIT {
        return FishPhase::Inactive;
    }

    let trend = conditions.pressure.trend;
    let candidates = [
        (true, breakdown.pressure),
        (false, breakdown.wind),
        (false, breakdown.cloud),
        (false, breakdown.precipitation),
        (false, breakdown.moon),
    ];
    let (is_pressure, value) = candidates
        .iter()
        .copied()
        .fold((false, 0.0_f64), |best, c| if c.1.abs() > best.1.abs() { c } else { best });

    match (is_pressure, value) {
        (true, _) if trend.is_falling() => FishPhase::PreFeed,
        (true, _) if trend.is_rising() => FishPhase::PostFeed,
        (_, v) if v >= 0.0 => FishPhase::Feed,
        _ => FishPhase::PostFeed,
    }
}

/// Score already-resolved conditions
pub fn score_conditions(
    conditions: &ScoringConditions,
    water_temp_f: f64,
    species: &SpeciesProfile,
    moon_phase_percent: Option<f64>,
) -> ScoreResult {
    let breakdown = ScoreBreakdown {
        temperature_fit: temperature_fit(water_temp_f, species),
        pressure: pressure_points(conditions, species),
        wind: wind_points(conditions.wind_mph, species),
        cloud: cloud_points(conditions.cloud_cover, species),
        precipitation: precipitation_points(conditions.precip_probability, conditions.weather_code),
        moon: moon_points(moon_phase_percent, species),
    };

    let raw = TEMPERATURE_WEIGHT * breakdown.temperature_fit
        + BASE_POINTS
        + breakdown.pressure
        + breakdown.wind
        + breakdown.cloud
        + breakdown.precipitation
        + breakdown.moon;

    let phase = dominant_phase(&breakdown, conditions);
    let rating = Rating::from_score(clamp_score(raw));
    ScoreResult {
        score: 0,
        rating,
        color_class: rating.color_class().to_string(),
        phase,
        pressure_trend: conditions.pressure.trend,
        breakdown,
        stability: None,
    }
    .with_score(raw)
}

/// Score "now" for a snapshot.
///
/// Pure: identical inputs give identical output. Only an unknown species is
/// an error; missing weather fields resolve to neutral defaults.
pub fn calculate_fishing_score(
    weather: &WeatherSnapshot,
    water_temp_f: f64,
    species_key: &str,
    moon_phase_percent: Option<f64>,
) -> EngineResult<ScoreResult> {
    let species = SpeciesProfile::lookup(species_key)?;
    let conditions = resolve_current(weather);
    Ok(score_conditions(&conditions, water_temp_f, species, moon_phase_percent))
}

/// Short, deterministic fishing hints for the scored conditions
pub fn technique_tips(
    result: &ScoreResult,
    water_temp_f: f64,
    conditions: &ScoringConditions,
    species: &SpeciesProfile,
) -> Vec<String> {
    let mut tips = Vec::new();
    let low = species.optimal_temp_f - species.comfort_band_f;
    let high = species.optimal_temp_f + species.comfort_band_f;

    if water_temp_f < low - 10.0 {
        tips.push(format!(
            "Cold water: slow down and fish finesse baits near {:.0} ft.",
            species.deep_holding_ft
        ));
    } else if water_temp_f < low {
        tips.push("Water is still cool: target sunny, shallow flats in the afternoon.".to_string());
    } else if water_temp_f > high {
        tips.push(format!(
            "Warm water: fish early and late, or go to {:.0} ft during midday.",
            species.deep_holding_ft
        ));
    } else {
        tips.push(format!(
            "{} are in their comfort range: cover water with moving baits.",
            species.name
        ));
    }

    if conditions.wind_mph > species.wind_max_mph {
        tips.push("Strong wind: look for sheltered coves and lee shorelines.".to_string());
    } else if conditions.wind_mph >= species.wind_min_mph.max(1.0) {
        tips.push("Work wind-blown banks where bait gets pushed in.".to_string());
    }

    let trend = conditions.pressure.trend;
    if trend.is_falling() {
        tips.push("Falling pressure: fish aggressively before the front arrives.".to_string());
    } else if trend.is_rising() {
        tips.push("Rising pressure: downsize and fish tight to cover.".to_string());
    }

    if conditions.cloud_cover >= 70.0 {
        tips.push("Overcast skies stretch the low-light bite; try topwater.".to_string());
    } else if conditions.cloud_cover <= 25.0 && species.light_sensitivity >= 0.5 {
        tips.push("Bright sun: fish shade lines, docks and deeper edges.".to_string());
    }

    if is_thunderstorm(conditions.weather_code) {
        tips.push("Thunderstorms possible: stay off the water when lightning is near.".to_string());
    }

    match result.rating {
        Rating::Excellent => tips.push("Prime conditions: try reaction baits and cover water fast.".to_string()),
        Rating::Poor => tips.push("Tough bite expected: slow presentations and smaller lures.".to_string()),
        _ => {}
    }

    tips
}
