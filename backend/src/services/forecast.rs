//! Forecast service: provider fetch plus engine scoring

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use fishcast_engine::{
    build_forecast_view, calculate_fishing_score, estimate_water_temp_with_reports,
    moon_illumination, resolve_day, technique_tips, today, validate_coordinates,
    validate_snapshot, Coordinates, DayScoreRequest, ForecastRequest, ForecastView,
    MemoryStabilityStore, ScoreResult, SpeciesProfile, StabilityController, WaterBodyType,
    WaterTempReport, WeatherSnapshot, MAX_FORECAST_DAYS,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::external::WeatherClient;

pub type SharedController = Arc<StabilityController<MemoryStabilityStore>>;

/// Forecast and scoring over fetched or caller-supplied snapshots
#[derive(Clone)]
pub struct ForecastService {
    weather: WeatherClient,
    stability: SharedController,
}

/// Input for a fetched forecast
#[derive(Debug, Clone)]
pub struct ForecastInput {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
    pub species: String,
    pub water_body: WaterBodyType,
    pub days: usize,
    pub reports: Vec<WaterTempReport>,
}

/// Input for scoring a caller-supplied snapshot
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
    #[validate(length(min = 1, max = 64, message = "Species is required"))]
    pub species: String,
    #[serde(default)]
    pub water_body: WaterBodyType,
    /// Measured surface temperature; estimated from the snapshot when absent
    pub water_temp_f: Option<f64>,
    pub moon_phase_percent: Option<f64>,
    /// Score this day through the stability controller instead of "now"
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub reports: Vec<WaterTempReport>,
    pub snapshot: WeatherSnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub date: NaiveDate,
    pub water_temp_f: f64,
    pub result: ScoreResult,
    pub tips: Vec<String>,
}

fn check_coordinates(latitude: f64, longitude: f64) -> AppResult<()> {
    validate_coordinates(latitude, longitude).map_err(|message| AppError::Validation {
        field: "coordinates".to_string(),
        message: message.to_string(),
    })
}

impl ForecastService {
    pub fn new(weather: WeatherClient, stability: SharedController) -> Self {
        Self { weather, stability }
    }

    /// Fetch a snapshot for the location and build the full forecast view
    pub async fn forecast(&self, input: ForecastInput) -> AppResult<ForecastView> {
        check_coordinates(input.latitude, input.longitude)?;
        // Reject before spending a provider round trip
        SpeciesProfile::lookup(&input.species)?;

        let days = input.days.clamp(1, MAX_FORECAST_DAYS);
        let snapshot = self
            .weather
            .fetch_snapshot(input.latitude, input.longitude, days as u32)
            .await?;
        validate_snapshot(&snapshot)?;

        let coords = Coordinates::new(input.latitude, input.longitude)
            .with_name(input.name.unwrap_or_default());
        let view = build_forecast_view(
            self.stability.as_ref(),
            &ForecastRequest {
                coords: &coords,
                water_body: input.water_body,
                species_key: &input.species,
                snapshot: &snapshot,
                days,
                reports: &input.reports,
                now: Utc::now(),
            },
        )?;

        tracing::info!(
            location = %coords.location_key(),
            species = %input.species,
            days = view.days.len(),
            score = view.current.score,
            "forecast built"
        );
        Ok(view)
    }

    /// Score a snapshot without fetching.
    ///
    /// With `date` set the day goes through the stability controller, so
    /// repeated calls for the same location, species and day are damped.
    pub fn score(&self, input: ScoreInput) -> AppResult<ScoreResponse> {
        input.validate()?;
        validate_snapshot(&input.snapshot)?;
        let species = SpeciesProfile::lookup(&input.species)?;

        let coords = Coordinates::new(input.latitude, input.longitude);
        let snapshot = &input.snapshot;
        let day = input
            .date
            .or_else(|| today(snapshot))
            .unwrap_or_else(|| Utc::now().date_naive());
        let water_temp_f = input
            .water_temp_f
            .filter(|t| t.is_finite())
            .unwrap_or_else(|| {
                estimate_water_temp_with_reports(
                    &coords,
                    input.water_body,
                    day,
                    snapshot,
                    &input.reports,
                )
            });

        let result = match input.date {
            Some(day_key) => self.stability.calculate_species_aware_day_score(&DayScoreRequest {
                snapshot,
                day_key,
                species_key: &input.species,
                water_temp_f,
                location_key: &coords.location_key(),
                now: Utc::now(),
            })?,
            None => {
                let moon = input
                    .moon_phase_percent
                    .unwrap_or_else(|| moon_illumination(day));
                calculate_fishing_score(snapshot, water_temp_f, &input.species, Some(moon))?
            }
        };

        let conditions = resolve_day(snapshot, day).conditions;
        let tips = technique_tips(&result, water_temp_f, &conditions, species);

        Ok(ScoreResponse {
            date: day,
            water_temp_f,
            result,
            tips,
        })
    }
}
