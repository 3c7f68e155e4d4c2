//! HTTP handlers for forecast and scoring endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use fishcast_engine::{ForecastView, WaterBodyType, DEFAULT_FORECAST_DAYS};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::services::{ForecastInput, ForecastService, ScoreInput, ScoreResponse};
use crate::AppState;

/// Query parameters for a forecast
#[derive(Debug, Deserialize, Validate)]
pub struct ForecastQuery {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lon: f64,
    #[validate(length(min = 1, max = 64, message = "Species is required"))]
    pub species: String,
    #[serde(default)]
    pub water_body: WaterBodyType,
    #[validate(range(min = 1, max = 16, message = "Days must be between 1 and 16"))]
    pub days: Option<usize>,
    #[validate(length(max = 120))]
    pub name: Option<String>,
}

/// Fetch weather and build the forecast view
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<ForecastView>> {
    query.validate()?;

    let service = ForecastService::new(state.weather.clone(), state.stability.clone());
    let view = service
        .forecast(ForecastInput {
            latitude: query.lat,
            longitude: query.lon,
            name: query.name,
            species: query.species,
            water_body: query.water_body,
            days: query.days.unwrap_or(DEFAULT_FORECAST_DAYS),
            reports: Vec::new(),
        })
        .await?;
    Ok(Json(view))
}

/// Score a caller-supplied snapshot
pub async fn score_snapshot(
    State(state): State<AppState>,
    Json(input): Json<ScoreInput>,
) -> AppResult<Json<ScoreResponse>> {
    let service = ForecastService::new(state.weather.clone(), state.stability.clone());
    let response = service.score(input)?;
    Ok(Json(response))
}
