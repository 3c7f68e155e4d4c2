//! Solunar table handler

use axum::{extract::Query, Json};
use chrono::Utc;
use fishcast_engine::{calculate_solunar, parse_date_key, SolunarResult};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;

#[derive(Debug, Deserialize, Validate)]
pub struct SolunarQuery {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lon: f64,
    /// `YYYY-MM-DD`, defaults to today (UTC)
    pub date: Option<String>,
}

/// Moon phase and feeding periods for a location and day
pub async fn get_solunar(Query(query): Query<SolunarQuery>) -> AppResult<Json<SolunarResult>> {
    query.validate()?;
    let date = match query.date.as_deref() {
        Some(value) => parse_date_key(value)?,
        None => Utc::now().date_naive(),
    };
    Ok(Json(calculate_solunar(query.lat, query.lon, date)))
}
