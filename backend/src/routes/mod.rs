//! Route definitions for the FishCast API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalogue
        .route("/species", get(handlers::list_species))
        .route("/water-bodies", get(handlers::list_water_bodies))
        // Forecast (fetches from the weather provider)
        .route("/forecast", get(handlers::get_forecast))
        // Scoring of a supplied snapshot (no fetch)
        .route("/score", post(handlers::score_snapshot))
        .route("/solunar", get(handlers::get_solunar))
}
