//! Species and water body catalogue handlers

use axum::Json;
use fishcast_engine::{SpeciesProfile, WaterBodyType};

/// List every species the scorer knows
pub async fn list_species() -> Json<&'static [SpeciesProfile]> {
    Json(SpeciesProfile::all())
}

/// List the supported water body types
pub async fn list_water_bodies() -> Json<Vec<WaterBodyType>> {
    Json(WaterBodyType::ALL.to_vec())
}
