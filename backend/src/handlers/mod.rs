//! HTTP request handlers

pub mod forecast;
pub mod health;
pub mod solunar;
pub mod species;

pub use forecast::{get_forecast, score_snapshot};
pub use health::health_check;
pub use solunar::get_solunar;
pub use species::{list_species, list_water_bodies};
