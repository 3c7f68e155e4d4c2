//! Business logic services

pub mod forecast;

pub use forecast::{ForecastInput, ForecastService, ScoreInput, ScoreResponse, SharedController};
