//! Forecast scoring engine for FishCast
//!
//! Turns a weather snapshot for a location into a bounded 0-100 fishing score
//! per day, together with the water temperature model, pressure trend,
//! solunar periods and the stability damping that keeps repeated evaluations
//! of the same day from swinging.
//!
//! The engine performs no I/O. Callers hand it an already-resolved
//! [`WeatherSnapshot`] and, for day scoring, a [`StabilityStore`].

pub mod conditions;
pub mod error;
pub mod forecast;
pub mod models;
pub mod pressure;
pub mod scoring;
pub mod solunar;
pub mod stability;
pub mod types;
pub mod validation;
pub mod water_temp;

pub use conditions::*;
pub use error::*;
pub use forecast::*;
pub use models::*;
pub use pressure::*;
pub use scoring::*;
pub use solunar::*;
pub use stability::*;
pub use types::*;
pub use validation::*;
pub use water_temp::*;
