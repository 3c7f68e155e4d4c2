//! Domain models for the FishCast engine

mod score;
mod species;
mod stability;
mod water_body;
mod weather;

pub use score::*;
pub use species::*;
pub use stability::*;
pub use water_body::*;
pub use weather::*;
