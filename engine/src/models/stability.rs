//! Persisted stability state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Day-level inputs tracked to detect a material regime change
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StabilityInputs {
    pub pressure_avg: f64,
    pub wind_avg_kmh: f64,
    pub precip_prob_avg: f64,
    pub cloud_avg: f64,
    pub temp_avg_f: f64,
    pub water_temp_f: f64,
}

impl StabilityInputs {
    pub fn is_finite(&self) -> bool {
        [
            self.pressure_avg,
            self.wind_avg_kmh,
            self.precip_prob_avg,
            self.cloud_avg,
            self.temp_avg_f,
            self.water_temp_f,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// One record per `location|species|date`, overwritten on each evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StabilityRecord {
    pub score: f64,
    pub inputs: StabilityInputs,
    pub updated_at: DateTime<Utc>,
}

/// Which branch of the stability state machine produced a score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StabilityBranch {
    /// No usable prior record; raw score passed through
    Fresh,
    /// Inputs within tolerance; movement capped
    Damped,
    /// At least one input beyond tolerance; cap relaxed or lifted
    RegimeChange,
}

/// Details of a stability evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StabilityOutcome {
    pub score: f64,
    pub raw_score: f64,
    pub previous_score: Option<f64>,
    pub branch: StabilityBranch,
    /// Largest input shift as a multiple of its tolerance
    pub change_ratio: f64,
}
