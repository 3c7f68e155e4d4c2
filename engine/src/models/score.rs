//! Score result models

use serde::{Deserialize, Serialize};

use crate::pressure::PressureTrend;

use super::StabilityOutcome;

/// Rating band for a 0-100 score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// 80-100
    Excellent,
    /// 65-79
    Good,
    /// 50-64
    Fair,
    /// 0-49
    Poor,
}

impl Rating {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 80.0 => Rating::Excellent,
            s if s >= 65.0 => Rating::Good,
            s if s >= 50.0 => Rating::Fair,
            _ => Rating::Poor,
        }
    }

    /// Presentation tag
    pub fn color_class(&self) -> &'static str {
        match self {
            Rating::Excellent => "excellent",
            Rating::Good => "good",
            Rating::Fair => "fair",
            Rating::Poor => "poor",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Excellent => write!(f, "Excellent"),
            Rating::Good => write!(f, "Good"),
            Rating::Fair => write!(f, "Fair"),
            Rating::Poor => write!(f, "Poor"),
        }
    }
}

/// Coarse activity label derived from the dominant adjustment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FishPhase {
    /// Falling pressure ahead of a front
    PreFeed,
    Feed,
    /// Rising pressure or hostile surface conditions after a front
    PostFeed,
    /// Water temperature far from the species' comfort band
    Inactive,
}

impl std::fmt::Display for FishPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FishPhase::PreFeed => write!(f, "pre feed"),
            FishPhase::Feed => write!(f, "feed"),
            FishPhase::PostFeed => write!(f, "post feed"),
            FishPhase::Inactive => write!(f, "inactive"),
        }
    }
}

/// Point contribution of each scoring factor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// 0-100 fit of the water temperature to the species curve
    pub temperature_fit: f64,
    pub pressure: f64,
    pub wind: f64,
    pub cloud: f64,
    pub precipitation: f64,
    pub moon: f64,
}

/// Output of the score calculator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// Always finite and within 0-100
    pub score: u8,
    pub rating: Rating,
    pub color_class: String,
    pub phase: FishPhase,
    pub pressure_trend: PressureTrend,
    pub breakdown: ScoreBreakdown,
    /// Present when the score went through stability damping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<StabilityOutcome>,
}

impl ScoreResult {
    /// Replace the score, keeping rating and color consistent with it
    pub fn with_score(mut self, score: f64) -> Self {
        let score = clamp_score(score).round();
        self.score = score as u8;
        self.rating = Rating::from_score(score);
        self.color_class = self.rating.color_class().to_string();
        self
    }
}

/// Clamp to [0, 100], mapping non-finite values to a neutral 50
pub fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        50.0
    }
}
