//! Barometric pressure trend classification

use serde::{Deserialize, Serialize};

/// Slope magnitude (hPa per sample) at which a trend becomes "rapid"
pub const RAPID_RATE_HPA: f64 = 0.5;

/// Slope magnitude (hPa per sample) below which pressure counts as stable
pub const STABLE_RATE_HPA: f64 = 0.15;

/// Five-bucket pressure trend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PressureTrend {
    RapidFall,
    Falling,
    #[default]
    Stable,
    Rising,
    RapidRise,
}

impl PressureTrend {
    pub fn from_rate(rate: f64) -> Self {
        if !rate.is_finite() {
            return PressureTrend::Stable;
        }
        match rate {
            r if r <= -RAPID_RATE_HPA => PressureTrend::RapidFall,
            r if r <= -STABLE_RATE_HPA => PressureTrend::Falling,
            r if r >= RAPID_RATE_HPA => PressureTrend::RapidRise,
            r if r >= STABLE_RATE_HPA => PressureTrend::Rising,
            _ => PressureTrend::Stable,
        }
    }

    pub fn is_falling(&self) -> bool {
        matches!(self, PressureTrend::RapidFall | PressureTrend::Falling)
    }

    pub fn is_rising(&self) -> bool {
        matches!(self, PressureTrend::RapidRise | PressureTrend::Rising)
    }

    /// Short label for display
    pub fn label(&self) -> &'static str {
        if self.is_falling() {
            "Falling"
        } else if self.is_rising() {
            "Rising"
        } else {
            "Stable"
        }
    }
}

/// Trend plus the fitted slope
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PressureRate {
    pub trend: PressureTrend,
    /// hPa per sample (hourly series: hPa per hour)
    pub rate: f64,
}

/// Classify an ordered pressure window by its least-squares slope.
///
/// Non-finite readings are dropped; fewer than two usable readings yield
/// `stable` / `0`.
pub fn get_pressure_rate(series: &[f64]) -> PressureRate {
    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_finite())
        .map(|(i, &p)| (i as f64, p))
        .collect();

    if points.len() < 2 {
        return PressureRate::default();
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let covariance: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let variance: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();

    let rate = if variance > 0.0 {
        covariance / variance
    } else {
        0.0
    };

    PressureRate {
        trend: PressureTrend::from_rate(rate),
        rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_single_are_stable() {
        assert_eq!(get_pressure_rate(&[]), PressureRate::default());
        let single = get_pressure_rate(&[1013.0]);
        assert_eq!(single.trend, PressureTrend::Stable);
        assert_eq!(single.rate, 0.0);
    }

    #[test]
    fn test_flat_series_is_stable() {
        let rate = get_pressure_rate(&[1016.0; 6]);
        assert_eq!(rate.trend, PressureTrend::Stable);
        assert!(rate.rate.abs() < 1e-12);
    }

    #[test]
    fn test_gentle_drift_is_stable() {
        let series: Vec<f64> = (0..6).map(|i| 1018.0 - 0.1 * i as f64).collect();
        let rate = get_pressure_rate(&series);
        assert_eq!(rate.trend, PressureTrend::Stable);
        assert!((rate.rate + 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_trend_buckets() {
        let series = |slope: f64| -> Vec<f64> { (0..6).map(|i| 1013.0 + slope * i as f64).collect() };

        assert_eq!(get_pressure_rate(&series(-1.0)).trend, PressureTrend::RapidFall);
        assert_eq!(get_pressure_rate(&series(-0.3)).trend, PressureTrend::Falling);
        assert_eq!(get_pressure_rate(&series(0.3)).trend, PressureTrend::Rising);
        assert_eq!(get_pressure_rate(&series(0.8)).trend, PressureTrend::RapidRise);
    }

    #[test]
    fn test_non_finite_readings_are_ignored() {
        let rate = get_pressure_rate(&[1013.0, f64::NAN, 1012.0, f64::INFINITY]);
        assert!(rate.rate.is_finite());
        assert_eq!(rate.trend, PressureTrend::RapidFall);
    }

    #[test]
    fn test_serialized_trend_names() {
        assert_eq!(
            serde_json::to_string(&PressureTrend::RapidFall).unwrap(),
            "\"rapid_fall\""
        );
        assert_eq!(PressureTrend::Falling.label(), "Falling");
    }
}
