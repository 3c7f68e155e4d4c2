//! Score and solunar integration tests
//!
//! Tests for the score calculator and moon model including:
//! - Purity and boundedness of the score for any conditions
//! - Monotonic temperature preference per species
//! - Solunar output defined for every calendar date

mod common;

use common::{date, provider_snapshot};
use fishcast_engine::{
    calculate_fishing_score, calculate_solunar, get_pressure_rate, score_conditions,
    EngineError, PressureRate, PressureTrend, ScoringConditions, SpeciesProfile,
};
use proptest::prelude::*;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_snapshot_score_uses_provider_now() {
        let snapshot = provider_snapshot(date("2026-02-15"), 2, 18);
        let result = calculate_fishing_score(&snapshot, 50.0, "crappie", Some(12.0)).unwrap();

        // fixture pressure drops 0.25 hPa per hour
        assert_eq!(result.pressure_trend, PressureTrend::Falling);
        assert!(result.score <= 100);
    }

    #[test]
    fn test_unknown_species_is_explicit() {
        let snapshot = provider_snapshot(date("2026-02-15"), 1, 0);
        assert_eq!(
            calculate_fishing_score(&snapshot, 60.0, "muskellunge", None),
            Err(EngineError::UnknownSpecies("muskellunge".to_string()))
        );
    }

    #[test]
    fn test_species_prefer_their_own_water() {
        let snapshot = provider_snapshot(date("2026-02-15"), 1, 6);
        let trout_cold = calculate_fishing_score(&snapshot, 56.0, "rainbow_trout", None).unwrap();
        let catfish_cold = calculate_fishing_score(&snapshot, 56.0, "channel_catfish", None).unwrap();
        assert!(trout_cold.score > catfish_cold.score);
    }

    #[test]
    fn test_pressure_rate_of_provider_window() {
        let readings = [1018.0, 1017.2, 1016.1, 1015.0, 1014.2, 1013.0];
        let rate = get_pressure_rate(&readings);
        assert_eq!(rate.trend, PressureTrend::RapidFall);
        assert!(rate.rate < -0.9 && rate.rate > -1.1);
    }

    #[test]
    fn test_solunar_around_new_and_full_moon() {
        // 2026-02-17 new moon, 2026-03-03 full moon
        let new_moon = calculate_solunar(33.75, -84.39, date("2026-02-17"));
        let full_moon = calculate_solunar(33.75, -84.39, date("2026-03-03"));

        assert!(new_moon.moon_phase_percent < 5.0);
        assert_eq!(new_moon.moon_phase, "New Moon");
        assert!(full_moon.moon_phase_percent > 95.0);
        assert_eq!(full_moon.moon_phase, "Full Moon");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn species_strategy() -> impl Strategy<Value = &'static SpeciesProfile> {
        prop::sample::select(SpeciesProfile::all().iter().collect::<Vec<_>>())
    }

    fn trend_strategy() -> impl Strategy<Value = PressureTrend> {
        prop::sample::select(vec![
            PressureTrend::RapidFall,
            PressureTrend::Falling,
            PressureTrend::Stable,
            PressureTrend::Rising,
            PressureTrend::RapidRise,
        ])
    }

    fn conditions_strategy() -> impl Strategy<Value = ScoringConditions> {
        (
            trend_strategy(),
            950.0f64..1060.0,
            0.0f64..80.0,
            0.0f64..=100.0,
            0.0f64..=100.0,
            0u8..=99,
        )
            .prop_map(|(trend, pressure, wind, cloud, precip, code)| ScoringConditions {
                air_temp_f: 60.0,
                pressure_hpa: pressure,
                pressure: PressureRate { trend, rate: 0.0 },
                wind_mph: wind,
                wind_max_mph: wind * 1.5,
                wind_direction_deg: 90.0,
                cloud_cover: cloud,
                precip_probability: precip,
                weather_code: code,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Same inputs give the same, bounded result
        #[test]
        fn prop_score_pure_and_bounded(
            conditions in conditions_strategy(),
            species in species_strategy(),
            water in 20.0f64..110.0,
            moon in prop::option::of(0.0f64..=100.0),
        ) {
            let a = score_conditions(&conditions, water, species, moon);
            let b = score_conditions(&conditions, water, species, moon);
            prop_assert_eq!(&a, &b);
            prop_assert!(a.score <= 100);
            prop_assert_eq!(a.color_class.as_str(), a.rating.color_class());
        }

        /// Moving away from the optimum never raises the score
        #[test]
        fn prop_temperature_monotonic(
            conditions in conditions_strategy(),
            species in species_strategy(),
            offset in 0.0f64..40.0,
            extra in 0.0f64..20.0,
            below in any::<bool>(),
        ) {
            let sign = if below { -1.0 } else { 1.0 };
            let near = species.optimal_temp_f + sign * offset;
            let far = species.optimal_temp_f + sign * (offset + extra);
            let near_score = score_conditions(&conditions, near, species, None);
            let far_score = score_conditions(&conditions, far, species, None);
            prop_assert!(far_score.breakdown.temperature_fit <= near_score.breakdown.temperature_fit);
            prop_assert!(far_score.score <= near_score.score);
        }

        /// Solunar is well-formed for any date in four centuries
        #[test]
        fn prop_solunar_any_date(
            days in -73_000i64..73_000,
            lat in -90.0f64..=90.0,
            lon in -180.0f64..=180.0,
        ) {
            let day = date("2000-01-01") + chrono::Duration::days(days);
            let result = calculate_solunar(lat, lon, day);
            prop_assert!(result.moon_phase_percent.is_finite());
            prop_assert!((0.0..=100.0).contains(&result.moon_phase_percent));
            prop_assert!(!result.moon_phase.is_empty());
            for label in result.major_periods.iter().chain(result.minor_periods.iter()) {
                prop_assert!(label.contains(" - "));
            }
        }
    }
}
