//! Day-over-day score stability
//!
//! Each `location|species|date` key keeps the last score and the inputs it
//! was computed from. A new evaluation with materially unchanged inputs may
//! only move a capped distance from the stored score; a material change in
//! any tracked input relaxes the cap, and at twice the tolerance lifts it.
//! The stored record is overwritten on every evaluation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::conditions::resolve_day;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    clamp_score, ScoreResult, SpeciesProfile, StabilityBranch, StabilityInputs, StabilityOutcome,
    StabilityRecord, WeatherSnapshot,
};
use crate::scoring::score_conditions;
use crate::solunar::moon_illumination;

const KEY_PREFIX: &str = "fishcast_stability";

/// Lock table size above which idle per-key locks are dropped
const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// `fishcast_stability_<location>_<species>_<date>`
pub fn stability_key(location_key: &str, species_key: &str, date_key: &str) -> String {
    format!("{}_{}_{}_{}", KEY_PREFIX, location_key, species_key, date_key)
}

/// Key-value persistence for stability records (JSON strings)
pub trait StabilityStore {
    /// `Ok(None)` when the key has never been written
    fn get(&self, key: &str) -> EngineResult<Option<String>>;

    fn put(&self, key: &str, value: String) -> EngineResult<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStabilityStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

impl StabilityStore for MemoryStabilityStore {
    fn get(&self, key: &str) -> EngineResult<Option<String>> {
        Ok(self.records().get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> EngineResult<()> {
        self.records().insert(key.to_string(), value);
        Ok(())
    }
}

impl<S: StabilityStore + ?Sized> StabilityStore for Arc<S> {
    fn get(&self, key: &str) -> EngineResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: String) -> EngineResult<()> {
        (**self).put(key, value)
    }
}

/// One mutex per key so read-modify-write cycles on the same key serialize
/// while different keys proceed independently.
#[derive(Debug, Default)]
struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if locks.len() > LOCK_PRUNE_THRESHOLD {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks.entry(key.to_string()).or_default().clone()
    }
}

/// Damping cap and per-input tolerances
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StabilityConfig {
    /// Largest move (score points) allowed from the stored score when inputs
    /// are within tolerance
    pub max_damped_change: f64,
    pub pressure_tolerance_hpa: f64,
    pub wind_tolerance_kmh: f64,
    pub precip_tolerance: f64,
    pub cloud_tolerance: f64,
    pub air_temp_tolerance_f: f64,
    pub water_temp_tolerance_f: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            max_damped_change: 10.0,
            pressure_tolerance_hpa: 3.0,
            wind_tolerance_kmh: 8.0,
            precip_tolerance: 15.0,
            cloud_tolerance: 20.0,
            air_temp_tolerance_f: 4.0,
            water_temp_tolerance_f: 2.0,
        }
    }
}

impl StabilityConfig {
    /// Largest input shift as a multiple of its tolerance
    pub fn change_ratio(&self, previous: &StabilityInputs, current: &StabilityInputs) -> f64 {
        let pairs = [
            (previous.pressure_avg, current.pressure_avg, self.pressure_tolerance_hpa),
            (previous.wind_avg_kmh, current.wind_avg_kmh, self.wind_tolerance_kmh),
            (previous.precip_prob_avg, current.precip_prob_avg, self.precip_tolerance),
            (previous.cloud_avg, current.cloud_avg, self.cloud_tolerance),
            (previous.temp_avg_f, current.temp_avg_f, self.air_temp_tolerance_f),
            (previous.water_temp_f, current.water_temp_f, self.water_temp_tolerance_f),
        ];
        pairs
            .iter()
            .map(|&(old, new, tolerance)| {
                let shift = (new - old).abs();
                if !shift.is_finite() {
                    f64::INFINITY
                } else if tolerance > 0.0 {
                    shift / tolerance
                } else if shift > 0.0 {
                    f64::INFINITY
                } else {
                    0.0
                }
            })
            .fold(0.0, f64::max)
    }

    /// Damping cap with unusable settings replaced: negative becomes zero,
    /// non-finite falls back to the default
    fn damped_cap(&self) -> f64 {
        if self.max_damped_change.is_finite() {
            self.max_damped_change.max(0.0)
        } else {
            Self::default().max_damped_change
        }
    }

    /// Allowed move from the stored score; `None` when uncapped
    fn allowed_change(&self, change_ratio: f64) -> Option<f64> {
        let cap = self.damped_cap();
        if change_ratio <= 1.0 {
            Some(cap)
        } else if change_ratio < 2.0 {
            Some(cap * (1.0 + 2.0 * (change_ratio - 1.0)))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct StabilityRequest<'a> {
    pub base_score: f64,
    pub inputs: StabilityInputs,
    pub species_key: &'a str,
    pub location_key: &'a str,
    /// `YYYY-MM-DD`
    pub date_key: &'a str,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DayScoreRequest<'a> {
    pub snapshot: &'a WeatherSnapshot,
    pub day_key: NaiveDate,
    pub species_key: &'a str,
    pub water_temp_f: f64,
    pub location_key: &'a str,
    pub now: DateTime<Utc>,
}

/// Stability state machine over an injected store
#[derive(Debug)]
pub struct StabilityController<S> {
    store: S,
    config: StabilityConfig,
    locks: KeyedLocks,
}

impl<S: StabilityStore> StabilityController<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, StabilityConfig::default())
    }

    pub fn with_config(store: S, config: StabilityConfig) -> Self {
        Self {
            store,
            config,
            locks: KeyedLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    /// Stored record for `key`, or `None` if absent, unreadable or corrupt
    fn load(&self, key: &str) -> Option<StabilityRecord> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "stability store read failed, treating as absent");
                return None;
            }
        };
        match serde_json::from_str::<StabilityRecord>(&raw) {
            Ok(record) if record.score.is_finite() && record.inputs.is_finite() => Some(record),
            Ok(_) => {
                tracing::warn!(key, "stability record has non-finite values, resetting");
                None
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt stability record, resetting");
                None
            }
        }
    }

    fn save(&self, key: &str, record: &StabilityRecord) {
        let result = serde_json::to_string(record)
            .map_err(|e| EngineError::Store(e.to_string()))
            .and_then(|json| self.store.put(key, json));
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "failed to persist stability record");
        }
    }

    /// Damp `base_score` against the stored record for the request's key and
    /// overwrite that record with the result.
    ///
    /// Fails only for an unknown species.
    pub fn apply_stability_controls(
        &self,
        request: &StabilityRequest<'_>,
    ) -> EngineResult<StabilityOutcome> {
        let species = SpeciesProfile::lookup(request.species_key)?;
        let key = stability_key(request.location_key, species.key, request.date_key);
        let raw_score = clamp_score(request.base_score);

        let lock = self.locks.lock_for(&key);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let outcome = match self.load(&key) {
            None => StabilityOutcome {
                score: raw_score,
                raw_score,
                previous_score: None,
                branch: StabilityBranch::Fresh,
                change_ratio: 0.0,
            },
            Some(previous) => {
                let change_ratio = self.config.change_ratio(&previous.inputs, &request.inputs);
                let score = match self.config.allowed_change(change_ratio) {
                    Some(cap) => raw_score.clamp(previous.score - cap, previous.score + cap),
                    None => raw_score,
                };
                StabilityOutcome {
                    score: clamp_score(score),
                    raw_score,
                    previous_score: Some(previous.score),
                    branch: if change_ratio <= 1.0 {
                        StabilityBranch::Damped
                    } else {
                        StabilityBranch::RegimeChange
                    },
                    change_ratio,
                }
            }
        };

        tracing::debug!(
            key = %key,
            branch = ?outcome.branch,
            raw = outcome.raw_score,
            score = outcome.score,
            change_ratio = outcome.change_ratio,
            "applied stability controls"
        );

        self.save(
            &key,
            &StabilityRecord {
                score: outcome.score,
                inputs: request.inputs,
                updated_at: request.now,
            },
        );
        Ok(outcome)
    }

    /// Score one forecast day for a species and pass it through stability
    /// controls keyed by the day.
    pub fn calculate_species_aware_day_score(
        &self,
        request: &DayScoreRequest<'_>,
    ) -> EngineResult<ScoreResult> {
        let species = SpeciesProfile::lookup(request.species_key)?;
        let day = resolve_day(request.snapshot, request.day_key);
        let moon = moon_illumination(request.day_key);
        let result = score_conditions(&day.conditions, request.water_temp_f, species, Some(moon));

        let date_key = request.day_key.format("%Y-%m-%d").to_string();
        let outcome = self.apply_stability_controls(&StabilityRequest {
            base_score: f64::from(result.score),
            inputs: day.stability_inputs(request.water_temp_f),
            species_key: species.key,
            location_key: request.location_key,
            date_key: &date_key,
            now: request.now,
        })?;

        let mut result = result.with_score(outcome.score);
        result.stability = Some(outcome);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> StabilityInputs {
        StabilityInputs {
            pressure_avg: 1016.0,
            wind_avg_kmh: 12.0,
            precip_prob_avg: 20.0,
            cloud_avg: 40.0,
            temp_avg_f: 68.0,
            water_temp_f: 66.0,
        }
    }

    fn request(base_score: f64, inputs: StabilityInputs) -> StabilityRequest<'static> {
        StabilityRequest {
            base_score,
            inputs,
            species_key: "bluegill",
            location_key: "33.750_-84.390",
            date_key: "2026-05-11",
            now: Utc::now(),
        }
    }

    const KEY: &str = "fishcast_stability_33.750_-84.390_bluegill_2026-05-11";

    struct FailingStore;

    impl StabilityStore for FailingStore {
        fn get(&self, _key: &str) -> EngineResult<Option<String>> {
            Err(EngineError::Store("unavailable".to_string()))
        }

        fn put(&self, _key: &str, _value: String) -> EngineResult<()> {
            Err(EngineError::Store("unavailable".to_string()))
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(stability_key("33.750_-84.390", "bluegill", "2026-05-11"), KEY);
    }

    #[test]
    fn test_first_evaluation_passes_through_and_writes() {
        let controller = StabilityController::new(MemoryStabilityStore::new());
        let outcome = controller.apply_stability_controls(&request(72.0, inputs())).unwrap();

        assert_eq!(outcome.branch, StabilityBranch::Fresh);
        assert_eq!(outcome.score, 72.0);
        let stored: StabilityRecord =
            serde_json::from_str(&controller.store().get(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.score, 72.0);
        assert_eq!(stored.inputs, inputs());
    }

    #[test]
    fn test_unchanged_inputs_are_damped() {
        let controller = StabilityController::new(MemoryStabilityStore::new());
        controller.apply_stability_controls(&request(20.0, inputs())).unwrap();
        let outcome = controller.apply_stability_controls(&request(100.0, inputs())).unwrap();

        assert_eq!(outcome.branch, StabilityBranch::Damped);
        assert_eq!(outcome.previous_score, Some(20.0));
        assert_eq!(outcome.score, 30.0);
    }

    #[test]
    fn test_unusable_damping_cap_is_sanitized() {
        for (cap, expected) in [(-1.0, 20.0), (f64::NAN, 30.0), (f64::INFINITY, 30.0)] {
            let config = StabilityConfig {
                max_damped_change: cap,
                ..Default::default()
            };
            let controller = StabilityController::with_config(MemoryStabilityStore::new(), config);
            controller.apply_stability_controls(&request(20.0, inputs())).unwrap();
            let outcome = controller.apply_stability_controls(&request(100.0, inputs())).unwrap();
            assert_eq!(outcome.score, expected, "cap {cap}");
        }
    }

    #[test]
    fn test_regime_change_relaxes_then_lifts_cap() {
        let controller = StabilityController::new(MemoryStabilityStore::new());
        controller.apply_stability_controls(&request(20.0, inputs())).unwrap();

        let mut shifted = inputs();
        shifted.water_temp_f += 3.0;
        let relaxed = controller.apply_stability_controls(&request(100.0, shifted)).unwrap();
        assert_eq!(relaxed.branch, StabilityBranch::RegimeChange);
        assert!((relaxed.change_ratio - 1.5).abs() < 1e-9);
        assert!((relaxed.score - 40.0).abs() < 1e-9);

        let mut regime = shifted;
        regime.water_temp_f += 5.0;
        let lifted = controller.apply_stability_controls(&request(100.0, regime)).unwrap();
        assert_eq!(lifted.score, 100.0);
    }

    #[test]
    fn test_record_is_overwritten_every_time() {
        let controller = StabilityController::new(MemoryStabilityStore::new());
        controller.apply_stability_controls(&request(20.0, inputs())).unwrap();
        controller.apply_stability_controls(&request(100.0, inputs())).unwrap();
        controller.apply_stability_controls(&request(100.0, inputs())).unwrap();

        let stored: StabilityRecord =
            serde_json::from_str(&controller.store().get(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.score, 40.0);
        assert_eq!(controller.store().len(), 1);
    }

    #[test]
    fn test_corrupt_record_is_treated_as_absent() {
        let store = MemoryStabilityStore::new();
        store.put(KEY, "{not json".to_string()).unwrap();
        let controller = StabilityController::new(store);

        let outcome = controller.apply_stability_controls(&request(88.0, inputs())).unwrap();
        assert_eq!(outcome.branch, StabilityBranch::Fresh);
        assert_eq!(outcome.score, 88.0);
    }

    #[test]
    fn test_failing_store_never_fails_the_evaluation() {
        let controller = StabilityController::new(FailingStore);
        let outcome = controller.apply_stability_controls(&request(61.0, inputs())).unwrap();
        assert_eq!(outcome.score, 61.0);
    }

    #[test]
    fn test_unknown_species_is_rejected() {
        let controller = StabilityController::new(MemoryStabilityStore::new());
        let mut req = request(50.0, inputs());
        req.species_key = "kraken";
        assert_eq!(
            controller.apply_stability_controls(&req),
            Err(EngineError::UnknownSpecies("kraken".to_string()))
        );
        assert!(controller.store().is_empty());
    }

    #[test]
    fn test_non_finite_base_score_is_neutral() {
        let controller = StabilityController::new(MemoryStabilityStore::new());
        let outcome = controller.apply_stability_controls(&request(f64::NAN, inputs())).unwrap();
        assert_eq!(outcome.score, 50.0);
    }

    #[test]
    fn test_concurrent_same_key_evaluations_stay_within_cap() {
        let controller = StabilityController::new(MemoryStabilityStore::new());
        controller.apply_stability_controls(&request(20.0, inputs())).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    controller.apply_stability_controls(&request(100.0, inputs())).unwrap();
                });
            }
        });

        // eight serialized damped steps of 10 points each
        let stored: StabilityRecord =
            serde_json::from_str(&controller.store().get(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.score, 100.0);
    }

    #[test]
    fn test_day_score_carries_stability_outcome() {
        let controller = StabilityController::new(MemoryStabilityStore::new());
        let snapshot = WeatherSnapshot::default();
        let day = NaiveDate::from_ymd_opt(2026, 5, 11).unwrap();
        let req = DayScoreRequest {
            snapshot: &snapshot,
            day_key: day,
            species_key: "largemouth_bass",
            water_temp_f: 70.0,
            location_key: "33.750_-84.390",
            now: Utc::now(),
        };

        let first = controller.calculate_species_aware_day_score(&req).unwrap();
        let again = controller.calculate_species_aware_day_score(&req).unwrap();
        assert_eq!(first.stability.as_ref().map(|s| s.branch), Some(StabilityBranch::Fresh));
        assert_eq!(again.stability.as_ref().map(|s| s.branch), Some(StabilityBranch::Damped));
        assert_eq!(first.score, again.score);
    }
}
