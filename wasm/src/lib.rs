//! WebAssembly module for FishCast
//!
//! Provides client-side computation for:
//! - Water temperature estimates (surface and by depth)
//! - Pressure trends and solunar periods
//! - Fishing scores and the full forecast view
//! - Day-over-day stability, persisted in `window.localStorage`
//!
//! Structured inputs and outputs cross the boundary as camelCase JSON.

use chrono::{DateTime, NaiveDate, Utc};
use fishcast_engine::{
    EngineError, EngineResult, SpeciesProfile, StabilityController, StabilityInputs,
    StabilityStore, WaterBodyType, WaterTempReport, WeatherSnapshot,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ============================================================================
// Stability store
// ============================================================================

/// Stability records in the page's `localStorage`, one item per
/// `fishcast_stability_*` key
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> EngineResult<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| EngineError::Store("no window".to_string()))?
            .local_storage()
            .map_err(|_| EngineError::Store("localStorage access denied".to_string()))?
            .ok_or_else(|| EngineError::Store("localStorage unavailable".to_string()))
    }
}

impl StabilityStore for LocalStorageStore {
    fn get(&self, key: &str) -> EngineResult<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| EngineError::Store(format!("localStorage read failed for {}", key)))
    }

    fn put(&self, key: &str, value: String) -> EngineResult<()> {
        Self::storage()?
            .set_item(key, &value)
            .map_err(|_| EngineError::Store(format!("localStorage write failed for {}", key)))
    }
}

#[cfg(target_arch = "wasm32")]
type PageStore = LocalStorageStore;

// Native builds (tests, tooling) have no browser storage
#[cfg(not(target_arch = "wasm32"))]
type PageStore = fishcast_engine::MemoryStabilityStore;

thread_local! {
    static CONTROLLER: StabilityController<PageStore> = StabilityController::new(PageStore::default());
}

#[cfg(target_arch = "wasm32")]
fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
fn now() -> DateTime<Utc> {
    Utc::now()
}

// ============================================================================
// JSON plumbing
// ============================================================================

fn parse<T: for<'de> Deserialize<'de>>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn render<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Failed to serialize result: {}", e))
}

fn engine(err: EngineError) -> String {
    err.to_string()
}

fn to_js(result: Result<String, String>) -> Result<String, JsValue> {
    result.map_err(|e| JsValue::from_str(&e))
}

fn parse_water_body(value: &str) -> Result<WaterBodyType, String> {
    value.parse().map_err(engine)
}

// ============================================================================
// Inputs and outputs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WaterTempInput {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    water_body: WaterBodyType,
    date: NaiveDate,
    snapshot: WeatherSnapshot,
    #[serde(default)]
    reports: Vec<WaterTempReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WaterTempOutput {
    surface_f: f64,
    depth_10ft_f: f64,
    depth_20ft_f: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreInput {
    snapshot: WeatherSnapshot,
    water_temp_f: f64,
    species: String,
    moon_phase_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StabilityInput {
    base_score: f64,
    inputs: StabilityInputs,
    species_key: String,
    location_key: String,
    date_key: String,
    /// Evaluation time; defaults to the page clock
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DayScoreInput {
    snapshot: WeatherSnapshot,
    day_key: NaiveDate,
    species_key: String,
    water_temp_f: f64,
    location_key: String,
    /// Evaluation time; defaults to the page clock
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastInput {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    water_body: WaterBodyType,
    species: String,
    days: Option<usize>,
    #[serde(default)]
    reports: Vec<WaterTempReport>,
    snapshot: WeatherSnapshot,
    /// Evaluation time; defaults to the page clock
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

// ============================================================================
// Implementations (native-testable)
// ============================================================================

fn water_temp_json(input_json: &str) -> Result<String, String> {
    let input: WaterTempInput = parse(input_json, "water temperature input")?;
    let coords = fishcast_engine::Coordinates::new(input.latitude, input.longitude);
    let surface = fishcast_engine::estimate_water_temp_with_reports(
        &coords,
        input.water_body,
        input.date,
        &input.snapshot,
        &input.reports,
    );
    render(&WaterTempOutput {
        surface_f: surface,
        depth_10ft_f: fishcast_engine::estimate_temp_by_depth(surface, input.water_body, 10.0),
        depth_20ft_f: fishcast_engine::estimate_temp_by_depth(surface, input.water_body, 20.0),
    })
}

fn pressure_rate_json(readings_json: &str) -> Result<String, String> {
    let readings: Vec<f64> = parse(readings_json, "pressure readings")?;
    render(&fishcast_engine::get_pressure_rate(&readings))
}

fn solunar_json(latitude: f64, longitude: f64, date: &str) -> Result<String, String> {
    let date = fishcast_engine::parse_date_key(date).map_err(engine)?;
    render(&fishcast_engine::calculate_solunar(latitude, longitude, date))
}

fn score_json(input_json: &str) -> Result<String, String> {
    let input: ScoreInput = parse(input_json, "score input")?;
    let result = fishcast_engine::calculate_fishing_score(
        &input.snapshot,
        input.water_temp_f,
        &input.species,
        input.moon_phase_percent,
    )
    .map_err(engine)?;
    render(&result)
}

fn stability_json(input_json: &str) -> Result<String, String> {
    let input: StabilityInput = parse(input_json, "stability input")?;
    let outcome = CONTROLLER
        .with(|controller| {
            controller.apply_stability_controls(&fishcast_engine::StabilityRequest {
                base_score: input.base_score,
                inputs: input.inputs,
                species_key: &input.species_key,
                location_key: &input.location_key,
                date_key: &input.date_key,
                now: input.now.unwrap_or_else(now),
            })
        })
        .map_err(engine)?;
    render(&outcome)
}

fn day_score_json(input_json: &str) -> Result<String, String> {
    let input: DayScoreInput = parse(input_json, "day score input")?;
    let result = CONTROLLER
        .with(|controller| {
            controller.calculate_species_aware_day_score(&fishcast_engine::DayScoreRequest {
                snapshot: &input.snapshot,
                day_key: input.day_key,
                species_key: &input.species_key,
                water_temp_f: input.water_temp_f,
                location_key: &input.location_key,
                now: input.now.unwrap_or_else(now),
            })
        })
        .map_err(engine)?;
    render(&result)
}

fn forecast_json(input_json: &str) -> Result<String, String> {
    let input: ForecastInput = parse(input_json, "forecast input")?;
    fishcast_engine::validate_snapshot(&input.snapshot).map_err(engine)?;
    let coords =
        fishcast_engine::Coordinates::new(input.latitude, input.longitude).with_name(input.name);
    let view = CONTROLLER
        .with(|controller| {
            fishcast_engine::build_forecast_view(
                controller,
                &fishcast_engine::ForecastRequest {
                    coords: &coords,
                    water_body: input.water_body,
                    species_key: &input.species,
                    snapshot: &input.snapshot,
                    days: input.days.unwrap_or(fishcast_engine::DEFAULT_FORECAST_DAYS),
                    reports: &input.reports,
                    now: input.now.unwrap_or_else(now),
                },
            )
        })
        .map_err(engine)?;
    render(&view)
}

// ============================================================================
// Exports
// ============================================================================

/// Surface, 10 ft and 20 ft water temperature for a date
#[wasm_bindgen(js_name = estimateWaterTemp)]
pub fn estimate_water_temp(input_json: &str) -> Result<String, JsValue> {
    to_js(water_temp_json(input_json))
}

/// Temperature at `depth_ft` below a surface estimate
#[wasm_bindgen(js_name = estimateTempByDepth)]
pub fn estimate_temp_by_depth(
    surface_f: f64,
    water_body: &str,
    depth_ft: f64,
) -> Result<f64, JsValue> {
    let water_body = parse_water_body(water_body).map_err(|e| JsValue::from_str(&e))?;
    Ok(fishcast_engine::estimate_temp_by_depth(
        surface_f, water_body, depth_ft,
    ))
}

/// Trend and slope of a JSON array of pressure readings (hPa)
#[wasm_bindgen(js_name = getPressureRate)]
pub fn get_pressure_rate(readings_json: &str) -> Result<String, JsValue> {
    to_js(pressure_rate_json(readings_json))
}

/// Moon phase and feeding periods; `date` is `YYYY-MM-DD`
#[wasm_bindgen(js_name = calculateSolunar)]
pub fn calculate_solunar(latitude: f64, longitude: f64, date: &str) -> Result<String, JsValue> {
    to_js(solunar_json(latitude, longitude, date))
}

/// Moon illumination percent (0-100) for a date
#[wasm_bindgen(js_name = moonIllumination)]
pub fn moon_illumination(date: &str) -> Result<f64, JsValue> {
    fishcast_engine::parse_date_key(date)
        .map(fishcast_engine::moon_illumination)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Score "now" for a snapshot
#[wasm_bindgen(js_name = calculateFishingScore)]
pub fn calculate_fishing_score(input_json: &str) -> Result<String, JsValue> {
    to_js(score_json(input_json))
}

/// Damp a raw score against the stored record for its key
#[wasm_bindgen(js_name = applyStabilityControls)]
pub fn apply_stability_controls(input_json: &str) -> Result<String, JsValue> {
    to_js(stability_json(input_json))
}

/// Score one day and stabilize it
#[wasm_bindgen(js_name = calculateSpeciesAwareDayScore)]
pub fn calculate_species_aware_day_score(input_json: &str) -> Result<String, JsValue> {
    to_js(day_score_json(input_json))
}

/// Complete forecast view for a supplied snapshot
#[wasm_bindgen(js_name = buildForecastView)]
pub fn build_forecast_view(input_json: &str) -> Result<String, JsValue> {
    to_js(forecast_json(input_json))
}

/// Storage key of a stability record
#[wasm_bindgen(js_name = stabilityKey)]
pub fn stability_key(location_key: &str, species_key: &str, date_key: &str) -> String {
    fishcast_engine::stability_key(location_key, species_key, date_key)
}

/// Location component of a stability key
#[wasm_bindgen(js_name = locationKey)]
pub fn location_key(latitude: f64, longitude: f64) -> String {
    fishcast_engine::location_key(latitude, longitude)
}

/// Species catalogue as JSON
#[wasm_bindgen(js_name = listSpecies)]
pub fn list_species() -> String {
    serde_json::to_string(SpeciesProfile::all()).unwrap_or_else(|_| "[]".to_string())
}
