//! Moon phase and solunar feeding periods
//!
//! Phase comes from a mean synodic month counted from a reference new moon,
//! so it is defined for every calendar date. Major periods are the two hours
//! centred on lunar transit and underfoot; minor periods are the hour
//! centred on moonrise and moonset. Times are local clock times for the
//! supplied UTC offset.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Mean synodic month, days
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_853;

/// Mean tropical month, days (declination cycle)
const TROPICAL_MONTH_DAYS: f64 = 27.321_582;

/// Maximum lunar declination, degrees
const MAX_DECLINATION_DEG: f64 = 23.44;

/// Mean lunar day, hours
const LUNAR_DAY_HOURS: f64 = 24.0 + 50.0 / 60.0;

const MAJOR_HALF_WIDTH_MIN: i64 = 60;
const MINOR_HALF_WIDTH_MIN: i64 = 30;

const CLOCK_FORMAT: &str = "%-I:%M %p";

/// Reference new moon: 2000-01-06 18:14 UTC
fn reference_new_moon() -> NaiveDateTime {
    Utc.with_ymd_and_hms(2000, 1, 6, 18, 14, 0)
        .single()
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}

/// Eight named moon phases
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// Phase for a fraction of the synodic month (0 = new, 0.5 = full)
    pub fn from_cycle_fraction(fraction: f64) -> Self {
        let f = if fraction.is_finite() { fraction.rem_euclid(1.0) } else { 0.0 };
        match f {
            f if !(0.0339..0.9661).contains(&f) => MoonPhase::NewMoon,
            f if f < 0.216 => MoonPhase::WaxingCrescent,
            f if f < 0.284 => MoonPhase::FirstQuarter,
            f if f < 0.466 => MoonPhase::WaxingGibbous,
            f if f < 0.534 => MoonPhase::FullMoon,
            f if f < 0.716 => MoonPhase::WaningGibbous,
            f if f < 0.784 => MoonPhase::LastQuarter,
            _ => MoonPhase::WaningCrescent,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }
}

impl std::fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A local clock-time window; `end` may wrap past midnight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SolunarWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SolunarWindow {
    fn around(center: NaiveTime, half_width_min: i64) -> Self {
        let half = Duration::minutes(half_width_min);
        Self {
            start: center.overflowing_sub_signed(half).0,
            end: center.overflowing_add_signed(half).0,
        }
    }

    /// `"5:30 AM - 7:30 AM"`
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format(CLOCK_FORMAT),
            self.end.format(CLOCK_FORMAT)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolunarResult {
    pub moon_phase: String,
    /// Illuminated fraction of the disc, 0-100
    pub moon_phase_percent: f64,
    /// Days since the last new moon
    pub moon_age_days: f64,
    pub major_periods: [String; 2],
    pub minor_periods: [String; 2],
    pub moon_transit: String,
    pub moonrise: String,
    pub moonset: String,
}

/// Lunar age in days at `instant` (UTC)
fn moon_age_at(instant: NaiveDateTime) -> f64 {
    let elapsed = (instant - reference_new_moon()).num_seconds() as f64 / 86_400.0;
    elapsed.rem_euclid(SYNODIC_MONTH_DAYS)
}

fn noon_utc(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
}

/// Illuminated percentage of the moon at noon UTC on `date`
pub fn moon_illumination(date: NaiveDate) -> f64 {
    illumination_for_age(moon_age_at(noon_utc(date)))
}

fn illumination_for_age(age: f64) -> f64 {
    let angle = 2.0 * std::f64::consts::PI * age / SYNODIC_MONTH_DAYS;
    ((1.0 - angle.cos()) / 2.0 * 100.0).clamp(0.0, 100.0)
}

/// Approximate lunar declination, degrees
fn declination_deg(instant: NaiveDateTime) -> f64 {
    let elapsed = (instant - reference_new_moon()).num_seconds() as f64 / 86_400.0;
    MAX_DECLINATION_DEG * (2.0 * std::f64::consts::PI * elapsed / TROPICAL_MONTH_DAYS).sin()
}

/// Hours between moonrise and transit for a latitude and declination
fn semi_arc_hours(latitude: f64, declination: f64) -> f64 {
    let lat = latitude.clamp(-89.9, 89.9).to_radians();
    let cos_h = (-lat.tan() * declination.to_radians().tan()).clamp(-1.0, 1.0);
    cos_h.acos().to_degrees() / 15.0 * (LUNAR_DAY_HOURS / 24.0)
}

fn clock_time(hours: f64) -> NaiveTime {
    let seconds = (hours * 3600.0).round() as i64;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds.rem_euclid(86_400) as u32, 0)
        .unwrap_or_default()
}

fn ordered(a: SolunarWindow, b: SolunarWindow) -> [String; 2] {
    if a.start <= b.start {
        [a.label(), b.label()]
    } else {
        [b.label(), a.label()]
    }
}

/// Solunar summary with period labels in the location's nominal time zone
/// (longitude / 15 hours).
pub fn calculate_solunar(latitude: f64, longitude: f64, date: NaiveDate) -> SolunarResult {
    let offset_hours = if longitude.is_finite() {
        (longitude.clamp(-180.0, 180.0) / 15.0).round()
    } else {
        0.0
    };
    calculate_solunar_with_offset(latitude, date, (offset_hours * 3600.0) as i32)
}

/// Solunar summary with period labels in a known UTC offset
pub fn calculate_solunar_with_offset(
    latitude: f64,
    date: NaiveDate,
    utc_offset_seconds: i32,
) -> SolunarResult {
    let latitude = if latitude.is_finite() { latitude } else { 0.0 };
    let noon = noon_utc(date);
    // no local noon exists past chrono's range; the UTC one stands in
    let local_noon = noon
        .checked_sub_signed(Duration::seconds(i64::from(utc_offset_seconds)))
        .unwrap_or(noon);
    let age = moon_age_at(local_noon);
    let fraction = age / SYNODIC_MONTH_DAYS;

    // the moon transits with the sun at new moon and slips back ~50 min/day
    let transit_hours = 12.0 + fraction * LUNAR_DAY_HOURS;
    let underfoot_hours = transit_hours + LUNAR_DAY_HOURS / 2.0;
    let arc = semi_arc_hours(latitude, declination_deg(local_noon));

    let transit = clock_time(transit_hours);
    let moonrise = clock_time(transit_hours - arc);
    let moonset = clock_time(transit_hours + arc);

    SolunarResult {
        moon_phase: MoonPhase::from_cycle_fraction(fraction).label().to_string(),
        moon_phase_percent: illumination_for_age(age),
        moon_age_days: age,
        major_periods: ordered(
            SolunarWindow::around(transit, MAJOR_HALF_WIDTH_MIN),
            SolunarWindow::around(clock_time(underfoot_hours), MAJOR_HALF_WIDTH_MIN),
        ),
        minor_periods: ordered(
            SolunarWindow::around(moonrise, MINOR_HALF_WIDTH_MIN),
            SolunarWindow::around(moonset, MINOR_HALF_WIDTH_MIN),
        ),
        moon_transit: transit.format(CLOCK_FORMAT).to_string(),
        moonrise: moonrise.format(CLOCK_FORMAT).to_string(),
        moonset: moonset.format(CLOCK_FORMAT).to_string(),
    }
}
