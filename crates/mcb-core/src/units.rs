//! Unit conversion constants for emission rates
//!
//! The ancillary fields are consumed by a model running a fixed 360-day
//! calendar, so a "year" here is always 360 days of 86 400 s. Using a
//! Gregorian year would silently rescale every flux by 365.25/360.

/// Seconds in a model day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Days in a model year (360-day calendar)
pub const DAYS_PER_MODEL_YEAR: f64 = 360.0;

/// Seconds in a model year
///
/// unit: s / yr
pub const SECONDS_PER_MODEL_YEAR: f64 = DAYS_PER_MODEL_YEAR * SECONDS_PER_DAY;

/// Kilograms per teragram
pub const KG_PER_TG: f64 = 1.0e9;

/// Square metres per million square kilometres, used for reporting areas
pub const M2_PER_MILLION_KM2: f64 = 1.0e12;

/// Units attached to every flux field produced by this crate
pub const FLUX_UNITS: &str = "kg m-2 s-1";

/// Convert an annual mass in Tg/yr to a mass rate in kg/s.
pub fn tg_per_year_to_kg_per_second(tg_per_year: f64) -> f64 {
    tg_per_year * KG_PER_TG / SECONDS_PER_MODEL_YEAR
}

/// Convert a mass rate in kg/s to an annual mass in Tg/yr.
pub fn kg_per_second_to_tg_per_year(kg_per_second: f64) -> f64 {
    kg_per_second * SECONDS_PER_MODEL_YEAR / KG_PER_TG
}
