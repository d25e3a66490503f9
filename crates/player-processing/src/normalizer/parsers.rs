//! Free-text cell parsers.
//!
//! Every parser is total: malformed input degrades to `None` (or `0.0` for
//! currency) and never returns an error.

use crate::utils::round_to;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

const CM_PER_INCH: f64 = 2.54;
const KG_PER_LB: f64 = 0.453592;
const WEIGHT_SUFFIX: &str = "lbs";

// Anything that is not part of a numeral or a magnitude suffix, e.g. the
// euro sign in whatever encoding the source used.
static CURRENCY_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\d.KMkm]").expect("Invalid regex: currency noise"));

static YEAR_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}$").expect("Invalid regex: year only"));

const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a `5'11` style height into centimetres, rounded to 2 decimals.
pub fn parse_height_cm(raw: Option<&str>) -> Option<f64> {
    let (feet, inches) = raw?.split_once('\'')?;
    let feet: i64 = feet.trim().parse().ok()?;
    let inches: i64 = inches.trim().parse().ok()?;

    let total_inches = feet.checked_mul(12)?.checked_add(inches)?;
    Some(round_to(total_inches as f64 * CM_PER_INCH, 2))
}

/// Parse a `165lbs` style weight into kilograms, rounded to 2 decimals.
pub fn parse_weight_kg(raw: Option<&str>) -> Option<f64> {
    let lbs: f64 = raw?.replace(WEIGHT_SUFFIX, "").trim().parse().ok()?;
    if !lbs.is_finite() {
        return None;
    }
    Some(round_to(lbs * KG_PER_LB, 2))
}

/// Parse currency shorthand (`€100K`, `€10.5M`) into plain units.
///
/// Absent or unreadable amounts are worth `0.0`; currency never stays missing.
pub fn parse_currency(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };

    let cleaned = CURRENCY_NOISE.replace_all(raw.trim(), "").to_ascii_uppercase();
    if cleaned.is_empty() {
        return 0.0;
    }

    let (numeral, multiplier) = if cleaned.contains('M') {
        (cleaned.replace('M', ""), 1_000_000.0)
    } else if cleaned.contains('K') {
        (cleaned.replace('K', ""), 1_000.0)
    } else {
        (cleaned, 1.0)
    };

    numeral
        .parse::<f64>()
        .map(|value| value * multiplier)
        .unwrap_or(0.0)
}

/// Parse a calendar date in any of the formats seen in the source data.
///
/// A bare four-digit year resolves to January 1 of that year.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }

    if YEAR_ONLY.is_match(value) {
        return value
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse a contract end date; a bare year means the contract runs to December 31.
pub fn parse_contract_end(raw: Option<&str>) -> Option<NaiveDate> {
    let value = raw?.trim();

    if YEAR_ONLY.is_match(value) {
        return value
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 12, 31));
    }

    parse_date(Some(value))
}
