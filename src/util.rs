// Utility helpers for parsing and number formatting.
//
// This module centralizes the "dirty" CSV/spreadsheet value handling so the
// rest of the code can assume clean, typed values.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Tokens that spreadsheet and dataframe exports use for a missing value.
/// `None` is not among them: it is a valid injury severity label.
const MISSING_TOKENS: [&str; 5] = ["", "nan", "na", "n/a", "null"];

/// Trim a raw cell and return `None` if it represents a missing value.
pub fn present(s: Option<&str>) -> Option<&str> {
    let s = s?.trim();
    if MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t)) {
        return None;
    }
    Some(s)
}

/// Parse a numeric cell while being forgiving about thousands separators.
/// Non-finite results (`inf`) are rejected.
pub fn parse_f64(s: &str) -> Option<f64> {
    let s = s.trim().replace(',', "");
    let v = s.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Parse an integer lookup key.
///
/// Dataframe exports write integer columns that contain gaps as floats, so
/// `3.0` is accepted as `3`.
pub fn parse_key(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        return Some(f as i64);
    }
    None
}

/// Parse a date cell. Dates are expected as `YYYY-MM-DD`, optionally with a
/// time part which is discarded.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console output
    // (e.g., `12,345 collisions`).
    n.to_formatted_string(&Locale::en)
}
