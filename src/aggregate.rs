//! Descriptive statistics over a (possibly filtered) collision table.
//!
//! Every function is pure and takes the table by slice. Name-based variants
//! (`*_column`) resolve a column name first and fail with
//! [`AggregateError`] when it does not exist.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::error::AggregateError;
use crate::types::{Attribute, CollisionRecord, CountRow, MapPoint, Measure, WEEKDAYS};

/// Placeholder returned by [`mode`] when there is nothing to count.
pub const NOT_AVAILABLE: &str = "N/A";

#[must_use]
pub fn count(table: &[CollisionRecord]) -> usize {
    table.len()
}

/// Sum of a numeric column; missing values count as zero.
#[must_use]
pub fn sum_numeric(table: &[CollisionRecord], measure: Measure) -> f64 {
    table.iter().filter_map(|r| r.measure(measure)).sum()
}

/// # Errors
///
/// Returns [`AggregateError::UnknownColumn`] for an unknown column name.
pub fn sum_column(table: &[CollisionRecord], column: &str) -> Result<f64, AggregateError> {
    Ok(sum_numeric(table, Measure::from_column(column)?))
}

#[must_use]
pub fn count_where<F>(table: &[CollisionRecord], predicate: F) -> usize
where
    F: Fn(&CollisionRecord) -> bool,
{
    table.iter().filter(|r| predicate(r)).count()
}

/// Rows where `measure` is strictly positive.
#[must_use]
pub fn count_positive(table: &[CollisionRecord], measure: Measure) -> usize {
    count_where(table, |r| r.measure(measure).is_some_and(|v| v > 0.0))
}

/// Counts of every non-missing value, ascending by value (numerically for
/// years).
fn value_counts(table: &[CollisionRecord], attr: Attribute) -> Vec<(String, usize)> {
    if attr == Attribute::Year {
        let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
        for y in table.iter().filter_map(CollisionRecord::year) {
            *counts.entry(y).or_default() += 1;
        }
        return counts.into_iter().map(|(y, c)| (y.to_string(), c)).collect();
    }
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in table.iter().filter_map(|r| r.text(attr)) {
        *counts.entry(v).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(v, c)| (v.to_string(), c))
        .collect()
}

/// Most frequent non-missing value, or `"N/A"`.
///
/// Ties go to the smallest value (numeric for years, lexicographic for
/// labels).
#[must_use]
pub fn mode(table: &[CollisionRecord], attr: Attribute) -> String {
    let mut best: Option<(String, usize)> = None;
    for (value, c) in value_counts(table, attr) {
        if best.as_ref().map_or(true, |(_, top)| c > *top) {
            best = Some((value, c));
        }
    }
    best.map_or_else(|| NOT_AVAILABLE.to_string(), |(value, _)| value)
}

/// # Errors
///
/// Returns [`AggregateError::UnknownColumn`] for an unknown column name.
pub fn mode_column(table: &[CollisionRecord], column: &str) -> Result<String, AggregateError> {
    Ok(mode(table, Attribute::from_column(column)?))
}

/// Row count per value.
///
/// Weekdays come back Monday through Sunday with zero counts filled in;
/// weekday values outside those seven are dropped. Every other attribute is
/// ordered by descending count, ties by ascending value.
#[must_use]
pub fn group_count(table: &[CollisionRecord], attr: Attribute) -> Vec<CountRow> {
    let counts = value_counts(table, attr);
    if attr == Attribute::Weekday {
        let dropped: usize = counts
            .iter()
            .filter(|(v, _)| !WEEKDAYS.contains(&v.as_str()))
            .map(|(_, c)| c)
            .sum();
        if dropped > 0 {
            log::warn!("Ignoring {} rows with a non-canonical weekday", dropped);
        }
        return WEEKDAYS
            .iter()
            .map(|day| CountRow {
                label: (*day).to_string(),
                count: counts
                    .iter()
                    .find(|(v, _)| v == day)
                    .map_or(0, |(_, c)| *c),
            })
            .collect();
    }
    let mut rows: Vec<CountRow> = counts
        .into_iter()
        .map(|(label, count)| CountRow { label, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// # Errors
///
/// Returns [`AggregateError::UnknownColumn`] for an unknown column name.
pub fn group_count_column(
    table: &[CollisionRecord],
    column: &str,
) -> Result<Vec<CountRow>, AggregateError> {
    Ok(group_count(table, Attribute::from_column(column)?))
}

/// Collisions per calendar month (`YYYY-MM`), oldest first. Rows without a
/// date are not counted.
#[must_use]
pub fn monthly_counts(table: &[CollisionRecord]) -> Vec<CountRow> {
    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for d in table.iter().filter_map(|r| r.accident_date) {
        *months.entry((d.year(), d.month())).or_default() += 1;
    }
    months
        .into_iter()
        .map(|((y, m), count)| CountRow {
            label: format!("{y:04}-{m:02}"),
            count,
        })
        .collect()
}

/// Mean of `measure` per row; `0.0` for an empty table.
#[must_use]
pub fn rate(table: &[CollisionRecord], measure: Measure) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    sum_numeric(table, measure) / table.len() as f64
}

/// `rate(filtered) - rate(overall)`; positive means above the baseline.
#[must_use]
pub fn compare_rate(
    filtered: &[CollisionRecord],
    overall: &[CollisionRecord],
    measure: Measure,
) -> f64 {
    rate(filtered, measure) - rate(overall, measure)
}

/// # Errors
///
/// Returns [`AggregateError::UnknownColumn`] for an unknown column name.
pub fn compare_rate_column(
    filtered: &[CollisionRecord],
    overall: &[CollisionRecord],
    column: &str,
) -> Result<f64, AggregateError> {
    Ok(compare_rate(filtered, overall, Measure::from_column(column)?))
}

/// Coordinates of every row that has both latitude and longitude.
#[must_use]
pub fn map_points(table: &[CollisionRecord]) -> Vec<MapPoint> {
    table
        .iter()
        .filter_map(|r| match (r.lat, r.long) {
            (Some(lat), Some(longitude)) => Some(MapPoint { lat, longitude }),
            _ => None,
        })
        .collect()
}
