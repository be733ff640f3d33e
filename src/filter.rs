//! Filter domains and the multi-attribute filter engine.
//!
//! A [`Selection`] maps attributes to the values a row must match. Values
//! of one attribute are alternatives (OR); attributes combine with AND; an
//! attribute with no selected values does not restrict anything. The global
//! dashboard filter and the map filter are two independent selections
//! applied to the same table.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::FilterError;
use crate::types::{Attribute, CollisionRecord};

/// Attributes offered by the global sidebar filter, in display order.
pub const GLOBAL_FILTERS: [Attribute; 7] = [
    Attribute::Year,
    Attribute::Weekday,
    Attribute::LocationType,
    Attribute::Light,
    Attribute::InitialImpactType,
    Attribute::EnvironmentCondition,
    Attribute::RoadSurfaceCondition,
];

/// Attributes offered by the map filter, in display order.
pub const MAP_FILTERS: [Attribute; 5] = [
    Attribute::Year,
    Attribute::LocationType,
    Attribute::Light,
    Attribute::EnvironmentCondition,
    Attribute::RoadSurfaceCondition,
];

/// Selected values per attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    years: BTreeSet<i32>,
    labels: BTreeMap<Attribute, BTreeSet<String>>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value for `attr`. Years are given as text (`"2019"`).
    /// Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidYear`] if `attr` is `Year` and the value
    /// is not an integer.
    pub fn select(&mut self, attr: Attribute, value: &str) -> Result<(), FilterError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        if attr == Attribute::Year {
            let year = value
                .parse::<i32>()
                .map_err(|_| FilterError::InvalidYear(value.to_string()))?;
            self.years.insert(year);
        } else {
            self.labels
                .entry(attr)
                .or_default()
                .insert(value.to_string());
        }
        Ok(())
    }

    pub fn select_year(&mut self, year: i32) {
        self.years.insert(year);
    }

    /// Builder form of [`Selection::select`] for several values.
    ///
    /// # Errors
    ///
    /// See [`Selection::select`].
    pub fn with<I, S>(mut self, attr: Attribute, values: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for v in values {
            self.select(attr, v.as_ref())?;
        }
        Ok(self)
    }

    /// Parse `column=value` pairs, e.g. `light=Daylight` or `year=2019`.
    ///
    /// # Errors
    ///
    /// Fails on a pair without `=`, an unknown column, or an invalid year.
    pub fn parse_pairs<I, S>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (column, value) = pair
                .split_once('=')
                .ok_or_else(|| crate::error::UnknownColumn(pair.to_string()))?;
            selection.select(Attribute::from_column(column)?, value)?;
        }
        Ok(selection)
    }

    /// Forget the values selected for one attribute.
    pub fn clear(&mut self, attr: Attribute) {
        if attr == Attribute::Year {
            self.years.clear();
        } else {
            self.labels.remove(&attr);
        }
    }

    /// Forget every selected value.
    pub fn reset(&mut self) {
        self.years.clear();
        self.labels.clear();
    }

    /// `true` when no attribute restricts the rows.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.years.is_empty() && self.labels.values().all(BTreeSet::is_empty)
    }

    /// Selected values for `attr`, in ascending order.
    #[must_use]
    pub fn values(&self, attr: Attribute) -> Vec<String> {
        if attr == Attribute::Year {
            self.years.iter().map(ToString::to_string).collect()
        } else {
            self.labels
                .get(&attr)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default()
        }
    }

    /// Whether one record satisfies every non-empty attribute selection.
    #[must_use]
    pub fn matches(&self, record: &CollisionRecord) -> bool {
        if !self.years.is_empty() && !record.year().is_some_and(|y| self.years.contains(&y)) {
            return false;
        }
        self.labels.iter().all(|(attr, allowed)| {
            allowed.is_empty()
                || record
                    .text(*attr)
                    .is_some_and(|v| allowed.contains(v))
        })
    }
}

/// Rows of `table` matching `selection`, in their original order.
///
/// The input is never modified; the result is an independent copy.
#[must_use]
pub fn apply(table: &[CollisionRecord], selection: &Selection) -> Vec<CollisionRecord> {
    if selection.is_unrestricted() {
        return table.to_vec();
    }
    let filtered: Vec<CollisionRecord> = table
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect();
    log::debug!("Filter kept {} of {} rows", filtered.len(), table.len());
    filtered
}

/// Distinct non-missing values of each attribute, sorted ascending
/// (numerically for years, lexicographically for labels).
#[must_use]
pub fn domains(
    table: &[CollisionRecord],
    attributes: &[Attribute],
) -> BTreeMap<Attribute, Vec<String>> {
    attributes
        .iter()
        .map(|&attr| (attr, domain(table, attr)))
        .collect()
}

/// Distinct sorted values of a single attribute.
#[must_use]
pub fn domain(table: &[CollisionRecord], attr: Attribute) -> Vec<String> {
    if attr == Attribute::Year {
        let years: BTreeSet<i32> = table.iter().filter_map(CollisionRecord::year).collect();
        return years.iter().map(ToString::to_string).collect();
    }
    let labels: BTreeSet<&str> = table.iter().filter_map(|r| r.text(attr)).collect();
    labels.into_iter().map(str::to_string).collect()
}
