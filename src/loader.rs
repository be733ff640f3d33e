use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::error::LoadError;
use crate::lookup::{read_workbook, LookupTables};
use crate::types::{
    CollisionRecord, Dimension, Measure, RawFactRow, DATE_COLUMN, LAT_COLUMN, LONG_COLUMN,
    WEEKDAY_COLUMN,
};
use crate::util::{parse_date, parse_f64, parse_key, present};

const FACT_TABLE: &str = "fact table";

/// Load the fact table and the lookup workbook, then left-join every lookup
/// label onto the fact rows.
///
/// Logs the outcome either way.
///
/// # Errors
///
/// Any missing file, sheet, column or unparsable value aborts the whole load.
pub fn load(
    fact_path: &Path,
    workbook_path: &Path,
) -> Result<(Vec<CollisionRecord>, LookupTables), LoadError> {
    match try_load(fact_path, workbook_path) {
        Ok((records, lookups)) => {
            log::info!(
                "Data loaded and merged successfully: {} collisions, {} lookup tables",
                records.len(),
                lookups.len()
            );
            Ok((records, lookups))
        }
        Err(e) => {
            log::error!("Error loading data: {}", e);
            Err(e)
        }
    }
}

fn try_load(
    fact_path: &Path,
    workbook_path: &Path,
) -> Result<(Vec<CollisionRecord>, LookupTables), LoadError> {
    let lookups = read_workbook(workbook_path)?;
    let mut records = read_fact_table(fact_path)?;
    if records.is_empty() {
        return Err(LoadError::Empty(fact_path.to_path_buf()));
    }
    for dim in Dimension::ALL {
        let table = lookups.get(dim).ok_or_else(|| LoadError::MissingSheet {
            sheet: dim.sheet_name().to_string(),
        })?;
        join_labels(&mut records, dim, |key| table.label(key));
    }
    Ok((records, lookups))
}

/// Left join: every record keeps its place; keys without a lookup entry get
/// no label.
pub(crate) fn join_labels<'a, F>(records: &mut [CollisionRecord], dim: Dimension, lookup: F)
where
    F: Fn(i64) -> Option<&'a str>,
{
    for r in records.iter_mut() {
        let label = r.foreign_key(dim).and_then(&lookup).map(str::to_string);
        *r.label_slot(dim) = label;
    }
}

fn required_columns() -> Vec<&'static str> {
    let mut cols = vec![DATE_COLUMN, WEEKDAY_COLUMN, LAT_COLUMN, LONG_COLUMN];
    cols.extend(Measure::ALL.iter().map(|m| m.column()));
    cols.extend(Dimension::ALL.iter().map(|d| d.key_column()));
    cols
}

/// Read the fact CSV into records with empty labels.
pub fn read_fact_table(path: &Path) -> Result<Vec<CollisionRecord>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(file);

    let headers = rdr.headers()?.clone();
    for column in required_columns() {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn {
                table: FACT_TABLE.to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut records = Vec::new();
    for (i, result) in rdr.deserialize::<RawFactRow>().enumerate() {
        let row = result?;
        records.push(clean_row(i + 2, &row)?);
    }
    Ok(records)
}

fn field<T>(
    row: usize,
    column: &str,
    raw: Option<&str>,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, LoadError> {
    let Some(s) = present(raw) else {
        return Ok(None);
    };
    parse(s).map(Some).ok_or_else(|| LoadError::Parse {
        table: FACT_TABLE.to_string(),
        row,
        column: column.to_string(),
        value: s.to_string(),
    })
}

fn clean_row(row: usize, raw: &RawFactRow) -> Result<CollisionRecord, LoadError> {
    let key = |dim: Dimension| field(row, dim.key_column(), raw.foreign_key(dim), parse_key);
    let measure =
        |m: Measure, value: &Option<String>| field(row, m.column(), value.as_deref(), parse_f64);

    Ok(CollisionRecord {
        accident_date: field(row, DATE_COLUMN, raw.accident_date.as_deref(), parse_date)?,
        weekday: present(raw.weekday.as_deref()).map(str::to_string),
        num_of_injuries: measure(Measure::NumOfInjuries, &raw.num_of_injuries)?,
        num_of_pedestrians: measure(Measure::NumOfPedestrians, &raw.num_of_pedestrians)?,
        num_of_vehicle: measure(Measure::NumOfVehicle, &raw.num_of_vehicle)?,
        lat: field(row, LAT_COLUMN, raw.lat.as_deref(), parse_f64)?,
        long: field(row, LONG_COLUMN, raw.long.as_deref(), parse_f64)?,
        location_type_id: key(Dimension::LocationType)?,
        classification_id: key(Dimension::ClassificationOfAccident)?,
        impact_id: key(Dimension::InitialImpactType)?,
        road_condition_id: key(Dimension::RoadSurfaceCondition)?,
        environment_id: key(Dimension::EnvironmentCondition)?,
        light_id: key(Dimension::Light)?,
        traffic_id: key(Dimension::TrafficControl)?,
        injury_id: key(Dimension::MaxInjury)?,
        location_type: None,
        classification_of_accident: None,
        initial_impact_type: None,
        road_surface_condition: None,
        environment_condition: None,
        light: None,
        traffic_control: None,
        max_injury: None,
    })
}
