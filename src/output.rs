use serde::Serialize;
use std::error::Error;
use std::io;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use crate::lookup::LookupTable;
use crate::types::{CollisionRecord, CountRow};

/// Rows exported as CSV under a fixed header.
///
/// The header is written even when there are no rows, so an empty
/// selection still exports a readable file.
pub trait CsvRecord: Serialize {
    const HEADERS: &'static [&'static str];
}

impl CsvRecord for CollisionRecord {
    const HEADERS: &'static [&'static str] = &CollisionRecord::HEADERS;
}

impl CsvRecord for CountRow {
    const HEADERS: &'static [&'static str] = &CountRow::HEADERS;
}

/// Serialize rows as CSV (header first) into any writer.
pub fn write_csv_to<W: io::Write, T: CsvRecord>(writer: W, rows: &[T]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(T::HEADERS)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv<T: CsvRecord>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::create(path)?;
    write_csv_to(file, rows)?;
    Ok(())
}

/// CSV text for a download payload.
pub fn to_csv_string<T: CsvRecord>(rows: &[T]) -> Result<String, Box<dyn Error>> {
    let mut buf = Vec::new();
    write_csv_to(&mut buf, rows)?;
    Ok(String::from_utf8(buf)?)
}

/// Write a lookup table back out with its original sheet columns.
pub fn write_lookup_csv_to<W: io::Write>(
    writer: W,
    table: &LookupTable,
) -> Result<(), csv::Error> {
    let sheet = table.sheet();
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    wtr.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        wtr.write_record(row.iter().map(|c| c.as_deref().unwrap_or_default()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_lookup_csv(path: &Path, table: &LookupTable) -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::create(path)?;
    write_lookup_csv_to(file, table)?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
