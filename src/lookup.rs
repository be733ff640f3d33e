//! Lookup (dimension) tables and the workbook that holds them.
//!
//! A workbook is either a spreadsheet file with one sheet per dimension or a
//! directory containing one `<sheet>.csv` file per dimension. Both are read
//! into the same [`Sheet`] shape before the key index is built.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use csv::ReaderBuilder;

use crate::error::LoadError;
use crate::types::Dimension;
use crate::util::{parse_key, present};

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// A sheet as plain text cells, header row split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Sheet {
    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// One lookup table: the sheet as read plus an id to label index.
#[derive(Debug, Clone)]
pub struct LookupTable {
    dimension: Dimension,
    sheet: Sheet,
    index: HashMap<i64, String>,
}

impl LookupTable {
    /// Build the key index for `dim` from a sheet.
    ///
    /// The label column is the dimension's label column name; a sheet with a
    /// single non-key column uses that column instead.
    ///
    /// # Errors
    ///
    /// * [`LoadError::MissingColumn`] if the key or label column is absent.
    /// * [`LoadError::Parse`] if a key cannot be read as an integer.
    pub fn from_sheet(dim: Dimension, sheet: Sheet) -> Result<Self, LoadError> {
        let missing = |column: &str| LoadError::MissingColumn {
            table: sheet.name.clone(),
            column: column.to_string(),
        };
        let key_idx = sheet
            .column(dim.key_column())
            .ok_or_else(|| missing(dim.key_column()))?;
        let label_idx = match sheet.column(dim.label_column()) {
            Some(idx) => idx,
            None if sheet.headers.len() == 2 => 1 - key_idx,
            None => return Err(missing(dim.label_column())),
        };

        let mut index = HashMap::with_capacity(sheet.rows.len());
        for (i, row) in sheet.rows.iter().enumerate() {
            let cell = |idx: usize| row.get(idx).and_then(|c| present(c.as_deref()));
            let Some(raw_key) = cell(key_idx) else {
                continue;
            };
            let key = parse_key(raw_key).ok_or_else(|| LoadError::Parse {
                table: sheet.name.clone(),
                row: i + 2,
                column: dim.key_column().to_string(),
                value: raw_key.to_string(),
            })?;
            let Some(label) = cell(label_idx) else {
                continue;
            };
            if index.contains_key(&key) {
                log::warn!(
                    "Duplicate key {} in lookup sheet '{}'; keeping the first label",
                    key,
                    sheet.name
                );
                continue;
            }
            index.insert(key, label.to_string());
        }

        Ok(Self {
            dimension: dim,
            sheet,
            index,
        })
    }

    #[must_use]
    pub const fn dimension(&self) -> Dimension {
        self.dimension
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.sheet.name
    }

    #[must_use]
    pub const fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    /// Label for a key, `None` when the key has no entry.
    #[must_use]
    pub fn label(&self, key: i64) -> Option<&str> {
        self.index.get(&key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// All eight lookup tables, keyed by dimension.
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    tables: BTreeMap<Dimension, LookupTable>,
}

impl LookupTables {
    #[must_use]
    pub fn get(&self, dim: Dimension) -> Option<&LookupTable> {
        self.tables.get(&dim)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LookupTable> {
        self.tables.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn insert(&mut self, table: LookupTable) {
        self.tables.insert(table.dimension(), table);
    }
}

enum Workbook {
    Spreadsheet(Sheets<BufReader<File>>),
    CsvDir(PathBuf),
}

impl Workbook {
    fn open(path: &Path) -> Result<Self, LoadError> {
        if path.is_dir() {
            return Ok(Self::CsvDir(path.to_path_buf()));
        }
        if !path.exists() {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
            });
        }
        let is_spreadsheet = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if !is_spreadsheet {
            return Err(LoadError::UnsupportedWorkbook(path.to_path_buf()));
        }
        Ok(Self::Spreadsheet(open_workbook_auto(path)?))
    }

    fn sheet(&mut self, name: &str) -> Result<Sheet, LoadError> {
        match self {
            Self::Spreadsheet(book) => {
                if !book.sheet_names().iter().any(|s| s == name) {
                    return Err(LoadError::MissingSheet {
                        sheet: name.to_string(),
                    });
                }
                let range = book.worksheet_range(name)?;
                let mut rows = range.rows();
                let headers = rows
                    .next()
                    .map(|r| r.iter().map(|c| cell_text(c).unwrap_or_default()).collect())
                    .unwrap_or_default();
                let rows = rows.map(|r| r.iter().map(cell_text).collect()).collect();
                Ok(Sheet {
                    name: name.to_string(),
                    headers,
                    rows,
                })
            }
            Self::CsvDir(dir) => {
                let path = dir.join(format!("{name}.csv"));
                if !path.is_file() {
                    return Err(LoadError::MissingSheet {
                        sheet: name.to_string(),
                    });
                }
                let mut rdr = ReaderBuilder::new().flexible(true).from_path(&path)?;
                let headers = rdr.headers()?.iter().map(str::to_string).collect();
                let mut rows = Vec::new();
                for record in rdr.records() {
                    let record = record?;
                    rows.push(record.iter().map(|c| Some(c.to_string())).collect());
                }
                Ok(Sheet {
                    name: name.to_string(),
                    headers,
                    rows,
                })
            }
        }
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(format!("{f:.0}")),
        other => Some(other.to_string()),
    }
}

/// Read every dimension sheet from the workbook at `path`.
///
/// # Errors
///
/// Fails on the first missing sheet, missing column or unreadable key; no
/// partial set of tables is returned.
pub fn read_workbook(path: &Path) -> Result<LookupTables, LoadError> {
    let mut book = Workbook::open(path)?;
    let mut tables = LookupTables::default();
    for dim in Dimension::ALL {
        let sheet = book.sheet(dim.sheet_name())?;
        tables.insert(LookupTable::from_sheet(dim, sheet)?);
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(headers: &[&str], rows: &[&[&str]]) -> Sheet {
        Sheet {
            name: "Dimlight".to_string(),
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| Some((*c).to_string())).collect())
                .collect(),
        }
    }

    #[test]
    fn indexes_labels_by_key() {
        let table = LookupTable::from_sheet(
            Dimension::Light,
            sheet(&["lightid", "light"], &[&["1", "Daylight"], &["2.0", "Dark"]]),
        )
        .unwrap();
        assert_eq!(table.label(1), Some("Daylight"));
        assert_eq!(table.label(2), Some("Dark"));
        assert_eq!(table.label(3), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn keeps_first_label_for_duplicate_keys() {
        let table = LookupTable::from_sheet(
            Dimension::Light,
            sheet(&["lightid", "light"], &[&["1", "Daylight"], &["1", "Dawn"]]),
        )
        .unwrap();
        assert_eq!(table.label(1), Some("Daylight"));
    }

    #[test]
    fn falls_back_to_single_label_column() {
        let table = LookupTable::from_sheet(
            Dimension::Light,
            sheet(&["description", "lightid"], &[&["Dusk", "4"]]),
        )
        .unwrap();
        assert_eq!(table.label(4), Some("Dusk"));
    }

    #[test]
    fn rejects_missing_key_column() {
        let err = LookupTable::from_sheet(
            Dimension::Light,
            sheet(&["id", "light"], &[&["1", "Daylight"]]),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column, .. } if column == "lightid"));
    }

    #[test]
    fn rejects_non_integer_keys() {
        let err = LookupTable::from_sheet(
            Dimension::Light,
            sheet(&["lightid", "light"], &[&["one", "Daylight"]]),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Parse { row: 2, .. }));
    }

    #[test]
    fn skips_rows_without_key_or_label() {
        let table = LookupTable::from_sheet(
            Dimension::Light,
            sheet(
                &["lightid", "light"],
                &[&["", "Orphan"], &["5", ""], &["6", "Dark"]],
            ),
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.label(5), None);
    }

    #[test]
    fn reports_missing_sheet_in_csv_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_workbook(dir.path()).unwrap_err();
        assert!(
            matches!(err, LoadError::MissingSheet { sheet } if sheet == "Dimlocation_type")
        );
    }

    #[test]
    fn renders_spreadsheet_cells_as_text() {
        assert_eq!(cell_text(&Data::Float(3.0)).as_deref(), Some("3"));
        assert_eq!(cell_text(&Data::Float(2.5)).as_deref(), Some("2.5"));
        assert_eq!(cell_text(&Data::Int(7)).as_deref(), Some("7"));
        assert_eq!(
            cell_text(&Data::String("Daylight".to_string())).as_deref(),
            Some("Daylight")
        );
        assert_eq!(cell_text(&Data::Empty), None);
    }

    fn write_xlsx(path: &Path, skip: Option<Dimension>) {
        let mut book = rust_xlsxwriter::Workbook::new();
        for dim in Dimension::ALL {
            if Some(dim) == skip {
                continue;
            }
            let ws = book.add_worksheet();
            ws.set_name(dim.sheet_name()).unwrap();
            ws.write_string(0, 0, dim.key_column()).unwrap();
            ws.write_string(0, 1, dim.label_column()).unwrap();
            ws.write_number(1, 0, 1).unwrap();
            ws.write_string(1, 1, "First").unwrap();
            ws.write_number(2, 0, 2).unwrap();
            ws.write_string(2, 1, "Second").unwrap();
            // key without a label
            ws.write_number(3, 0, 3).unwrap();
        }
        book.save(path).unwrap();
    }

    #[test]
    fn reads_every_sheet_from_xlsx_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Dimtables.xlsx");
        write_xlsx(&path, None);

        let tables = read_workbook(&path).unwrap();
        assert_eq!(tables.len(), Dimension::ALL.len());
        let light = tables.get(Dimension::Light).unwrap();
        assert_eq!(light.name(), "Dimlight");
        assert_eq!(light.label(1), Some("First"));
        assert_eq!(light.label(2), Some("Second"));
        assert_eq!(light.label(3), None);
        assert_eq!(light.len(), 2);
        assert_eq!(light.sheet().headers, vec!["lightid", "light"]);
        assert_eq!(light.sheet().rows[0][0].as_deref(), Some("1"));
    }

    #[test]
    fn reports_missing_sheet_in_xlsx_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Dimtables.xlsx");
        write_xlsx(&path, Some(Dimension::TrafficControl));
        let err = read_workbook(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingSheet { sheet } if sheet == "Dimtraffic_control"));
    }

    #[test]
    fn rejects_unknown_workbook_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lookups.txt");
        std::fs::write(&path, "x").unwrap();
        assert!(matches!(
            read_workbook(&path),
            Err(LoadError::UnsupportedWorkbook(_))
        ));
    }
}
