//! Dashboard configuration, read from an optional TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "traffic_report.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub alerts: AlertConfig,
    pub display: DisplayConfig,
}

/// Locations of the input files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub fact_table: PathBuf,
    /// Spreadsheet file, or a directory of `<sheet>.csv` files.
    pub lookup_workbook: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            fact_table: PathBuf::from("Data/Cleaned_Traffic_Data.csv"),
            lookup_workbook: PathBuf::from("Data/Dimtables.xlsx"),
        }
    }
}

/// Thresholds for the alert shown below the KPI block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub injury_threshold: f64,
    pub volume_threshold: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            injury_threshold: 200.0,
            volume_threshold: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub preview_rows: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { preview_rows: 10 }
    }
}

impl Config {
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed input.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&s)
    }

    /// Read `path` if given; otherwise read [`DEFAULT_CONFIG_PATH`] when it
    /// exists and fall back to defaults when it does not.
    ///
    /// # Errors
    ///
    /// Fails if an explicitly given file is missing, or any file read is
    /// malformed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_path(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.is_file() {
                    Self::from_path(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
