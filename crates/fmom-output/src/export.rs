//! Export of the final alpha table.
//!
//! The table `(date, asset_id, beta, alpha)` is written as Parquet through
//! polars, or converted to [`AlphaRecord`]s and serialized as CSV or JSON.

use chrono::NaiveDate;
use fmom_data::schema::{ALPHA, ASSET_ID, BETA, DATE, OUTPUT_COLUMNS, read_dates, require_columns};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::naming::alphas_path;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars error.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Input table error.
    #[error("Data error: {0}")]
    Data(#[from] fmom_data::DataError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Apache Parquet.
    #[default]
    Parquet,

    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Parquet => "parquet",
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "parquet" => Ok(Self::Parquet),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// One row of the final alpha table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlphaRecord {
    /// Trading date.
    pub date: NaiveDate,

    /// Asset identifier.
    pub asset_id: String,

    /// Model-implied beta.
    pub beta: f64,

    /// Expected-return forecast.
    pub alpha: f64,
}

/// Convert an alpha table into records.
///
/// # Errors
///
/// Fails if a column is missing or any value is null.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<AlphaRecord>, ExportError> {
    require_columns(df, "alpha table", &OUTPUT_COLUMNS)?;

    let dates = read_dates(df, DATE)?;
    let assets = df.column(ASSET_ID)?.cast(&DataType::String)?;
    let betas = df.column(BETA)?.cast(&DataType::Float64)?;
    let alphas = df.column(ALPHA)?.cast(&DataType::Float64)?;

    dates
        .into_iter()
        .zip(assets.str()?.into_iter())
        .zip(betas.f64()?.into_iter())
        .zip(alphas.f64()?.into_iter())
        .map(|(((date, asset_id), beta), alpha)| match (asset_id, beta, alpha) {
            (Some(asset_id), Some(beta), Some(alpha)) => Ok(AlphaRecord {
                date,
                asset_id: asset_id.to_string(),
                beta,
                alpha,
            }),
            _ => Err(ExportError::InvalidFormat(format!(
                "null value in alpha table on {date}"
            ))),
        })
        .collect()
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the format is binary.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for [AlphaRecord] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in self {
                    wtr.serialize(record)?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
            ExportFormat::Parquet => Err(ExportError::InvalidFormat(
                "parquet is a binary format".to_string(),
            )),
        }
    }
}

/// Write an alpha table to `path`, creating parent directories.
pub fn write_alpha_table(
    df: &mut DataFrame,
    path: &Path,
    format: ExportFormat,
) -> Result<(), ExportError> {
    require_columns(df, "alpha table", &OUTPUT_COLUMNS)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    match format {
        ExportFormat::Parquet => {
            let file = File::create(path)?;
            ParquetWriter::new(file).finish(df)?;
            Ok(())
        }
        _ => records_from_frame(df)?.export_to_file(path, format),
    }
}

/// Writes alpha tables under `{root}/results/{split}/alphas/`.
#[derive(Debug, Clone)]
pub struct AlphaWriter {
    root: PathBuf,
    format: ExportFormat,
}

impl AlphaWriter {
    /// Create a writer rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    /// Output format.
    pub const fn format(&self) -> ExportFormat {
        self.format
    }

    /// Destination of the table for `split` and λ.
    pub fn path_for(&self, split: &str, lambda: f64) -> PathBuf {
        alphas_path(&self.root, split, lambda, self.format.extension())
    }

    /// Write `df` and return the path written.
    pub fn write(&self, split: &str, lambda: f64, df: &mut DataFrame) -> Result<PathBuf, ExportError> {
        let path = self.path_for(split, lambda);
        write_alpha_table(df, &path, self.format)?;
        Ok(path)
    }
}

/// Read back a Parquet alpha table.
pub fn read_alpha_table(path: &Path) -> Result<DataFrame, ExportError> {
    let df = ParquetReader::new(File::open(path)?).finish()?;
    require_columns(&df, "alpha table", &OUTPUT_COLUMNS)?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmom_data::schema::date_column;

    fn sample() -> DataFrame {
        let d = NaiveDate::from_ymd_opt(2012, 8, 1).unwrap();
        DataFrame::new(vec![
            date_column(DATE, &[d, d]).unwrap(),
            Series::new(ASSET_ID.into(), vec!["USA1", "USA2"]).into(),
            Series::new(BETA.into(), vec![0.9, 1.2]).into(),
            Series::new(ALPHA.into(), vec![0.0004, -0.0002]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("parquet".parse::<ExportFormat>().unwrap().extension(), "parquet");
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_records_from_frame() {
        let records = records_from_frame(&sample()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].asset_id, "USA1");
        assert_eq!(records[1].alpha, -0.0002);
    }

    #[test]
    fn test_records_reject_nulls() {
        let d = NaiveDate::from_ymd_opt(2012, 8, 1).unwrap();
        let df = DataFrame::new(vec![
            date_column(DATE, &[d]).unwrap(),
            Series::new(ASSET_ID.into(), vec!["USA1"]).into(),
            Series::new(BETA.into(), vec![None::<f64>]).into(),
            Series::new(ALPHA.into(), vec![0.1]).into(),
        ])
        .unwrap();
        assert!(records_from_frame(&df).is_err());
    }

    #[test]
    fn test_csv_export() {
        let records = records_from_frame(&sample()).unwrap();
        let csv = records.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.starts_with("date,asset_id,beta,alpha"));
        assert!(csv.contains("2012-08-01,USA1,0.9,0.0004"));
    }

    #[test]
    fn test_json_export() {
        let records = records_from_frame(&sample()).unwrap();
        let json = records.export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"asset_id\":\"USA2\""));
        assert!(json.contains("\"date\":\"2012-08-01\""));
    }

    #[test]
    fn test_parquet_is_not_text() {
        let records = records_from_frame(&sample()).unwrap();
        assert!(records.export_to_string(ExportFormat::Parquet).is_err());
    }
}
