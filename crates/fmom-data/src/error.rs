//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading pipeline inputs.
#[derive(Debug, Error)]
pub enum DataError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid date range
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: String,
        /// End date of the range
        end: String,
    },

    /// A required input table is missing or empty
    #[error("Missing data for {source_name}: {reason}")]
    MissingData {
        /// Name of the source that was queried
        source_name: String,
        /// Reason for missing data
        reason: String,
    },

    /// A required column is absent from an input table
    #[error("Missing column '{column}' in {table}")]
    MissingColumn {
        /// Table being read
        table: String,
        /// Column that was expected
        column: String,
    },

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),
}
