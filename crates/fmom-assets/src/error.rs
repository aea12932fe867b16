//! Error types for exposure mapping and universe filtering.

use thiserror::Error;

/// Result type for asset-level operations.
pub type Result<T> = std::result::Result<T, MappingError>;

/// Errors that can occur while mapping factor alpha onto assets.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Exposure factors differ from factor alpha factors
    #[error(
        "Factor mismatch in {year} exposures: missing {missing:?}, unexpected {unexpected:?}"
    )]
    FactorMismatch {
        /// Calendar year of the offending partition
        year: i32,
        /// Factor alpha columns absent from the exposures
        missing: Vec<String>,
        /// Exposure columns with no factor alpha counterpart
        unexpected: Vec<String>,
    },

    /// A (date, asset_id) key occurs more than once
    #[error("Duplicate rows in {table} for asset {asset_id} on {date}")]
    DuplicateKey {
        /// Table being checked
        table: String,
        /// Repeated date
        date: String,
        /// Repeated asset
        asset_id: String,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input table error
    #[error("Data error: {0}")]
    Data(#[from] fmom_data::DataError),

    /// Factor panel error
    #[error("Signal error: {0}")]
    Signal(#[from] fmom_signal::SignalError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
