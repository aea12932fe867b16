//! Error types for signal construction.

use thiserror::Error;

/// Result type for signal operations.
pub type Result<T> = std::result::Result<T, SignalError>;

/// Errors that can occur while building factor signals and alphas.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Smoothing parameter outside `(0, 1]`
    #[error("Invalid smoothing parameter: {0} (must be in (0, 1])")]
    InvalidLambda(f64),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Panel dimensions do not agree
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Expected (dates, factors)
        expected: (usize, usize),
        /// Actual (dates, factors)
        actual: (usize, usize),
    },

    /// Two panels that must be aligned are not
    #[error("Panels are not aligned: {0}")]
    Misaligned(String),

    /// Dates are not unique and strictly increasing
    #[error("Dates must be strictly increasing: {previous} followed by {current}")]
    UnorderedDates {
        /// Earlier row's date
        previous: String,
        /// Offending row's date
        current: String,
    },

    /// A factor name appears more than once
    #[error("Duplicate factor column: {0}")]
    DuplicateFactor(String),

    /// Input table error
    #[error("Data error: {0}")]
    Data(#[from] fmom_data::DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
