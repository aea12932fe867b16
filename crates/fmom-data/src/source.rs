//! Source traits for the three pipeline collaborators.

use crate::error::{DataError, Result};
use crate::schema::{DATE, days_from_date};
use chrono::NaiveDate;
use polars::prelude::*;

/// Supplies the date-indexed table of per-factor returns.
///
/// The returned frame has a `date` column plus one `f64` column per factor,
/// restricted to `[start, end]` and sorted ascending by date.
pub trait FactorReturnSource {
    /// Load factor returns for the inclusive date range.
    fn load_factor_returns(&self, start: NaiveDate, end: NaiveDate) -> Result<DataFrame>;
}

/// Supplies per-asset factor loadings, one partition per calendar year.
pub trait ExposureSource {
    /// Load the exposure partition for `year`.
    ///
    /// Returns `Ok(None)` when the partition does not exist. Absent years are
    /// tolerated by the caller; read failures of an existing partition are errors.
    fn load_year(&self, year: i32) -> Result<Option<DataFrame>>;
}

/// Supplies per-asset price and model beta.
pub trait AssetAttributeSource {
    /// Load `(date, asset_id, price, beta)` rows for the inclusive date range.
    fn load_attributes(&self, start: NaiveDate, end: NaiveDate) -> Result<DataFrame>;
}

/// Reject ranges whose start is after their end.
pub fn check_date_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(DataError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(())
}

/// Restrict a frame to dates in `[start, end]`.
pub fn filter_date_range(lf: LazyFrame, start: NaiveDate, end: NaiveDate) -> LazyFrame {
    let start = lit(days_from_date(start)).cast(DataType::Date);
    let end = lit(days_from_date(end)).cast(DataType::Date);
    lf.filter(
        col(DATE)
            .cast(DataType::Date)
            .gt_eq(start)
            .and(col(DATE).cast(DataType::Date).lt_eq(end)),
    )
}
