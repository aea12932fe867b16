//! Column names shared by every table exchanged with collaborators.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use polars::prelude::*;

/// Trading date column.
pub const DATE: &str = "date";
/// Asset identifier column.
pub const ASSET_ID: &str = "asset_id";
/// Asset price column.
pub const PRICE: &str = "price";
/// Model-implied beta column.
pub const BETA: &str = "beta";
/// Per-asset alpha column.
pub const ALPHA: &str = "alpha";
/// Previous trading day's price, derived per asset.
pub const PREV_PRICE: &str = "prev_price";

/// Columns of the final alpha table, in output order.
pub const OUTPUT_COLUMNS: [&str; 4] = [DATE, ASSET_ID, BETA, ALPHA];

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Fail with [`DataError::MissingColumn`] unless every column is present.
pub fn require_columns(df: &DataFrame, table: &str, columns: &[&str]) -> Result<()> {
    for column in columns {
        if df.get_column_index(column).is_none() {
            return Err(DataError::MissingColumn {
                table: table.to_string(),
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Names of all columns that are not listed in `exclude`, in frame order.
pub fn value_columns(df: &DataFrame, exclude: &[&str]) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.as_str().to_string())
        .filter(|name| !exclude.contains(&name.as_str()))
        .collect()
}

/// Convert a polars `Date` physical value (days since the Unix epoch).
pub fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

/// Days since the Unix epoch, the physical representation of a polars `Date`.
pub fn days_from_date(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Read a date-like column as `NaiveDate`s.
///
/// `Date` and `Datetime` columns are both accepted. Null dates are a parse error.
pub fn read_dates(df: &DataFrame, column: &str) -> Result<Vec<NaiveDate>> {
    let days = df
        .column(column)?
        .cast(&DataType::Date)?
        .cast(&DataType::Int32)?;
    days.i32()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.and_then(date_from_days).ok_or_else(|| {
                DataError::Parse(format!("null or out-of-range date in '{column}' at row {row}"))
            })
        })
        .collect()
}

/// Build a polars `Date` column from `NaiveDate`s.
pub fn date_column(name: &str, dates: &[NaiveDate]) -> Result<Column> {
    let days: Vec<i32> = dates.iter().copied().map(days_from_date).collect();
    let column: Column = Series::new(name.into(), days).into();
    Ok(column.cast(&DataType::Date)?)
}
