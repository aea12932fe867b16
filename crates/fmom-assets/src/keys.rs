//! `(date, asset_id)` key checks.

use crate::error::{MappingError, Result};
use fmom_data::schema::{ASSET_ID, DATE, date_from_days};
use polars::prelude::*;
use std::collections::HashSet;

/// Fail if any `(date, asset_id)` pair occurs more than once in `df`.
pub fn ensure_unique_keys(df: &DataFrame, table: &str) -> Result<()> {
    let days = df
        .column(DATE)?
        .cast(&DataType::Date)?
        .cast(&DataType::Int32)?;
    let assets = df.column(ASSET_ID)?.cast(&DataType::String)?;

    let mut seen = HashSet::with_capacity(df.height());
    for (day, asset) in days.i32()?.into_iter().zip(assets.str()?.into_iter()) {
        if !seen.insert((day, asset)) {
            return Err(MappingError::DuplicateKey {
                table: table.to_string(),
                date: day
                    .and_then(date_from_days)
                    .map_or_else(|| "null".to_string(), |d| d.to_string()),
                asset_id: asset.unwrap_or("null").to_string(),
            });
        }
    }
    Ok(())
}
