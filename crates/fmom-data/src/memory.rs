//! In-memory sources.

use crate::error::{DataError, Result};
use crate::schema::{ASSET_ID, BETA, DATE, PRICE, require_columns};
use crate::source::{
    AssetAttributeSource, ExposureSource, FactorReturnSource, check_date_range,
    filter_date_range,
};
use chrono::NaiveDate;
use polars::prelude::*;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Holds every pipeline input in memory.
///
/// Records the order in which exposure years are requested, so callers can
/// check that partitions are loaded one at a time.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    factor_returns: Option<DataFrame>,
    exposures: BTreeMap<i32, DataFrame>,
    attributes: Option<DataFrame>,
    requested_years: RefCell<Vec<i32>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the factor return table.
    pub fn with_factor_returns(mut self, df: DataFrame) -> Self {
        self.factor_returns = Some(df);
        self
    }

    /// Add the exposure partition for `year`.
    pub fn with_exposures(mut self, year: i32, df: DataFrame) -> Self {
        self.exposures.insert(year, df);
        self
    }

    /// Set the asset attribute table.
    pub fn with_attributes(mut self, df: DataFrame) -> Self {
        self.attributes = Some(df);
        self
    }

    /// Years passed to [`ExposureSource::load_year`], in call order.
    pub fn requested_years(&self) -> Vec<i32> {
        self.requested_years.borrow().clone()
    }
}

impl FactorReturnSource for MemoryStore {
    fn load_factor_returns(&self, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
        check_date_range(start, end)?;
        let df = self
            .factor_returns
            .clone()
            .ok_or_else(|| DataError::MissingData {
                source_name: "factor returns".to_string(),
                reason: "no table registered".to_string(),
            })?;
        require_columns(&df, "factor returns", &[DATE])?;

        let df = filter_date_range(df.lazy(), start, end)
            .sort([DATE], SortMultipleOptions::default())
            .collect()?;
        if df.height() == 0 {
            return Err(DataError::MissingData {
                source_name: "factor returns".to_string(),
                reason: format!("no rows between {start} and {end}"),
            });
        }
        Ok(df)
    }
}

impl ExposureSource for MemoryStore {
    fn load_year(&self, year: i32) -> Result<Option<DataFrame>> {
        self.requested_years.borrow_mut().push(year);
        match self.exposures.get(&year) {
            Some(df) => {
                require_columns(df, "exposures", &[DATE, ASSET_ID])?;
                Ok(Some(df.clone()))
            }
            None => Ok(None),
        }
    }
}

impl AssetAttributeSource for MemoryStore {
    fn load_attributes(&self, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
        check_date_range(start, end)?;
        let df = self
            .attributes
            .clone()
            .ok_or_else(|| DataError::MissingData {
                source_name: "asset attributes".to_string(),
                reason: "no table registered".to_string(),
            })?;
        require_columns(&df, "asset attributes", &[DATE, ASSET_ID, PRICE, BETA])?;

        Ok(filter_date_range(df.lazy(), start, end)
            .select([col(DATE), col(ASSET_ID), col(PRICE), col(BETA)])
            .collect()?)
    }
}
