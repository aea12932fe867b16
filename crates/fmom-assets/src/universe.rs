//! Universe filtering
//!
//! An asset-date is investable when the asset's previous trading day price is
//! strictly above `min_price` and both its beta and alpha are defined, that
//! is neither null nor NaN. The
//! previous price is a one-step lag within each asset's own date-ordered
//! series, computed once over the full attribute range so that the first
//! trading day of a year sees the last price of the year before.

use crate::error::{MappingError, Result};
use crate::keys::ensure_unique_keys;
use fmom_data::schema::{
    ALPHA, ASSET_ID, BETA, DATE, OUTPUT_COLUMNS, PREV_PRICE, PRICE, require_columns,
};
use polars::prelude::*;
use tracing::debug;

/// Default minimum previous-day price.
pub const DEFAULT_MIN_PRICE: f64 = 5.0;

/// Asset attributes with the lagged price attached.
///
/// Columns: `(date, asset_id, prev_price, beta)`.
#[derive(Debug, Clone)]
pub struct PreparedAttributes {
    frame: DataFrame,
}

impl PreparedAttributes {
    /// Underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }
}

/// Investable-universe gate.
#[derive(Debug, Clone, Copy)]
pub struct UniverseFilter {
    min_price: f64,
}

impl Default for UniverseFilter {
    fn default() -> Self {
        Self {
            min_price: DEFAULT_MIN_PRICE,
        }
    }
}

impl UniverseFilter {
    /// Create a filter with a custom price threshold.
    pub fn new(min_price: f64) -> Result<Self> {
        if !min_price.is_finite() {
            return Err(MappingError::InvalidParameter(format!(
                "minimum price must be finite, got {min_price}"
            )));
        }
        Ok(Self { min_price })
    }

    /// Price threshold.
    pub const fn min_price(&self) -> f64 {
        self.min_price
    }

    /// Attach each asset's previous trading day price.
    pub fn prepare(&self, attributes: DataFrame) -> Result<PreparedAttributes> {
        require_columns(&attributes, "asset attributes", &[DATE, ASSET_ID, PRICE, BETA])?;
        ensure_unique_keys(&attributes, "asset attributes")?;

        let frame = attributes
            .lazy()
            .with_columns([
                col(DATE).cast(DataType::Date),
                col(PRICE).cast(DataType::Float64),
                col(BETA).cast(DataType::Float64),
            ])
            .sort([ASSET_ID, DATE], SortMultipleOptions::default())
            .with_column(
                col(PRICE)
                    .shift(lit(1))
                    .over([col(ASSET_ID)])
                    .alias(PREV_PRICE),
            )
            .select([col(DATE), col(ASSET_ID), col(PREV_PRICE), col(BETA)])
            .collect()?;

        Ok(PreparedAttributes { frame })
    }

    /// Keep investable rows of `asset_alpha`.
    ///
    /// Returns `(date, asset_id, beta, alpha)` sorted by `(date, asset_id)`.
    pub fn apply(
        &self,
        asset_alpha: &DataFrame,
        attributes: &PreparedAttributes,
    ) -> Result<DataFrame> {
        require_columns(asset_alpha, "asset alpha", &[DATE, ASSET_ID, ALPHA])?;

        let filtered = asset_alpha
            .clone()
            .lazy()
            .join(
                attributes.frame.clone().lazy(),
                [col(DATE), col(ASSET_ID)],
                [col(DATE), col(ASSET_ID)],
                JoinArgs::new(JoinType::Inner),
            )
            .filter(
                col(PREV_PRICE)
                    .is_not_nan()
                    .and(col(PREV_PRICE).gt(lit(self.min_price)))
                    .and(defined(BETA))
                    .and(defined(ALPHA)),
            )
            .select(OUTPUT_COLUMNS.map(col))
            .sort([DATE, ASSET_ID], SortMultipleOptions::default())
            .collect()?;

        debug!(
            input_rows = asset_alpha.height(),
            kept_rows = filtered.height(),
            min_price = self.min_price,
            "applied universe filter"
        );
        Ok(filtered)
    }
}

/// Neither null nor NaN.
fn defined(name: &str) -> Expr {
    col(name).is_not_null().and(col(name).is_not_nan())
}
