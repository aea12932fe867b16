//! Exposure mapping
//!
//! Projects factor alpha onto assets:
//!
//! alpha(date, asset) = Σ_c exposure(date, asset, c) * factor_alpha(date, c)
//!
//! Exposures are read one calendar year at a time through [`YearlyAlpha`],
//! which holds at most one partition in memory and releases it before the
//! next is requested. Chunking only bounds memory: concatenated yearly output
//! equals [`project`] over the whole range.

use crate::error::{MappingError, Result};
use crate::keys::ensure_unique_keys;
use chrono::{Datelike, NaiveDate};
use fmom_data::ExposureSource;
use fmom_data::schema::{ALPHA, ASSET_ID, DATE, date_column, require_columns, value_columns};
use fmom_signal::FactorPanel;
use polars::prelude::*;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

/// Suffix given to factor alpha columns while joined with exposures.
const ALPHA_SUFFIX: &str = "_alpha";

/// Per-asset alpha for one calendar year.
#[derive(Debug, Clone)]
pub struct YearChunk {
    /// Calendar year
    pub year: i32,
    /// `(date, asset_id, alpha)`, sorted by `(date, asset_id)`
    pub frame: DataFrame,
    /// Whether the year's exposure partition existed
    pub partition_found: bool,
}

/// Per-asset alpha for a full date range.
#[derive(Debug, Clone)]
pub struct MappedAlpha {
    /// `(date, asset_id, alpha)`, sorted by `(date, asset_id)`
    pub frame: DataFrame,
    /// Years whose partition was loaded
    pub years_loaded: Vec<i32>,
    /// Years skipped because their partition was absent
    pub years_missing: Vec<i32>,
}

/// Empty `(date, asset_id, alpha)` frame.
pub fn empty_asset_alpha() -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        date_column(DATE, &[])?,
        Series::new(ASSET_ID.into(), Vec::<String>::new()).into(),
        Series::new(ALPHA.into(), Vec::<f64>::new()).into(),
    ])?)
}

/// Check that exposure factor columns match the factor alpha factors.
fn check_factor_sets(year: i32, exposures: &DataFrame, alpha: &FactorPanel) -> Result<()> {
    let exposure_factors: BTreeSet<String> = value_columns(exposures, &[DATE, ASSET_ID])
        .into_iter()
        .collect();
    let alpha_factors: BTreeSet<String> = alpha.factors().iter().cloned().collect();

    if exposure_factors != alpha_factors {
        return Err(MappingError::FactorMismatch {
            year,
            missing: alpha_factors
                .difference(&exposure_factors)
                .cloned()
                .collect(),
            unexpected: exposure_factors
                .difference(&alpha_factors)
                .cloned()
                .collect(),
        });
    }
    Ok(())
}

/// Dot product of exposures and factor alpha for every `(date, asset)`.
///
/// Exposures are inner-joined with `alpha` on date. A missing exposure value
/// contributes zero to the sum. The factor columns of `exposures` must match
/// `alpha`'s factors exactly.
pub fn project(exposures: DataFrame, alpha: &FactorPanel) -> Result<DataFrame> {
    let year = alpha.dates().first().map_or(0, |d| d.year());
    project_checked(year, exposures, alpha)
}

fn project_checked(year: i32, exposures: DataFrame, alpha: &FactorPanel) -> Result<DataFrame> {
    require_columns(&exposures, "exposures", &[DATE, ASSET_ID])?;
    check_factor_sets(year, &exposures, alpha)?;

    let dot = alpha
        .factors()
        .iter()
        .map(|factor| {
            col(factor.as_str()).fill_null(lit(0.0))
                * col(format!("{factor}{ALPHA_SUFFIX}").as_str())
        })
        .reduce(|acc, term| acc + term)
        .ok_or_else(|| MappingError::InvalidParameter("factor alpha has no factors".to_string()))?;

    let alpha_frame = alpha.to_frame_with_suffix(ALPHA_SUFFIX)?;
    let projected = exposures
        .lazy()
        .with_column(col(DATE).cast(DataType::Date))
        .join(
            alpha_frame.lazy(),
            [col(DATE)],
            [col(DATE)],
            JoinArgs::new(JoinType::Inner),
        )
        .select([col(DATE), col(ASSET_ID), dot.alias(ALPHA)])
        .sort([DATE, ASSET_ID], SortMultipleOptions::default())
        .collect()?;

    ensure_unique_keys(&projected, "exposures")?;
    Ok(projected)
}

/// Maps factor alpha onto assets, reading exposures year by year.
#[derive(Debug)]
pub struct ExposureMapper<'a, S> {
    source: &'a S,
}

impl<'a, S: ExposureSource> ExposureMapper<'a, S> {
    /// Create a mapper over an exposure source.
    pub const fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Stream per-asset alpha one calendar year at a time.
    ///
    /// Covers every year intersecting `[start, end]`; only factor alpha dates
    /// inside the range are mapped.
    pub fn stream(
        &self,
        alpha: &'a FactorPanel,
        start: NaiveDate,
        end: NaiveDate,
    ) -> YearlyAlpha<'a, S> {
        YearlyAlpha {
            source: self.source,
            alpha,
            start,
            end,
            years: start.year()..=end.year(),
        }
    }

    /// Map the whole range, concatenating yearly chunks.
    pub fn map_range(
        &self,
        alpha: &'a FactorPanel,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MappedAlpha> {
        let mut frames = Vec::new();
        let mut years_loaded = Vec::new();
        let mut years_missing = Vec::new();

        for chunk in self.stream(alpha, start, end) {
            let chunk = chunk?;
            if chunk.partition_found {
                years_loaded.push(chunk.year);
                frames.push(chunk.frame.lazy());
            } else {
                years_missing.push(chunk.year);
            }
        }

        let frame = if frames.is_empty() {
            empty_asset_alpha()?
        } else {
            concat(frames, UnionArgs::default())?
                .sort([DATE, ASSET_ID], SortMultipleOptions::default())
                .collect()?
        };

        Ok(MappedAlpha {
            frame,
            years_loaded,
            years_missing,
        })
    }
}

/// Iterator over [`YearChunk`]s, see [`ExposureMapper::stream`].
///
/// Years without factor alpha dates are skipped without touching the source.
#[derive(Debug)]
pub struct YearlyAlpha<'a, S> {
    source: &'a S,
    alpha: &'a FactorPanel,
    start: NaiveDate,
    end: NaiveDate,
    years: RangeInclusive<i32>,
}

impl<S: ExposureSource> YearlyAlpha<'_, S> {
    fn map_year(&self, year: i32, alpha: &FactorPanel) -> Result<YearChunk> {
        let Some(exposures) = self.source.load_year(year)? else {
            warn!(year, "exposure partition missing, skipping year");
            return Ok(YearChunk {
                year,
                frame: empty_asset_alpha()?,
                partition_found: false,
            });
        };

        let frame = project_checked(year, exposures, alpha)?;
        debug!(year, dates = alpha.n_dates(), rows = frame.height(), "mapped exposures");
        Ok(YearChunk {
            year,
            frame,
            partition_found: true,
        })
    }
}

impl<S: ExposureSource> Iterator for YearlyAlpha<'_, S> {
    type Item = Result<YearChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let year = self.years.next()?;
            let (start, end) = (self.start, self.end);
            let year_alpha = self.alpha.filter_rows(|i| {
                let date = self.alpha.dates()[i];
                date.year() == year && date >= start && date <= end
            });
            if year_alpha.is_empty() {
                continue;
            }
            return Some(self.map_year(year, &year_alpha));
        }
    }
}
