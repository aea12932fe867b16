//! Run summaries.
//!
//! A [`RunSummary`] describes one pipeline run: which signal was produced,
//! how large the final table is, and which exposure years were skipped.

use crate::export::ExportError;
use crate::naming::signal_name;
use chrono::NaiveDate;
use fmom_data::schema::{ASSET_ID, DATE, read_dates};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::f64::consts::LN_2;
use std::fmt;

/// Summary of a single (split, λ) run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// Signal name, see [`signal_name`].
    pub signal: String,

    /// Smoothing parameter.
    pub lambda: f64,

    /// ln(2) / λ, in trading days.
    pub half_life: f64,

    /// Rows in the final table.
    pub rows: usize,

    /// Distinct dates in the final table.
    pub dates: usize,

    /// Distinct assets in the final table.
    pub assets: usize,

    /// First date present, if any.
    pub first_date: Option<NaiveDate>,

    /// Last date present, if any.
    pub last_date: Option<NaiveDate>,

    /// Years whose exposure partition was read.
    pub years_loaded: Vec<i32>,

    /// Years skipped because their partition was missing.
    pub years_skipped: Vec<i32>,
}

impl RunSummary {
    /// Summarize a final alpha table.
    ///
    /// # Examples
    ///
    /// ```
    /// use fmom_output::RunSummary;
    /// use polars::prelude::*;
    ///
    /// let table = DataFrame::new(vec![
    ///     Series::new("date".into(), Vec::<i32>::new()).cast(&DataType::Date).unwrap().into(),
    ///     Series::new("asset_id".into(), Vec::<String>::new()).into(),
    /// ])
    /// .unwrap();
    ///
    /// let summary = RunSummary::from_table(0.011, &table, vec![2010], vec![2011]).unwrap();
    /// assert_eq!(summary.rows, 0);
    /// assert_eq!(summary.signal, "factor_momentum_lambda_0.011000");
    /// ```
    pub fn from_table(
        lambda: f64,
        table: &DataFrame,
        years_loaded: Vec<i32>,
        years_skipped: Vec<i32>,
    ) -> Result<Self, ExportError> {
        let dates = read_dates(table, DATE)?;
        let distinct_dates: HashSet<NaiveDate> = dates.iter().copied().collect();

        let assets = table.column(ASSET_ID)?.cast(&DataType::String)?;
        let distinct_assets: HashSet<&str> = assets.str()?.into_iter().flatten().collect();

        Ok(Self {
            signal: signal_name(lambda),
            lambda,
            half_life: LN_2 / lambda,
            rows: table.height(),
            dates: distinct_dates.len(),
            assets: distinct_assets.len(),
            first_date: dates.iter().min().copied(),
            last_date: dates.iter().max().copied(),
            years_loaded,
            years_skipped,
        })
    }

    /// Average number of assets per date.
    pub fn assets_per_date(&self) -> f64 {
        if self.dates == 0 {
            0.0
        } else {
            self.rows as f64 / self.dates as f64
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (half-life {:.1} days)", self.signal, self.half_life)?;
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => writeln!(f, "  period: {first} to {last}")?,
            _ => writeln!(f, "  period: empty")?,
        }
        writeln!(
            f,
            "  rows: {}, dates: {}, assets: {} ({:.1} per date)",
            self.rows,
            self.dates,
            self.assets,
            self.assets_per_date()
        )?;
        if self.years_skipped.is_empty() {
            write!(f, "  exposure years: {} loaded", self.years_loaded.len())
        } else {
            write!(
                f,
                "  exposure years: {} loaded, skipped {:?}",
                self.years_loaded.len(),
                self.years_skipped
            )
        }
    }
}
