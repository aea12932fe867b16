//! Date by factor panels.
//!
//! A [`FactorPanel`] is the in-memory shape of every factor-level table in the
//! pipeline: returns, EWMA signal and risk, normalized scores and factor alpha.
//! Rows are trading dates (unique, strictly increasing), columns are factors.
//! `NaN` marks an undefined cell and propagates through every stage.

use crate::error::{Result, SignalError};
use chrono::{Datelike, NaiveDate};
use fmom_data::schema::{DATE, date_column, read_dates, value_columns};
use ndarray::{Array2, ArrayView1, Axis};
use polars::prelude::*;
use std::collections::HashSet;

/// Date by factor matrix of `f64` values.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorPanel {
    dates: Vec<NaiveDate>,
    factors: Vec<String>,
    values: Array2<f64>,
}

impl FactorPanel {
    /// Create a panel, validating its axes.
    ///
    /// # Errors
    /// Fails if dates are not strictly increasing, a factor name repeats, or
    /// `values` is not `dates.len() x factors.len()`.
    pub fn new(dates: Vec<NaiveDate>, factors: Vec<String>, values: Array2<f64>) -> Result<Self> {
        let expected = (dates.len(), factors.len());
        if values.dim() != expected {
            return Err(SignalError::DimensionMismatch {
                expected,
                actual: values.dim(),
            });
        }

        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(SignalError::UnorderedDates {
                    previous: pair[0].to_string(),
                    current: pair[1].to_string(),
                });
            }
        }

        let mut seen = HashSet::with_capacity(factors.len());
        for factor in &factors {
            if !seen.insert(factor.as_str()) {
                return Err(SignalError::DuplicateFactor(factor.clone()));
            }
        }

        Ok(Self {
            dates,
            factors,
            values,
        })
    }

    /// Build a panel from a frame with a `date` column and one column per factor.
    ///
    /// Rows are sorted by date first. Nulls become `NaN`.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        fmom_data::schema::require_columns(df, "factor panel", &[DATE])?;
        let sorted = df
            .clone()
            .lazy()
            .sort([DATE], SortMultipleOptions::default())
            .collect()?;

        let dates = read_dates(&sorted, DATE)?;
        let factors = value_columns(&sorted, &[DATE]);

        let mut columns = Vec::with_capacity(factors.len());
        for factor in &factors {
            let cast = sorted.column(factor)?.cast(&DataType::Float64)?;
            let values: Vec<f64> = cast
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            columns.push(values);
        }

        let values = Array2::from_shape_fn((dates.len(), factors.len()), |(i, j)| columns[j][i]);
        Self::new(dates, factors, values)
    }

    /// Convert to a frame with a `date` column and one column per factor.
    ///
    /// Undefined cells become nulls.
    pub fn to_frame(&self) -> Result<DataFrame> {
        self.to_frame_with_suffix("")
    }

    /// Like [`Self::to_frame`], appending `suffix` to every factor column name.
    pub fn to_frame_with_suffix(&self, suffix: &str) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.factors.len() + 1);
        columns.push(date_column(DATE, &self.dates)?);
        for (j, factor) in self.factors.iter().enumerate() {
            let values: Vec<Option<f64>> = self
                .values
                .column(j)
                .iter()
                .map(|v| (!v.is_nan()).then_some(*v))
                .collect();
            columns.push(Series::new(format!("{factor}{suffix}").into(), values).into());
        }
        Ok(DataFrame::new(columns)?)
    }

    /// A panel on the same axes with different values.
    pub fn with_values(&self, values: Array2<f64>) -> Result<Self> {
        Self::new(self.dates.clone(), self.factors.clone(), values)
    }

    /// Trading dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Factor names, in column order.
    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    /// Raw matrix (dates x factors).
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of dates.
    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    /// Number of factors.
    pub fn n_factors(&self) -> usize {
        self.factors.len()
    }

    /// Whether the panel has no dates.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Values of one factor over time.
    pub fn column(&self, factor: &str) -> Option<ArrayView1<'_, f64>> {
        self.factor_index(factor).map(|j| self.values.column(j))
    }

    /// Single cell, `None` if the factor or date is unknown.
    pub fn value(&self, date: NaiveDate, factor: &str) -> Option<f64> {
        let i = self.dates.binary_search(&date).ok()?;
        let j = self.factor_index(factor)?;
        Some(self.values[[i, j]])
    }

    /// Column index of `factor`.
    pub fn factor_index(&self, factor: &str) -> Option<usize> {
        self.factors.iter().position(|f| f == factor)
    }

    /// Whether both panels share dates and factors, in the same order.
    pub fn is_aligned_with(&self, other: &Self) -> bool {
        self.dates == other.dates && self.factors == other.factors
    }

    /// Shift rows forward by `periods`, so row `t` holds the values of `t - periods`.
    ///
    /// The first `periods` rows become undefined.
    pub fn shifted(&self, periods: usize) -> Self {
        let (n, k) = self.values.dim();
        let values = Array2::from_shape_fn((n, k), |(i, j)| {
            if i >= periods {
                self.values[[i - periods, j]]
            } else {
                f64::NAN
            }
        });
        Self {
            dates: self.dates.clone(),
            factors: self.factors.clone(),
            values,
        }
    }

    /// Whether every factor is defined on row `i`.
    pub fn row_is_defined(&self, i: usize) -> bool {
        self.values.row(i).iter().all(|v| v.is_finite())
    }

    /// Keep only the rows for which `keep(row_index)` is true.
    pub fn filter_rows(&self, keep: impl Fn(usize) -> bool) -> Self {
        let rows: Vec<usize> = (0..self.n_dates()).filter(|&i| keep(i)).collect();
        Self {
            dates: rows.iter().map(|&i| self.dates[i]).collect(),
            factors: self.factors.clone(),
            values: self.values.select(Axis(0), &rows),
        }
    }

    /// Drop every date on which any factor is undefined.
    pub fn drop_undefined_rows(&self) -> Self {
        self.filter_rows(|i| self.row_is_defined(i))
    }

    /// Rows whose date falls in calendar `year`.
    pub fn year_slice(&self, year: i32) -> Self {
        self.filter_rows(|i| self.dates[i].year() == year)
    }
}
