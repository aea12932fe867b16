//! Row-wise reductions across a fixed set of columns.
//!
//! Cross-sectional statistics are taken across the factor columns of each
//! date, not down a column. Any undefined cell makes the row statistic
//! undefined.

use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix2};

/// Reductions applied independently to each row of a 2-D array.
pub trait RowReduce {
    /// Apply `f` to every row.
    fn reduce_rows<F>(&self, f: F) -> Array1<f64>
    where
        F: Fn(ArrayView1<'_, f64>) -> f64;

    /// Arithmetic mean of each row.
    fn row_mean(&self) -> Array1<f64> {
        self.reduce_rows(mean)
    }

    /// Population variance of each row (mean of squared deviations).
    fn row_variance(&self) -> Array1<f64> {
        self.reduce_rows(population_variance)
    }

    /// Square root of [`Self::row_variance`].
    fn row_std(&self) -> Array1<f64> {
        self.row_variance().mapv(f64::sqrt)
    }
}

impl<S> RowReduce for ArrayBase<S, Ix2>
where
    S: Data<Elem = f64>,
{
    fn reduce_rows<F>(&self, f: F) -> Array1<f64>
    where
        F: Fn(ArrayView1<'_, f64>) -> f64,
    {
        self.rows().into_iter().map(f).collect()
    }
}

fn mean(row: ArrayView1<'_, f64>) -> f64 {
    if row.is_empty() {
        return f64::NAN;
    }
    row.sum() / row.len() as f64
}

fn population_variance(row: ArrayView1<'_, f64>) -> f64 {
    let m = mean(row);
    if m.is_nan() {
        return f64::NAN;
    }
    mean(row.mapv(|x| (x - m).powi(2)).view())
}
