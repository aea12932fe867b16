//! Cross-sectional normalization.
//!
//! For each date, the vol-adjusted signal of every factor is standardized
//! against that date's cross-factor mean and population standard deviation,
//! then clipped to `[-clip, clip]`.

use crate::error::{Result, SignalError};
use crate::panel::FactorPanel;
use crate::rows::RowReduce;
use ndarray::Array2;

/// Default clip bound for normalized scores.
pub const DEFAULT_SCORE_CLIP: f64 = 3.0;

/// Cross-sectional z-score with clipping.
#[derive(Debug, Clone, Copy)]
pub struct CrossSectionalNormalizer {
    clip: f64,
}

impl Default for CrossSectionalNormalizer {
    fn default() -> Self {
        Self {
            clip: DEFAULT_SCORE_CLIP,
        }
    }
}

impl CrossSectionalNormalizer {
    /// Create a normalizer clipping scores to `[-clip, clip]`.
    pub fn new(clip: f64) -> Result<Self> {
        if !(clip.is_finite() && clip > 0.0) {
            return Err(SignalError::InvalidParameter(format!(
                "score clip must be positive and finite, got {clip}"
            )));
        }
        Ok(Self { clip })
    }

    /// Clip bound.
    pub const fn clip(&self) -> f64 {
        self.clip
    }

    /// Standardize each row of `signal`.
    ///
    /// A row with zero dispersion, or with any undefined cell, is undefined
    /// for every factor.
    pub fn normalize(&self, signal: &FactorPanel) -> Result<FactorPanel> {
        let values = signal.values();
        let mean = values.row_mean();
        let std = values.row_std();

        let scores = Array2::from_shape_fn(values.dim(), |(i, j)| {
            let s = std[i];
            if s > 0.0 {
                ((values[[i, j]] - mean[i]) / s).clamp(-self.clip, self.clip)
            } else {
                f64::NAN
            }
        });

        signal.with_values(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ndarray::array;
    use rstest::rstest;

    fn panel(values: Array2<f64>) -> FactorPanel {
        let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let dates = (0..values.nrows())
            .map(|i| start + chrono::Days::new(i as u64))
            .collect();
        let factors = (0..values.ncols()).map(|j| format!("F{}", j + 1)).collect();
        FactorPanel::new(dates, factors, values).unwrap()
    }

    #[test]
    fn test_invalid_clip() {
        assert!(CrossSectionalNormalizer::new(0.0).is_err());
        assert!(CrossSectionalNormalizer::new(f64::INFINITY).is_err());
        assert_eq!(CrossSectionalNormalizer::default().clip(), 3.0);
    }

    #[test]
    fn test_zscore_across_factors() {
        let scores = CrossSectionalNormalizer::default()
            .normalize(&panel(array![[1.0, 2.0, 3.0]]))
            .unwrap();
        let expected = 1.0 / (2.0_f64 / 3.0).sqrt();
        assert_relative_eq!(scores.values()[[0, 0]], -expected, epsilon = 1e-12);
        assert_relative_eq!(scores.values()[[0, 1]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(scores.values()[[0, 2]], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_rows_are_independent() {
        let scores = CrossSectionalNormalizer::default()
            .normalize(&panel(array![[1.0, 2.0], [10.0, -4.0]]))
            .unwrap();
        assert_relative_eq!(scores.values()[[0, 0]], -1.0, epsilon = 1e-12);
        assert_relative_eq!(scores.values()[[1, 0]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_dispersion_is_undefined() {
        let scores = CrossSectionalNormalizer::default()
            .normalize(&panel(array![[0.5, 0.5, 0.5], [1.0, 0.0, -1.0]]))
            .unwrap();
        assert!(scores.values().row(0).iter().all(|v| v.is_nan()));
        assert!(scores.row_is_defined(1));
    }

    #[test]
    fn test_clip_bound_attained() {
        // One outlier among eleven factors has |z| = sqrt(10) > 3.
        let mut row = vec![0.0; 11];
        row[0] = 1.0;
        let values = Array2::from_shape_vec((1, 11), row).unwrap();
        let scores = CrossSectionalNormalizer::default()
            .normalize(&panel(values))
            .unwrap();

        assert_relative_eq!(scores.values()[[0, 0]], 3.0);
        assert_relative_eq!(scores.values()[[0, 1]], -1.0 / 10.0_f64.sqrt(), epsilon = 1e-12);
        assert!(scores.values().iter().all(|v| (-3.0..=3.0).contains(v)));
    }

    #[rstest]
    #[case(1.0)]
    #[case(-2.5)]
    #[case(0.004)]
    fn test_outlier_exactly_at_bound(#[case] outlier: f64) {
        // Ten factors: the outlier has |z| = sqrt(9) = 3, the rest 1/3.
        let mut row = vec![0.0; 10];
        row[0] = outlier;
        let values = Array2::from_shape_vec((1, 10), row).unwrap();
        let scores = CrossSectionalNormalizer::default()
            .normalize(&panel(values))
            .unwrap();

        let sign = outlier.signum();
        assert_relative_eq!(scores.values()[[0, 0]], 3.0 * sign, epsilon = 1e-12);
        for j in 1..10 {
            assert_relative_eq!(scores.values()[[0, j]], -sign / 3.0, epsilon = 1e-12);
        }
        let mean = scores.values().row(0).sum() / 10.0;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unclipped_below_bound() {
        // Nine factors: the outlier has |z| = sqrt(8) < 3.
        let mut row = vec![0.0; 9];
        row[0] = -1.0;
        let values = Array2::from_shape_vec((1, 9), row).unwrap();
        let scores = CrossSectionalNormalizer::default()
            .normalize(&panel(values))
            .unwrap();
        assert_relative_eq!(scores.values()[[0, 0]], -(8.0_f64).sqrt(), epsilon = 1e-12);
    }
}
