//! Exponentially Weighted Moving Average (EWMA) signal engine
//!
//! For each factor, two EWMAs share the smoothing parameter λ:
//!
//! mean_t = λ * r_t   + (1-λ) * mean_{t-1}
//! var_t  = λ * r_t^2 + (1-λ) * var_{t-1}
//!
//! The risk proxy is sqrt(var_t) and the vol-adjusted momentum signal is
//! mean_t / risk_t.
//!
//! By default (`bias_correction`) the weights are renormalized over the
//! observations seen so far:
//!
//! mean_t = Σ_i (1-λ)^i r_{t-i} / Σ_i (1-λ)^i
//!
//! With `bias_correction` off, the recurrence above is seeded with the first
//! observation, which then carries extra weight during warm-up.

use crate::error::{Result, SignalError};
use crate::panel::FactorPanel;
use ndarray::{Array1, Array2, ArrayView1, Zip};
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

/// EWMA configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EwmaConfig {
    /// Smoothing parameter λ, the weight of the newest observation (0 < λ <= 1)
    pub lambda: f64,

    /// Renormalize weights over the observations seen so far (default: true)
    pub bias_correction: bool,
}

impl Default for EwmaConfig {
    fn default() -> Self {
        Self {
            lambda: 0.693 / 126.0,
            bias_correction: true,
        }
    }
}

/// Approximate half-life in periods, ln(2) / λ.
pub fn half_life(lambda: f64) -> f64 {
    LN_2 / lambda
}

/// Exponential smoother over a single series.
#[derive(Debug, Clone, Copy)]
pub struct Ewma {
    config: EwmaConfig,
}

impl Ewma {
    /// Create a smoother, validating λ.
    pub fn new(config: EwmaConfig) -> Result<Self> {
        if !(config.lambda > 0.0 && config.lambda <= 1.0) {
            return Err(SignalError::InvalidLambda(config.lambda));
        }
        Ok(Self { config })
    }

    /// Smoothing parameter.
    pub const fn lambda(&self) -> f64 {
        self.config.lambda
    }

    /// Smooth a series in a single forward pass.
    ///
    /// A `NaN` observation leaves the state untouched; its output is the
    /// current state, or `NaN` before the first observation.
    pub fn smooth(&self, series: ArrayView1<'_, f64>) -> Array1<f64> {
        let lambda = self.config.lambda;
        let decay = 1.0 - lambda;
        let mut out = Array1::<f64>::from_elem(series.len(), f64::NAN);

        if self.config.bias_correction {
            let mut weighted_sum = 0.0;
            let mut weight_total = 0.0;
            for (t, &x) in series.iter().enumerate() {
                if !x.is_nan() {
                    weighted_sum = x + decay * weighted_sum;
                    weight_total = 1.0 + decay * weight_total;
                }
                if weight_total > 0.0 {
                    out[t] = weighted_sum / weight_total;
                }
            }
        } else {
            let mut state: Option<f64> = None;
            for (t, &x) in series.iter().enumerate() {
                if !x.is_nan() {
                    state = Some(state.map_or(x, |prev| lambda * x + decay * prev));
                }
                out[t] = state.unwrap_or(f64::NAN);
            }
        }

        out
    }
}

/// Per-factor EWMA outputs, all on the input panel's axes.
#[derive(Debug, Clone)]
pub struct SignalOutput {
    /// EWMA of returns
    pub mean: FactorPanel,
    /// Square root of the EWMA of squared returns
    pub risk: FactorPanel,
    /// `mean / risk`, undefined where risk is zero
    pub vol_adjusted: FactorPanel,
}

/// Converts factor returns into a volatility-adjusted momentum signal.
#[derive(Debug, Clone, Copy)]
pub struct SignalEngine {
    ewma: Ewma,
}

impl SignalEngine {
    /// Create an engine with the given EWMA configuration.
    pub fn new(config: EwmaConfig) -> Result<Self> {
        Ok(Self {
            ewma: Ewma::new(config)?,
        })
    }

    /// Create an engine for λ with the default bias correction.
    pub fn with_lambda(lambda: f64) -> Result<Self> {
        Self::new(EwmaConfig {
            lambda,
            ..EwmaConfig::default()
        })
    }

    /// Run both smoothers over every factor of `returns`.
    ///
    /// Each factor keeps independent state. Division by a zero risk proxy
    /// yields `NaN` rather than an error.
    pub fn compute(&self, returns: &FactorPanel) -> Result<SignalOutput> {
        let dim = returns.values().dim();
        let mut mean = Array2::<f64>::zeros(dim);
        let mut risk = Array2::<f64>::zeros(dim);

        for (j, column) in returns.values().columns().into_iter().enumerate() {
            let squared = column.mapv(|r| r * r);
            mean.column_mut(j).assign(&self.ewma.smooth(column));
            risk.column_mut(j)
                .assign(&self.ewma.smooth(squared.view()).mapv(f64::sqrt));
        }

        let vol_adjusted = Zip::from(&mean).and(&risk).map_collect(|&m, &r| {
            if r > 0.0 { m / r } else { f64::NAN }
        });

        Ok(SignalOutput {
            mean: returns.with_values(mean)?,
            risk: returns.with_values(risk)?,
            vol_adjusted: returns.with_values(vol_adjusted)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ndarray::array;
    use rstest::rstest;

    fn panel(values: Array2<f64>, factors: &[&str]) -> FactorPanel {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates = (0..values.nrows())
            .map(|i| start + chrono::Days::new(i as u64))
            .collect();
        FactorPanel::new(
            dates,
            factors.iter().map(|f| (*f).to_string()).collect(),
            values,
        )
        .unwrap()
    }

    #[test]
    fn test_ewma_config_default() {
        let config = EwmaConfig::default();
        assert_relative_eq!(config.lambda, 0.0055, epsilon = 1e-12);
        assert!(config.bias_correction);
    }

    #[rstest]
    #[case(0.1, 0.01, 0.02)]
    #[case(0.5, 1.0, 3.0)]
    #[case(0.0055, -0.004, 0.007)]
    fn test_default_is_weight_normalized(#[case] lambda: f64, #[case] x0: f64, #[case] x1: f64) {
        let engine = SignalEngine::with_lambda(lambda).unwrap();
        let out = engine.compute(&panel(array![[x0], [x1]], &["Beta"])).unwrap();
        let decay = 1.0 - lambda;
        assert_relative_eq!(out.mean.values()[[0, 0]], x0, epsilon = 1e-15);
        assert_relative_eq!(
            out.mean.values()[[1, 0]],
            (x1 + decay * x0) / (1.0 + decay),
            epsilon = 1e-15
        );
        assert_relative_eq!(
            out.risk.values()[[1, 0]],
            ((x1 * x1 + decay * x0 * x0) / (1.0 + decay)).sqrt(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_unadjusted_opt_out() {
        let engine = SignalEngine::new(EwmaConfig {
            lambda: 0.1,
            bias_correction: false,
        })
        .unwrap();
        let out = engine.compute(&panel(array![[0.01], [0.02]], &["Beta"])).unwrap();
        assert_relative_eq!(out.mean.values()[[1, 0]], 0.011, epsilon = 1e-15);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.1)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn test_invalid_lambda(#[case] lambda: f64) {
        assert!(SignalEngine::with_lambda(lambda).is_err());
    }

    #[test]
    fn test_half_life() {
        assert_relative_eq!(half_life(LN_2 / 21.0), 21.0, epsilon = 1e-12);
        assert_relative_eq!(half_life(0.693 / 252.0), 252.06, epsilon = 0.01);
    }

    #[test]
    fn test_smooth_recurrence() {
        let ewma = Ewma::new(EwmaConfig {
            lambda: 0.5,
            bias_correction: false,
        })
        .unwrap();
        let out = ewma.smooth(array![1.0, 3.0, 5.0].view());
        assert_relative_eq!(out[0], 1.0);
        assert_relative_eq!(out[1], 2.0);
        assert_relative_eq!(out[2], 3.5);
    }

    #[test]
    fn test_smooth_bias_corrected() {
        let ewma = Ewma::new(EwmaConfig {
            lambda: 0.5,
            bias_correction: true,
        })
        .unwrap();
        let out = ewma.smooth(array![1.0, 3.0].view());
        assert_relative_eq!(out[0], 1.0);
        // (3 + 0.5 * 1) / (1 + 0.5)
        assert_relative_eq!(out[1], 3.5 / 1.5);
    }

    #[test]
    fn test_smooth_skips_missing() {
        let ewma = Ewma::new(EwmaConfig {
            lambda: 0.5,
            bias_correction: false,
        })
        .unwrap();
        let out = ewma.smooth(array![f64::NAN, 2.0, f64::NAN, 4.0].view());
        assert!(out[0].is_nan());
        assert_relative_eq!(out[1], 2.0);
        assert_relative_eq!(out[2], 2.0);
        assert_relative_eq!(out[3], 3.0);
    }

    #[test]
    fn test_lambda_one_tracks_latest() {
        let engine = SignalEngine::with_lambda(1.0).unwrap();
        let out = engine
            .compute(&panel(array![[0.02], [-0.01]], &["Beta"]))
            .unwrap();
        assert_relative_eq!(out.mean.values()[[1, 0]], -0.01, epsilon = 1e-12);
        assert_relative_eq!(out.risk.values()[[1, 0]], 0.01, epsilon = 1e-12);
        assert_relative_eq!(out.vol_adjusted.values()[[1, 0]], -1.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(0.004)]
    #[case(-0.013)]
    fn test_constant_returns_converge_to_sign(#[case] c: f64) {
        let values = Array2::from_elem((500, 1), c);
        let engine = SignalEngine::with_lambda(0.05).unwrap();
        let out = engine.compute(&panel(values, &["Beta"])).unwrap();
        assert_relative_eq!(
            out.vol_adjusted.values()[[499, 0]],
            c.signum(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_zero_risk_is_undefined() {
        let engine = SignalEngine::with_lambda(0.1).unwrap();
        let out = engine
            .compute(&panel(array![[0.0, 0.01], [0.0, 0.02]], &["Beta", "Size"]))
            .unwrap();
        assert!(out.vol_adjusted.values()[[0, 0]].is_nan());
        assert!(out.vol_adjusted.values()[[1, 0]].is_nan());
        assert!(out.vol_adjusted.values()[[1, 1]].is_finite());
    }

    #[test]
    fn test_factors_are_independent() {
        let engine = SignalEngine::with_lambda(0.2).unwrap();
        let both = engine
            .compute(&panel(array![[0.01, 0.5], [0.02, -0.3]], &["A", "B"]))
            .unwrap();
        let alone = engine
            .compute(&panel(array![[0.01], [0.02]], &["A"]))
            .unwrap();
        assert_eq!(both.mean.column("A").unwrap(), alone.mean.column("A").unwrap());
        assert_eq!(both.risk.column("A").unwrap(), alone.risk.column("A").unwrap());
    }
}
