//! Alpha composition.
//!
//! factor_alpha(c, t) = IC * risk(c, t-1) * score(c, t-1)
//!
//! Both inputs are lagged one trading day so that the alpha for day t only
//! uses information observed before t. A date on which any factor is
//! undefined after lagging is dropped in full; the first date always is.

use crate::error::{Result, SignalError};
use crate::panel::FactorPanel;
use tracing::debug;

/// Default information coefficient.
pub const DEFAULT_IC: f64 = 0.05;

/// Combines lagged risk and lagged normalized score into factor alpha.
#[derive(Debug, Clone, Copy)]
pub struct AlphaComposer {
    ic: f64,
}

impl Default for AlphaComposer {
    fn default() -> Self {
        Self { ic: DEFAULT_IC }
    }
}

impl AlphaComposer {
    /// Create a composer with information coefficient `ic`.
    pub fn new(ic: f64) -> Result<Self> {
        if !ic.is_finite() {
            return Err(SignalError::InvalidParameter(format!(
                "information coefficient must be finite, got {ic}"
            )));
        }
        Ok(Self { ic })
    }

    /// Information coefficient.
    pub const fn ic(&self) -> f64 {
        self.ic
    }

    /// Compose factor alpha from the risk proxy and normalized scores.
    ///
    /// # Errors
    /// Fails if `risk` and `scores` are not on the same dates and factors.
    pub fn compose(&self, risk: &FactorPanel, scores: &FactorPanel) -> Result<FactorPanel> {
        if !risk.is_aligned_with(scores) {
            return Err(SignalError::Misaligned(
                "risk and score panels must share dates and factors".to_string(),
            ));
        }

        let lagged_risk = risk.shifted(1);
        let lagged_scores = scores.shifted(1);
        let alpha = lagged_risk.values() * lagged_scores.values() * self.ic;

        let composed = risk.with_values(alpha)?.drop_undefined_rows();
        debug!(
            input_dates = risk.n_dates(),
            alpha_dates = composed.n_dates(),
            "composed factor alpha"
        );
        Ok(composed)
    }
}
