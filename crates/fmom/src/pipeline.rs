//! End-to-end alpha computation.
//!
//! Stages, each a pure function of its inputs and the [`AlphaConfig`]:
//!
//! 1. EWMA signal and risk per factor
//! 2. Cross-sectional normalization of the vol-adjusted signal
//! 3. Factor alpha = IC × lagged risk × lagged score
//! 4. Projection onto assets, one exposure year at a time
//! 5. Investable-universe filter
//!
//! Factor returns and attributes are loaded once per split and shared across
//! λ values by [`AlphaPipeline::run_grid`].

use crate::config::{AlphaConfig, DateSplit, LambdaGrid};
use crate::error::Result;
use fmom_assets::mapper::empty_asset_alpha;
use fmom_assets::{ExposureMapper, PreparedAttributes, UniverseFilter};
use fmom_data::schema::{ASSET_ID, DATE};
use fmom_data::{AssetAttributeSource, DataError, ExposureSource, FactorReturnSource};
use fmom_output::RunSummary;
use fmom_signal::{AlphaComposer, CrossSectionalNormalizer, FactorPanel, SignalEngine};
use polars::prelude::*;
use tracing::{debug, info};

/// Inputs shared by every λ of a split.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    /// Factor returns over the split
    pub returns: FactorPanel,
    /// Asset attributes with the lagged price attached
    pub attributes: PreparedAttributes,
}

/// Result of one (split, λ) run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// `(date, asset_id, beta, alpha)`, sorted by `(date, asset_id)`
    pub table: DataFrame,
    /// Counts and skipped years
    pub summary: RunSummary,
}

/// Factor momentum pipeline for one configuration.
#[derive(Debug, Clone, Copy)]
pub struct AlphaPipeline {
    config: AlphaConfig,
    engine: SignalEngine,
    normalizer: CrossSectionalNormalizer,
    composer: AlphaComposer,
    filter: UniverseFilter,
}

impl AlphaPipeline {
    /// Build a pipeline, validating `config`.
    pub fn new(config: AlphaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            engine: SignalEngine::new(config.ewma())?,
            normalizer: CrossSectionalNormalizer::new(config.score_clip)?,
            composer: AlphaComposer::new(config.ic)?,
            filter: UniverseFilter::new(config.min_price)?,
        })
    }

    /// Same pipeline with a different λ.
    pub fn with_lambda(&self, lambda: f64) -> Result<Self> {
        Self::new(self.config.with_lambda(lambda))
    }

    /// Active configuration.
    pub const fn config(&self) -> &AlphaConfig {
        &self.config
    }

    /// Factor-level alpha from factor returns.
    ///
    /// The first date and every date with an undefined factor are dropped.
    pub fn compute_factor_alphas(&self, returns: &FactorPanel) -> Result<FactorPanel> {
        let signal = self.engine.compute(returns)?;
        let scores = self.normalizer.normalize(&signal.vol_adjusted)?;
        Ok(self.composer.compose(&signal.risk, &scores)?)
    }

    /// Load factor returns and asset attributes for `split`.
    ///
    /// # Errors
    /// Missing or malformed factor returns are fatal.
    pub fn load_inputs<S>(&self, sources: &S, split: &DateSplit) -> Result<PipelineInputs>
    where
        S: FactorReturnSource + AssetAttributeSource,
    {
        let frame = sources.load_factor_returns(split.start, split.end)?;
        let returns = FactorPanel::from_frame(&frame)?;
        if returns.is_empty() || returns.n_factors() == 0 {
            return Err(DataError::MissingData {
                source_name: "factor returns".to_string(),
                reason: format!("no factor returns for split '{}'", split.name),
            }
            .into());
        }

        let attributes = self
            .filter
            .prepare(sources.load_attributes(split.start, split.end)?)?;

        info!(
            split = %split.name,
            dates = returns.n_dates(),
            factors = returns.n_factors(),
            attribute_rows = attributes.frame().height(),
            "loaded pipeline inputs"
        );
        Ok(PipelineInputs {
            returns,
            attributes,
        })
    }

    /// Run every stage on already loaded inputs.
    pub fn run_prepared<E>(
        &self,
        inputs: &PipelineInputs,
        exposures: &E,
        split: &DateSplit,
    ) -> Result<PipelineOutput>
    where
        E: ExposureSource,
    {
        let factor_alpha = self.compute_factor_alphas(&inputs.returns)?;
        debug!(
            lambda = self.config.lambda,
            dates = factor_alpha.n_dates(),
            "computed factor alphas"
        );

        let mapper = ExposureMapper::new(exposures);
        let mut frames = Vec::new();
        let mut years_loaded = Vec::new();
        let mut years_skipped = Vec::new();

        for chunk in mapper.stream(&factor_alpha, split.start, split.end) {
            let chunk = chunk?;
            if !chunk.partition_found {
                years_skipped.push(chunk.year);
                continue;
            }
            years_loaded.push(chunk.year);
            let filtered = self.filter.apply(&chunk.frame, &inputs.attributes)?;
            debug!(year = chunk.year, rows = filtered.height(), "filtered year");
            frames.push(filtered.lazy());
        }

        let table = if frames.is_empty() {
            self.filter
                .apply(&empty_asset_alpha()?, &inputs.attributes)?
        } else {
            concat(frames, UnionArgs::default())?
                .sort([DATE, ASSET_ID], SortMultipleOptions::default())
                .collect()?
        };

        let summary = RunSummary::from_table(self.config.lambda, &table, years_loaded, years_skipped)?;
        info!(
            split = %split.name,
            signal = %summary.signal,
            rows = summary.rows,
            skipped_years = summary.years_skipped.len(),
            "computed asset alphas"
        );
        Ok(PipelineOutput { table, summary })
    }

    /// Load inputs for `split` and run every stage.
    pub fn run<S>(&self, sources: &S, split: &DateSplit) -> Result<PipelineOutput>
    where
        S: FactorReturnSource + ExposureSource + AssetAttributeSource,
    {
        let inputs = self.load_inputs(sources, split)?;
        self.run_prepared(&inputs, sources, split)
    }

    /// Run once per λ of `grid`, loading inputs once.
    ///
    /// Every other parameter comes from this pipeline's configuration.
    pub fn run_grid<S>(
        &self,
        sources: &S,
        split: &DateSplit,
        grid: &LambdaGrid,
    ) -> Result<Vec<PipelineOutput>>
    where
        S: FactorReturnSource + ExposureSource + AssetAttributeSource,
    {
        let inputs = self.load_inputs(sources, split)?;
        grid.lambdas()
            .into_iter()
            .map(|lambda| self.with_lambda(lambda)?.run_prepared(&inputs, sources, split))
            .collect()
    }
}
