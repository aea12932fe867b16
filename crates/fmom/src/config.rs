//! Pipeline configuration.
//!
//! Every tunable constant lives in an immutable [`AlphaConfig`] that is passed
//! explicitly into [`crate::AlphaPipeline`]. [`Settings`] bundles it with the
//! λ grid, date splits and data locations, and can be read from a JSON file.

use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use fmom_assets::DEFAULT_MIN_PRICE;
use fmom_data::ParquetStore;
use fmom_signal::{DEFAULT_IC, DEFAULT_SCORE_CLIP, EwmaConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Numerator of the half-life to λ conversion, λ = 0.693 / half-life.
pub const HALF_LIFE_NUMERATOR: f64 = 0.693;

/// Convert a half-life in trading days to λ.
pub fn lambda_for_half_life(half_life: f64) -> f64 {
    HALF_LIFE_NUMERATOR / half_life
}

/// Parameters of a single alpha computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaConfig {
    /// EWMA smoothing parameter, 0 < λ <= 1
    pub lambda: f64,
    /// Information coefficient scaling factor alpha
    pub ic: f64,
    /// Previous-day price an asset must exceed to be investable
    pub min_price: f64,
    /// Bound applied to normalized scores
    pub score_clip: f64,
    /// Renormalize EWMA weights during warm-up
    pub bias_correction: bool,
}

impl Default for AlphaConfig {
    fn default() -> Self {
        Self {
            lambda: lambda_for_half_life(126.0),
            ic: DEFAULT_IC,
            min_price: DEFAULT_MIN_PRICE,
            score_clip: DEFAULT_SCORE_CLIP,
            bias_correction: true,
        }
    }
}

impl AlphaConfig {
    /// Same configuration with a different λ.
    pub const fn with_lambda(self, lambda: f64) -> Self {
        Self { lambda, ..self }
    }

    /// EWMA settings derived from this configuration.
    pub const fn ewma(&self) -> EwmaConfig {
        EwmaConfig {
            lambda: self.lambda,
            bias_correction: self.bias_correction,
        }
    }

    /// Check every parameter.
    pub fn validate(&self) -> Result<()> {
        if !(self.lambda > 0.0 && self.lambda <= 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "lambda must be in (0, 1], got {}",
                self.lambda
            )));
        }
        if !self.ic.is_finite() {
            return Err(PipelineError::InvalidConfig(format!(
                "ic must be finite, got {}",
                self.ic
            )));
        }
        if !self.min_price.is_finite() {
            return Err(PipelineError::InvalidConfig(format!(
                "min_price must be finite, got {}",
                self.min_price
            )));
        }
        if !(self.score_clip.is_finite() && self.score_clip > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "score_clip must be positive, got {}",
                self.score_clip
            )));
        }
        Ok(())
    }
}

/// Half-lives, in trading days, over which λ is searched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LambdaGrid {
    half_lives: Vec<f64>,
}

impl Default for LambdaGrid {
    fn default() -> Self {
        Self {
            half_lives: vec![21.0, 42.0, 63.0, 126.0, 189.0, 252.0],
        }
    }
}

impl LambdaGrid {
    /// Grid from half-lives in trading days.
    pub fn from_half_lives(half_lives: Vec<f64>) -> Result<Self> {
        if half_lives.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "lambda grid is empty".to_string(),
            ));
        }
        if let Some(bad) = half_lives.iter().find(|h| !(h.is_finite() && **h >= HALF_LIFE_NUMERATOR)) {
            return Err(PipelineError::InvalidConfig(format!(
                "half-life must be at least {HALF_LIFE_NUMERATOR} days, got {bad}"
            )));
        }
        Ok(Self { half_lives })
    }

    /// Half-lives in grid order.
    pub fn half_lives(&self) -> &[f64] {
        &self.half_lives
    }

    /// λ values in grid order.
    pub fn lambdas(&self) -> Vec<f64> {
        self.half_lives
            .iter()
            .copied()
            .map(lambda_for_half_life)
            .collect()
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.half_lives.len()
    }

    /// Whether the grid has no points.
    pub fn is_empty(&self) -> bool {
        self.half_lives.is_empty()
    }
}

/// Named inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSplit {
    /// Split name, used in output paths
    pub name: String,
    /// First date, inclusive
    pub start: NaiveDate,
    /// Last date, inclusive
    pub end: NaiveDate,
}

impl DateSplit {
    /// Create a split, rejecting reversed ranges.
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let name = name.into();
        if start > end {
            return Err(PipelineError::InvalidConfig(format!(
                "split '{name}' starts {start} after it ends {end}"
            )));
        }
        Ok(Self { name, start, end })
    }

    /// 1995-01-01 to 2010-01-01.
    pub fn train() -> Self {
        Self {
            name: "train".to_string(),
            start: ymd(1995, 1, 1),
            end: ymd(2010, 1, 1),
        }
    }

    /// 2010-01-01 to 2025-01-01.
    pub fn test() -> Self {
        Self {
            name: "test".to_string(),
            start: ymd(2010, 1, 1),
            end: ymd(2025, 1, 1),
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    /// Factor return Parquet file or glob
    pub factors: PathBuf,
    /// Exposure partition path containing `{year}`
    pub exposures_template: String,
    /// Asset attribute Parquet file or glob
    pub assets: PathBuf,
    /// Root under which `results/{split}/alphas/` is written
    pub output_root: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            factors: PathBuf::from("data/factors/factors_*.parquet"),
            exposures_template: "data/exposures/exposures_{year}.parquet".to_string(),
            assets: PathBuf::from("data/assets/assets_*.parquet"),
            output_root: PathBuf::from("."),
        }
    }
}

impl DataPaths {
    /// Parquet-backed store over these paths.
    pub fn store(&self) -> ParquetStore {
        ParquetStore::new(
            self.factors.clone(),
            self.exposures_template.clone(),
            self.assets.clone(),
        )
    }
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Alpha parameters; `lambda` is overridden by grid runs
    pub alpha: AlphaConfig,
    /// λ search grid
    pub grid: LambdaGrid,
    /// Named date splits
    pub splits: Vec<DateSplit>,
    /// Data locations
    pub paths: DataPaths,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alpha: AlphaConfig::default(),
            grid: LambdaGrid::default(),
            splits: vec![DateSplit::train(), DateSplit::test()],
            paths: DataPaths::default(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.alpha.validate()?;
        LambdaGrid::from_half_lives(self.grid.half_lives.clone())?;
        for split in &self.splits {
            DateSplit::new(split.name.clone(), split.start, split.end)?;
        }
        Ok(())
    }

    /// Look up a split by name.
    pub fn split(&self, name: &str) -> Result<&DateSplit> {
        self.splits
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| PipelineError::UnknownSplit(name.to_string()))
    }
}
