#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fmom/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pipeline;

// Re-export main types from sub-crates
pub use fmom_assets as assets;
pub use fmom_data as data;
pub use fmom_output as output;
pub use fmom_signal as signal;

pub use config::{
    AlphaConfig, DataPaths, DateSplit, HALF_LIFE_NUMERATOR, LambdaGrid, Settings,
    lambda_for_half_life,
};
pub use error::{PipelineError, Result};
pub use pipeline::{AlphaPipeline, PipelineInputs, PipelineOutput};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
