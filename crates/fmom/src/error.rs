//! Error types for pipeline runs.

use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised while configuring or running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unknown date split
    #[error("Unknown split '{0}'")]
    UnknownSplit(String),

    /// Input loading error
    #[error(transparent)]
    Data(#[from] fmom_data::DataError),

    /// Signal computation error
    #[error(transparent)]
    Signal(#[from] fmom_signal::SignalError),

    /// Exposure mapping or universe filtering error
    #[error(transparent)]
    Mapping(#[from] fmom_assets::MappingError),

    /// Output error
    #[error(transparent)]
    Export(#[from] fmom_output::ExportError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Configuration file error
    #[error("Configuration file error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
