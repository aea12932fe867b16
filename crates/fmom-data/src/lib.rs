#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fmom/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod memory;
pub mod parquet;
pub mod schema;
pub mod source;

pub use error::{DataError, Result};
pub use memory::MemoryStore;
pub use parquet::ParquetStore;
pub use source::{AssetAttributeSource, ExposureSource, FactorReturnSource};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
