#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fmom/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod keys;
pub mod mapper;
pub mod universe;

pub use error::{MappingError, Result};
pub use mapper::{ExposureMapper, MappedAlpha, YearChunk, YearlyAlpha, project};
pub use universe::{DEFAULT_MIN_PRICE, PreparedAttributes, UniverseFilter};
