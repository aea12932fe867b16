#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fmom/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

pub mod compose;
pub mod error;
pub mod ewma;
pub mod normalize;
pub mod panel;
pub mod rows;

// Re-export main types
pub use compose::{AlphaComposer, DEFAULT_IC};
pub use error::{Result, SignalError};
pub use ewma::{Ewma, EwmaConfig, SignalEngine, SignalOutput, half_life};
pub use normalize::{CrossSectionalNormalizer, DEFAULT_SCORE_CLIP};
pub use panel::FactorPanel;
pub use rows::RowReduce;
