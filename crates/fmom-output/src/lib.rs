#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fmom/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod naming;
pub mod summary;

pub use export::{
    AlphaRecord, AlphaWriter, ExportError, ExportFormat, Exporter, read_alpha_table,
    records_from_frame, write_alpha_table,
};
pub use naming::{SIGNAL_PREFIX, alphas_path, signal_name, split_dir};
pub use summary::RunSummary;
