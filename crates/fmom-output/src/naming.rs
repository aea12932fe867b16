//! Signal names and output locations.

use std::path::{Path, PathBuf};

/// Prefix shared by every factor momentum signal name.
pub const SIGNAL_PREFIX: &str = "factor_momentum_lambda_";

/// Signal name for λ, formatted to six decimal places.
///
/// ```
/// use fmom_output::signal_name;
///
/// assert_eq!(signal_name(0.693 / 21.0), "factor_momentum_lambda_0.033000");
/// ```
pub fn signal_name(lambda: f64) -> String {
    format!("{SIGNAL_PREFIX}{lambda:.6}")
}

/// Results directory of a split, `{root}/results/{split}`.
pub fn split_dir(root: &Path, split: &str) -> PathBuf {
    root.join("results").join(split)
}

/// Location of the alpha table for a split and λ.
pub fn alphas_path(root: &Path, split: &str, lambda: f64, extension: &str) -> PathBuf {
    split_dir(root, split)
        .join("alphas")
        .join(format!("{}.{extension}", signal_name(lambda)))
}
