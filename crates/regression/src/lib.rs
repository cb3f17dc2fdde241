#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/empirica/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod ols;
pub use ols::{CrossSectionOls, OlsConfig};

mod fama_macbeth;
pub use fama_macbeth::{FamaMacBeth, FamaMacBethConfig, INTERCEPT, period_frame};

mod error;
pub use error::RegressionError;

/// Re-export commonly used types.
pub mod prelude {
    pub use empirica_traits::{CrossSectionRegressor, PanelEstimator, ToFrame};

    pub use super::{FamaMacBeth, FamaMacBethConfig, RegressionError};
}
