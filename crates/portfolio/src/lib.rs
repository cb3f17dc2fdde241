#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/empirica/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod sorter;
pub use sorter::{BreakpointSpec, QuantileSorter};

mod aggregate;
pub use aggregate::{BucketReturn, PortfolioAggregator, Weighting};

mod summary;
pub use summary::{PortfolioSummary, returns_frame, summary_frame};

mod univariate;
pub use univariate::{UnivariateConfig, UnivariateResult, UnivariateSort};

mod bivariate;
pub use bivariate::{BivariateConfig, BivariateResult, BivariateSort, SortMethod};

mod error;
pub use error::PortfolioError;

/// Re-export commonly used types.
pub mod prelude {
    pub use empirica_traits::{Sorter, ToFrame};

    pub use super::{
        BivariateConfig, BivariateSort, BreakpointSpec, PortfolioError, SortMethod,
        UnivariateConfig, UnivariateSort, Weighting,
    };
}
