#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/empirica/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod breakpoints;
pub use breakpoints::{
    assign_bucket, assign_buckets, breakpoints, complete_percentiles, equal_percentiles,
    percentile,
};

mod cross_section;
pub use cross_section::{CenterXSection, finite_mean, weighted_mean};

mod winsorize;
pub use winsorize::winsorize;

mod linalg;
pub use linalg::{LeastSquaresResult, least_squares};

mod newey_west;
pub use newey_west::{MeanEstimate, StandardError, bartlett_weight, newey_west_lags};

mod error;
pub use error::MathError;
