#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/empirica/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod sorter;
pub use sorter::{SortError, Sorter};

mod estimator;
pub use estimator::{CrossSectionRegressor, EstimatorError, PanelEstimator};

mod export;
pub use export::ToFrame;
