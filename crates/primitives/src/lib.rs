#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/empirica/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod asset;
pub use asset::Symbol;

mod period;
pub use period::Period;

mod observation;
pub use observation::{CrossSection, Observation, Panel};

mod bucket;
pub use bucket::BucketAssignment;

mod returns;
pub use returns::{PortfolioKey, PortfolioReturns};

mod regression;
pub use regression::{CrossSectionFit, RegressionResult};

mod error;
pub use error::PanelError;

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
