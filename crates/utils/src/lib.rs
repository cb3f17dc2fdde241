#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/empirica/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod fill;
pub use fill::fill_features;

mod returns;
pub use returns::{FORWARD_RETURN, forward_returns};

mod panel;
pub use panel::{PanelColumns, panel_from_frame};

mod error;
pub use error::UtilsError;
