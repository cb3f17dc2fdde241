//! # empirica
//!
//! Empirical asset pricing in Rust: portfolio sorts and Fama-MacBeth
//! regressions over an asset-period panel.
//!
//! This crate provides a unified interface to the empirica crates.
//! Individual components can be enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Panel, period and result types
//! - `traits`: Trait abstractions
//! - `math`: Breakpoints, least squares and Newey-West inference
//! - `portfolio`: Univariate and bivariate portfolio sorts
//! - `regression`: Fama-MacBeth regressions
//! - `utils`: Panel ingestion and data utilities
//! - `cli`: The `pipeline` module and the `analyze` binary
//!
//! The `cli` feature is off by default, so its tests need
//! `cargo test --workspace --all-features`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use empirica::portfolio::{UnivariateConfig, UnivariateSort};
//!
//! let sort = UnivariateSort::with_config(UnivariateConfig::new("bm"))?;
//! let result = sort.run(&panel)?;
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/empirica/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use empirica_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use empirica_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use empirica_math as math;
#[cfg(feature = "portfolio")]
#[doc(inline)]
pub use empirica_portfolio as portfolio;
#[cfg(feature = "regression")]
#[doc(inline)]
pub use empirica_regression as regression;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use empirica_utils as utils;

#[cfg(feature = "cli")]
pub mod pipeline;

// Only the `analyze` binary uses these.
#[cfg(feature = "cli")]
use {clap as _, env_logger as _};
