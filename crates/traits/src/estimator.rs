//! Regression estimator trait definitions.

use empirica_primitives::{CrossSectionFit, Panel, Period, RegressionResult};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Errors that can occur during estimation.
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    /// Dimension mismatch in input data.
    #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
        /// Context description.
        context: String,
    },

    /// Insufficient data for estimation.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] PolarsError),

    /// Unknown characteristic.
    #[error("unknown characteristic: {0}")]
    UnknownCharacteristic(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Linear algebra error (singular design).
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),
}

impl EstimatorError {
    /// Returns whether the period can be skipped and estimation continued.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::LinearAlgebra(_))
    }
}

/// Fits one cross-sectional regression.
pub trait CrossSectionRegressor: Send + Sync {
    /// Configuration type for this regressor.
    type Config: Default + Clone + Send + Sync;

    /// Create a new regressor with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Number of estimated coefficients for `n_regressors` regressors.
    fn n_params(&self, n_regressors: usize) -> usize;

    /// Fit a single period.
    ///
    /// # Arguments
    /// * `period` - Period of the cross-section
    /// * `returns` - Dependent variable (n_assets,)
    /// * `regressors` - Regressor matrix (n_assets x n_regressors), no intercept column
    /// * `weights` - Optional regression weights (n_assets,)
    ///
    /// # Errors
    /// Returns `EstimatorError` if dimensions mismatch or the design is singular.
    fn fit_single(
        &self,
        period: Period,
        returns: &Array1<f64>,
        regressors: &Array2<f64>,
        weights: Option<&Array1<f64>>,
    ) -> Result<CrossSectionFit, EstimatorError>;
}

/// Runs an estimator across every period of a panel.
pub trait PanelEstimator: Send + Sync {
    /// Estimate over all periods.
    ///
    /// # Errors
    /// Returns `EstimatorError` if required characteristics are missing or
    /// too few periods can be estimated.
    fn estimate(&self, panel: &Panel) -> Result<RegressionResult, EstimatorError>;
}
