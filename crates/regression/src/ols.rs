//! Cross-sectional least squares.

use empirica_math::{MathError, least_squares};
use empirica_primitives::{CrossSectionFit, Period};
use empirica_traits::{CrossSectionRegressor, EstimatorError};
use ndarray::{Array1, Array2, s};
use serde::{Deserialize, Serialize};

/// Configuration for the cross-sectional regressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OlsConfig {
    /// Prepend a constant column.
    pub intercept: bool,
}

impl Default for OlsConfig {
    fn default() -> Self {
        Self { intercept: true }
    }
}

/// Ordinary (or weighted, when weights are given) least squares on one
/// cross-section.
#[derive(Debug, Clone)]
pub struct CrossSectionOls {
    config: OlsConfig,
}

impl CrossSectionOls {
    /// Create a new regressor with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(OlsConfig::default())
    }

    /// Get whether an intercept is estimated.
    #[must_use]
    pub const fn intercept(&self) -> bool {
        self.config.intercept
    }
}

impl Default for CrossSectionOls {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossSectionRegressor for CrossSectionOls {
    type Config = OlsConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn n_params(&self, n_regressors: usize) -> usize {
        n_regressors + usize::from(self.config.intercept)
    }

    fn fit_single(
        &self,
        period: Period,
        returns: &Array1<f64>,
        regressors: &Array2<f64>,
        weights: Option<&Array1<f64>>,
    ) -> Result<CrossSectionFit, EstimatorError> {
        let n = returns.len();

        if regressors.nrows() != n {
            return Err(EstimatorError::DimensionMismatch {
                expected: n,
                actual: regressors.nrows(),
                context: "regressors".to_string(),
            });
        }
        if let Some(w) = weights
            && w.len() != n
        {
            return Err(EstimatorError::DimensionMismatch {
                expected: n,
                actual: w.len(),
                context: "weights".to_string(),
            });
        }

        let design = if self.config.intercept {
            let mut design = Array2::ones((n, regressors.ncols() + 1));
            design.slice_mut(s![.., 1..]).assign(regressors);
            design
        } else {
            regressors.clone()
        };

        let fit = least_squares(returns, &design, weights).map_err(|e| match e {
            MathError::InsufficientData { required, actual } => {
                EstimatorError::InsufficientData { required, actual }
            }
            MathError::EmptyData => EstimatorError::InsufficientData {
                required: self.n_params(regressors.ncols()).max(1),
                actual: 0,
            },
            other => EstimatorError::LinearAlgebra(other.to_string()),
        })?;

        Ok(CrossSectionFit {
            period,
            coefficients: fit.coefficients,
            r_squared: fit.r_squared,
            adj_r_squared: fit.adj_r_squared,
            n_obs: n,
        })
    }
}
