//! Cross-sectional regression results.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::Period;

/// Fit of one cross-sectional regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossSectionFit {
    /// Period of the cross-section.
    pub period: Period,
    /// Estimated coefficients, ordered as the result's term names.
    pub coefficients: Array1<f64>,
    /// R-squared.
    pub r_squared: f64,
    /// Adjusted R-squared.
    pub adj_r_squared: f64,
    /// Number of observations used.
    pub n_obs: usize,
}

/// Fama-MacBeth estimates.
///
/// Per-period fits plus the time-series average of each coefficient with
/// its standard error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Term names, `"intercept"` first when an intercept is estimated.
    pub terms: Vec<String>,
    /// First-pass fits in period order.
    pub per_period: Vec<CrossSectionFit>,
    /// Time-series mean of each coefficient.
    pub mean_coefficients: Array1<f64>,
    /// Standard error of each mean.
    pub standard_errors: Array1<f64>,
    /// t-statistic of each mean.
    pub t_stats: Array1<f64>,
    /// Two-sided p-value of each mean.
    pub p_values: Array1<f64>,
    /// Average R-squared.
    pub mean_r_squared: f64,
    /// Average adjusted R-squared.
    pub mean_adj_r_squared: f64,
    /// Average number of observations per period.
    pub mean_n_obs: f64,
    /// Newey-West lags used, `None` for plain standard errors.
    pub lags: Option<usize>,
}

impl RegressionResult {
    /// Number of periods in the second pass.
    #[must_use]
    pub fn n_periods(&self) -> usize {
        self.per_period.len()
    }

    /// Position of a term by name.
    #[must_use]
    pub fn term_index(&self, name: &str) -> Option<usize> {
        self.terms.iter().position(|t| t == name)
    }

    /// Mean coefficient for a term.
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.term_index(name).map(|i| self.mean_coefficients[i])
    }

    /// t-statistic for a term.
    #[must_use]
    pub fn t_stat(&self, name: &str) -> Option<f64> {
        self.term_index(name).map(|i| self.t_stats[i])
    }

    /// Coefficient time series of a term.
    #[must_use]
    pub fn coefficient_series(&self, name: &str) -> Option<Vec<f64>> {
        let i = self.term_index(name)?;
        Some(self.per_period.iter().map(|fit| fit.coefficients[i]).collect())
    }
}
